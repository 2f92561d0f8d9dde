use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PageConfig;
use crate::dom::{CarouselHost, Scheduler, VideoElement};
use crate::error::PageError;

/// The carousel's videos and which one is showing.
///
/// Fixed at construction and never empty, so `active < len` always holds.
#[derive(Debug)]
pub struct VideoSet<V> {
    videos: Vec<V>,
    active: usize,
}

impl<V: VideoElement> VideoSet<V> {
    /// Returns `None` for an empty list.
    pub fn new(videos: Vec<V>) -> Option<Self> {
        if videos.is_empty() {
            return None;
        }
        Some(Self { videos, active: 0 })
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &V {
        &self.videos[self.active]
    }

    pub fn videos(&self) -> &[V] {
        &self.videos
    }

    /// Marks the first video active and tries to play it.
    pub fn start(&mut self, active_class: &str) {
        self.active = 0;
        let first = &self.videos[0];
        first.set_class(active_class, true);
        play_best_effort(first);
    }

    /// One rotation step: pause and hide the current video, then show the next one
    /// (circularly) from its beginning. Returns the new active index.
    pub fn advance(&mut self, active_class: &str) -> usize {
        let current = &self.videos[self.active];
        current.pause();
        current.set_class(active_class, false);

        self.active = (self.active + 1) % self.videos.len();

        let next = &self.videos[self.active];
        next.set_class(active_class, true);
        next.rewind();
        play_best_effort(next);
        self.active
    }
}

/// Playback is best-effort: browsers may refuse to autoplay, and a refused video
/// simply stays paused until its next turn.
fn play_best_effort<V: VideoElement>(video: &V) {
    if let Err(e) = video.play() {
        debug!("video playback not started: {e}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselStatus {
    NoContainer,
    Empty,
    Running { len: usize },
}

/// Rotates the videos of the carousel container on a fixed period.
#[derive(Debug, Clone)]
pub struct CarouselController {
    container_id: String,
    active_class: Rc<str>,
    period: Duration,
}

impl CarouselController {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            container_id: config.carousel_id.clone(),
            active_class: Rc::from(config.active_class.as_str()),
            period: config.rotate_interval(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the rotation timer and shows the first video.
    ///
    /// A missing container or one without videos is not an error: nothing happens
    /// and no timer is registered. If the timer cannot be registered the videos are
    /// left untouched. The timer cannot be cancelled; it runs for the life of the page.
    pub fn initialize<H, S>(&self, host: &H, scheduler: &S) -> Result<CarouselStatus, PageError>
    where
        H: CarouselHost,
        S: Scheduler,
    {
        let Some(videos) = host.carousel_videos(&self.container_id) else {
            return Ok(CarouselStatus::NoContainer);
        };
        let Some(set) = VideoSet::new(videos) else {
            return Ok(CarouselStatus::Empty);
        };
        let len = set.len();

        let set = Rc::new(RefCell::new(set));
        let class = Rc::clone(&self.active_class);
        let tick = {
            let set = Rc::clone(&set);
            Box::new(move || {
                set.borrow_mut().advance(&class);
            })
        };

        // The first tick is a full period away, so starting after registration
        // cannot race it.
        if let Err(e) = scheduler.set_interval(self.period, tick) {
            warn!("carousel: failed to start rotation timer: {e}");
            return Err(e);
        }
        set.borrow_mut().start(&self.active_class);

        let ms = self.period.as_millis();
        info!("carousel: rotating {len} videos every {ms} ms");
        Ok(CarouselStatus::Running { len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCarouselHost, FakeScheduler, FakeVideo};

    fn videos(n: usize) -> Vec<FakeVideo> {
        (0..n).map(|_| FakeVideo::new()).collect()
    }

    fn active_indices(vs: &[FakeVideo]) -> Vec<usize> {
        vs.iter()
            .enumerate()
            .filter(|(_, v)| v.has_class("active"))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let host = FakeCarouselHost::default();
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&PageConfig::default());

        let status = ctl.initialize(&host, &clock).unwrap();
        assert_eq!(status, CarouselStatus::NoContainer);
        assert_eq!(clock.interval_count(), 0);
    }

    #[test]
    fn empty_container_starts_no_timer() {
        let host = FakeCarouselHost::with_container("videoCarousel", &[]);
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&PageConfig::default());

        let status = ctl.initialize(&host, &clock).unwrap();
        assert_eq!(status, CarouselStatus::Empty);
        assert_eq!(clock.interval_count(), 0);
    }

    #[test]
    fn three_videos_rotate_every_eight_seconds() {
        let vs = videos(3);
        let host = FakeCarouselHost::with_container("videoCarousel", &vs);
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&PageConfig::default());

        let status = ctl.initialize(&host, &clock).unwrap();
        assert_eq!(status, CarouselStatus::Running { len: 3 });
        assert_eq!(clock.interval_count(), 1);

        assert_eq!(active_indices(&vs), vec![0]);
        assert!(vs[0].is_playing());

        clock.advance(7_999);
        assert_eq!(active_indices(&vs), vec![0]);

        clock.advance(1);
        assert_eq!(clock.now_ms(), 8_000);
        assert_eq!(active_indices(&vs), vec![1]);
        assert!(!vs[0].is_playing());
        assert!(vs[1].is_playing());

        clock.advance(8_000);
        assert_eq!(active_indices(&vs), vec![2]);

        clock.advance(8_000);
        assert_eq!(active_indices(&vs), vec![0]);
        assert!(vs[0].is_playing());
        assert!(!vs[2].is_playing());
    }

    #[test]
    fn active_index_tracks_tick_count_modulo_len() {
        for n in 1..=5usize {
            let vs = videos(n);
            let host = FakeCarouselHost::with_container("videoCarousel", &vs);
            let clock = FakeScheduler::new();
            let ctl = CarouselController::new(&PageConfig::default());
            ctl.initialize(&host, &clock).unwrap();

            for k in 1..=(3 * n + 1) {
                clock.advance(8_000);
                assert_eq!(active_indices(&vs), vec![k % n], "n={n} k={k}");
                let playing = vs.iter().filter(|v| v.is_playing()).count();
                assert_eq!(playing, 1, "n={n} k={k}");
            }
        }
    }

    #[test]
    fn newly_active_video_restarts_from_the_beginning() {
        let vs = videos(2);
        vs[1].set_position(42.5);
        let host = FakeCarouselHost::with_container("videoCarousel", &vs);
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&PageConfig::default());
        ctl.initialize(&host, &clock).unwrap();

        clock.advance(8_000);
        assert_eq!(vs[1].position(), 0.0);
    }

    #[test]
    fn blocked_autoplay_does_not_stop_rotation() {
        let vs = vec![
            FakeVideo::with_blocked_autoplay(),
            FakeVideo::with_blocked_autoplay(),
        ];
        let host = FakeCarouselHost::with_container("videoCarousel", &vs);
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&PageConfig::default());
        ctl.initialize(&host, &clock).unwrap();

        assert_eq!(vs[0].play_calls(), 1);
        assert!(!vs[0].is_playing());

        clock.advance(16_000);
        assert_eq!(active_indices(&vs), vec![0]);
        assert_eq!(vs[0].play_calls(), 2);
        assert_eq!(vs[1].play_calls(), 1);
    }

    #[test]
    fn config_controls_ids_class_and_period() {
        let cfg = PageConfig {
            carousel_id: "reel".to_string(),
            active_class: "shown".to_string(),
            rotate_interval_ms: 1_000,
            ..PageConfig::default()
        };
        let vs = videos(2);
        let host = FakeCarouselHost::with_container("reel", &vs);
        let clock = FakeScheduler::new();
        let ctl = CarouselController::new(&cfg);
        ctl.initialize(&host, &clock).unwrap();

        assert!(vs[0].has_class("shown"));
        clock.advance(1_000);
        assert!(vs[1].has_class("shown"));
        assert!(!vs[0].has_class("shown"));
        assert!(!vs[1].has_class("active"));
    }

    #[test]
    fn timer_failure_is_reported() {
        let vs = videos(2);
        let host = FakeCarouselHost::with_container("videoCarousel", &vs);
        let clock = FakeScheduler::refusing_timers();
        let ctl = CarouselController::new(&PageConfig::default());
        let res = ctl.initialize(&host, &clock);
        assert!(matches!(res, Err(PageError::Timer(_))));
        assert!(active_indices(&vs).is_empty());
        assert!(vs.iter().all(|v| !v.is_playing() && v.play_calls() == 0));
    }

    #[test]
    fn single_video_is_replayed_on_every_tick() {
        let vs = videos(1);
        let mut set = VideoSet::new(vs.clone()).unwrap();
        set.start("active");
        assert_eq!(set.advance("active"), 0);
        assert_eq!(set.active_index(), 0);
        assert_eq!(set.videos().len(), 1);
        assert!(set.active().has_class("active"));
        assert!(vs[0].has_class("active"));
        assert!(vs[0].is_playing());
        assert_eq!(vs[0].play_calls(), 2);
    }

    #[test]
    fn empty_video_set_is_rejected() {
        assert!(VideoSet::<FakeVideo>::new(Vec::new()).is_none());
    }
}
