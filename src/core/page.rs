use tracing::debug;

use crate::carousel::{CarouselController, CarouselStatus};
use crate::config::PageConfig;
use crate::dom::{CarouselHost, GameHost, ModuleLoader, Scheduler};
use crate::error::PageError;
use crate::game_loader::{GameLoader, GameMountState};

/// What the page-ready initializers ended up doing.
#[derive(Debug)]
pub struct PageReport {
    pub carousel: Result<CarouselStatus, PageError>,
    pub game: GameMountState,
}

/// The two page-ready initializers. They share nothing; the carousel simply goes
/// first, as the page registers it first.
#[derive(Debug)]
pub struct Page {
    carousel: CarouselController,
    game: GameLoader,
}

impl Page {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            carousel: CarouselController::new(config),
            game: GameLoader::new(config),
        }
    }

    pub fn carousel(&self) -> &CarouselController {
        &self.carousel
    }

    pub fn game(&self) -> &GameLoader {
        &self.game
    }

    pub async fn initialize<C, G, L, S>(
        &self,
        videos: &C,
        canvases: &G,
        loader: &L,
        scheduler: &S,
    ) -> PageReport
    where
        C: CarouselHost,
        G: GameHost,
        L: ModuleLoader,
        S: Scheduler,
    {
        let carousel = self.carousel.initialize(videos, scheduler);
        let game = self.game.initialize(canvases, loader, scheduler).await;
        debug!("page: carousel {:?}, game {:?}", carousel, game);
        PageReport { carousel, game }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_loader::SkipReason;
    use crate::testing::{
        FakeCarouselHost, FakeDocument, FakeLoader, FakeScheduler, FakeVideo, LoadOutcome,
    };

    #[test]
    fn empty_page_does_nothing() {
        let videos = FakeCarouselHost::default();
        let doc = FakeDocument::new();
        let module = FakeLoader::new(&doc, LoadOutcome::AppendCanvases(1));
        let clock = FakeScheduler::new();
        let page = Page::new(&PageConfig::default());

        let report = pollster::block_on(page.initialize(&videos, &doc, &module, &clock));
        assert!(matches!(report.carousel, Ok(CarouselStatus::NoContainer)));
        assert_eq!(report.game, GameMountState::Skipped(SkipReason::NoPlaceholder));
        assert_eq!(clock.interval_count(), 0);
        assert_eq!(clock.deferred_count(), 0);
        assert_eq!(module.calls(), 0);
    }

    #[test]
    fn failed_game_does_not_disturb_the_carousel() {
        let vs = vec![FakeVideo::new(), FakeVideo::new()];
        let videos = FakeCarouselHost::with_container("videoCarousel", &vs);
        let doc = FakeDocument::new();
        doc.append_canvas(Some("gameCanvas"), true);
        doc.set_scroll_y(75.0);
        let module = FakeLoader::new(&doc, LoadOutcome::Fail);
        let clock = FakeScheduler::new();
        let page = Page::new(&PageConfig::default());

        let report = pollster::block_on(page.initialize(&videos, &doc, &module, &clock));
        assert!(matches!(report.carousel, Ok(CarouselStatus::Running { len: 2 })));
        assert_eq!(report.game, GameMountState::Failed);
        assert_eq!(page.game().state(), GameMountState::Failed);

        clock.run_deferred();
        clock.advance(8_000);
        assert!(vs[1].has_class("active"));
        assert!(!vs[0].has_class("active"));
        assert_eq!(doc.current_scroll_y(), 75.0);
    }

    #[test]
    fn full_page_mounts_game_and_rotates() {
        let vs = vec![FakeVideo::new(), FakeVideo::new(), FakeVideo::new()];
        let videos = FakeCarouselHost::with_container("videoCarousel", &vs);
        let doc = FakeDocument::new();
        let placeholder = doc.append_canvas(Some("gameCanvas"), true);
        let module = FakeLoader::new(&doc, LoadOutcome::AppendCanvases(1));
        let clock = FakeScheduler::new();
        let page = Page::new(&PageConfig::default());

        let report = pollster::block_on(page.initialize(&videos, &doc, &module, &clock));
        assert_eq!(report.game, GameMountState::Mounted { replaced: true });
        assert!(!doc.contains(placeholder));
        assert_eq!(page.carousel().period().as_millis(), 8_000);

        clock.advance(24_000);
        assert!(vs[0].has_class("active"));
    }
}
