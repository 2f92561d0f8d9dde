//! Page script for the Fishy Redux site.
//!
//! Everything here is platform-independent: the DOM is reached through the small
//! capability traits in [`dom`], so the carousel and the game loader run (and are
//! tested) on the host. The `fishy_site_web` crate binds these traits to `web-sys`.

#[path = "core/carousel.rs"]
pub mod carousel;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/dom.rs"]
pub mod dom;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/game_loader.rs"]
pub mod game_loader;

#[path = "core/page.rs"]
pub mod page;

#[cfg(test)]
#[path = "core/testing.rs"]
pub(crate) mod testing;

pub use config::PageConfig;
pub use error::PageError;
