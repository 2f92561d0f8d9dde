use thiserror::Error;

/// Everything that can go wrong while wiring the page up.
///
/// JS exceptions are stringified where they cross into Rust; callers only ever log
/// these, so a message is all they need to carry.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("no window")]
    NoWindow,

    #[error("no document")]
    NoDocument,

    #[error("dom: {0}")]
    Dom(String),

    #[error("timer: {0}")]
    Timer(String),

    #[error("playback: {0}")]
    Playback(String),

    #[error("module load: {0}")]
    ModuleLoad(String),

    #[error("module init: {0}")]
    ModuleInit(String),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
