use crate::engine::config::ConfigError;
use crate::engine::contents::ContentsId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Cannot create an offscreen window before the app is ready")]
    NotReady,

    #[error("Host window has already been torn down")]
    HostDestroyed,

    #[error("Host window is still being constructed")]
    HostUnderConstruction,

    #[error("Window is closed")]
    WindowClosed,

    #[error("Contents {0} are already attached to the host")]
    ContentsInUse(ContentsId),

    #[error("Contents {0} have been destroyed")]
    ContentsDestroyed(ContentsId),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Native binding error: {0}")]
    Binding(#[from] anyhow::Error),
}
