use thiserror::Error;

use crate::model::WidgetId;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("widget {0} is already on the dashboard")]
    DuplicateWidget(WidgetId),

    #[error("layout item {id} is invalid: {reason}")]
    InvalidItem { id: WidgetId, reason: String },

    #[error("layout items {a} and {b} overlap")]
    Overlap { a: WidgetId, b: WidgetId },

    #[error("no free slot for a {w}x{h} widget")]
    NoFreeSlot { w: u32, h: u32 },

    #[error("a widget interaction is still in progress")]
    GestureInProgress,

    #[error("dashboard name is required")]
    NameRequired,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
