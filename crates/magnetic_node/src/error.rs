//! Ошибки конструирования пузырей и загрузки конфига

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BubbleError {
    #[error("bubble radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    #[error("selection scale must be finite and positive, got {0}")]
    InvalidSelectionScale(f32),

    #[error("animation duration `{name}` must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f32 },

    #[error("physics parameter `{name}` must be finite and non-negative, got {value}")]
    InvalidPhysics { name: &'static str, value: f32 },

    #[error("failed to parse bubble config: {0}")]
    Config(#[from] serde_json::Error),
}
