use thiserror::Error;

use crate::core::geometry::Rect;

#[derive(Debug, Error)]
pub enum StrokeError {
    #[error("Invalid brush config: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Dab rect {rect:?} lies outside its {width}x{height} {space}")]
    DabOutOfBounds {
        rect: Rect,
        width: usize,
        height: usize,
        space: &'static str,
    },

    #[error("Brush rect {brush:?} and image rect {image:?} differ in size")]
    RectMismatch { brush: Rect, image: Rect },

    #[error("Buffer size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Tool {tool} cannot use a {found} buffer")]
    LayerMismatch {
        tool: &'static str,
        found: &'static str,
    },

    #[error("No stroke in progress")]
    NoActiveStroke,

    #[error("A stroke is already in progress")]
    StrokeInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_tool_and_buffer() {
        let err = StrokeError::LayerMismatch {
            tool: "oil",
            found: "coverage",
        };
        assert_eq!(err.to_string(), "Tool oil cannot use a coverage buffer");
        assert_eq!(StrokeError::NoActiveStroke.to_string(), "No stroke in progress");
    }
}
