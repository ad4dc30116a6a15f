//! Error types crossing the frame boundary
//!
//! Render backends return [`RenderError`]; the frame body wraps everything in
//! [`FrameError`]. The scheduler is the only place these are swallowed.

use thiserror::Error;

/// Failure reported by a [`Surface`](crate::renderer::Surface) implementation
#[derive(Debug, Error)]
pub enum RenderError {
    /// The platform refused or failed a draw call
    #[error("render backend failure: {0}")]
    Backend(String),

    /// Drawing context is gone (lost canvas, torn-down page)
    #[error("drawing context unavailable")]
    ContextLost,

    /// Media handle cannot be drawn by this surface
    #[error("media '{key}' cannot be drawn")]
    UnsupportedMedia { key: String },
}

/// Anything that can go wrong inside one frame
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Simulation reached a state it cannot advance from this frame
    #[error("simulation fault in {context}: {detail}")]
    Simulation {
        context: &'static str,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_converts() {
        fn draw() -> Result<(), RenderError> {
            Err(RenderError::ContextLost)
        }
        fn frame() -> Result<(), FrameError> {
            draw()?;
            Ok(())
        }
        let err = frame().unwrap_err();
        assert!(matches!(err, FrameError::Render(RenderError::ContextLost)));
        assert_eq!(err.to_string(), "drawing context unavailable");
    }

    #[test]
    fn test_viewport_message() {
        let err = FrameError::InvalidViewport {
            width: 0.0,
            height: 480.0,
        };
        assert_eq!(err.to_string(), "invalid viewport 0x480");
    }
}
