use serde::{Deserialize, Serialize};

/// Zoom factors below this are clamped; matches the smallest scale the
/// diagram stays legible at.
pub const MIN_ZOOM: f64 = 0.25;

const DEFAULT_MARGIN_X: f64 = 24.0;
const DEFAULT_MARGIN_Y: f64 = 32.0;

/// Diagram configuration.
///
/// Callers are expected to pass sane values, but every field is re-clamped
/// when a diagram is built so direct use with out-of-range input cannot
/// produce a degenerate layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Canvas width floor; content may exceed it.
    pub width: f64,
    /// Horizontal gap between boxes and at the canvas edges.
    pub margin_x: f64,
    /// Vertical gap between display rows and at the canvas edges.
    pub margin_y: f64,
    /// Levels at or beyond this fold into the last rendered level.
    pub max_level: usize,
    /// Boxes per display row before wrapping.
    pub max_column: usize,
    /// Uniform scale applied to the finished canvas.
    pub zoom: f64,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            width: 0.0,
            margin_x: DEFAULT_MARGIN_X,
            margin_y: DEFAULT_MARGIN_Y,
            max_level: 16,
            max_column: 6,
            zoom: 1.0,
        }
    }
}

impl DiagramConfig {
    /// Returns a copy with every field forced into its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            width: if self.width.is_finite() && self.width > 0.0 {
                self.width
            } else {
                0.0
            },
            margin_x: clamp_margin(self.margin_x, DEFAULT_MARGIN_X),
            margin_y: clamp_margin(self.margin_y, DEFAULT_MARGIN_Y),
            max_level: self.max_level.max(1),
            max_column: self.max_column.max(1),
            zoom: if self.zoom.is_finite() && self.zoom >= MIN_ZOOM {
                self.zoom
            } else {
                MIN_ZOOM
            },
        }
    }
}

fn clamp_margin(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 1.0 {
        value
    } else {
        default
    }
}
