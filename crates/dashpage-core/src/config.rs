//! Board configuration.

use crate::widget::Theme;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default size of a user-created widget, used for random placement.
pub const DEFAULT_WIDGET_SIZE: Size = Size::new(150.0, 50.0);

/// Draw priority of the widget being dragged.
pub const DRAG_Z_INDEX: i32 = 1001;

/// Length of the exit animation played before a widget is removed.
pub const EXIT_ANIMATION_MS: u64 = 300;

/// A widget created when nothing has been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedWidget {
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Random when unset.
    #[serde(default)]
    pub theme: Option<Theme>,
}

impl SeedWidget {
    pub fn new(text: &str, x: f64, y: f64) -> Self {
        Self {
            text: text.to_string(),
            x,
            y,
            theme: None,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Tunables of the widget board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub widget_size: Size,
    pub drag_z_index: i32,
    pub exit_animation_ms: u64,
    /// Where the trending block appears.
    pub trending_origin: Point,
    pub seed_widgets: Vec<SeedWidget>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            widget_size: DEFAULT_WIDGET_SIZE,
            drag_z_index: DRAG_Z_INDEX,
            exit_animation_ms: EXIT_ANIMATION_MS,
            trending_origin: Point::new(50.0, 50.0),
            seed_widgets: vec![
                SeedWidget::new("Work", 100.0, 400.0),
                SeedWidget::new("Study", 300.0, 450.0),
                SeedWidget::new("Life", 200.0, 500.0),
            ],
        }
    }
}

impl BoardConfig {
    pub fn exit_animation(&self) -> Duration {
        Duration::from_millis(self.exit_animation_ms)
    }
}
