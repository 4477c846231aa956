//! Widgets on the start-page board.
//!
//! - `model`: widget data and the persisted record shape
//! - `state`: visual state mirrored to the view
//! - `board`: the in-memory widget list and its persistence

mod board;
mod model;
mod state;

pub use board::WidgetBoard;
pub use model::{Theme, Widget, WidgetContent, WidgetId, WidgetOrigin, WidgetRecord};
pub use state::WidgetState;
