//! Widget visual state definitions.

/// The UI state of a widget on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidgetState {
    /// Resting on the board.
    #[default]
    Normal,
    /// Being moved by an active drag session.
    Dragging,
    /// Exit animation is playing; removal completes afterwards.
    Removing,
}

impl WidgetState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging)
    }

    pub fn is_removing(&self) -> bool {
        matches!(self, Self::Removing)
    }
}
