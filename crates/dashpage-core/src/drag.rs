//! Drag positioning engine.
//!
//! Turns raw pointer samples into clamped widget positions. The position is
//! tracked in the session on every sample, while writes to the view are
//! coalesced to one per display frame. When the gesture ends the tracked
//! position is committed to the board.
//!
//! ## Invariants
//!
//! 1. At most one session is active. Starting a new one replaces a stale one
//!    after restoring its visual state.
//! 2. A session has at most one pending frame.
//! 3. The tracked position always satisfies
//!    `0 <= x <= container.width - widget.width` (same for y), with the lower
//!    bound winning when the container is smaller than the widget.

use crate::frame::{FrameScheduler, FrameToken, ManualFrameScheduler};
use crate::geometry::{clamp_to_container, relative_origin};
use crate::storage::{KeyValueStore, StorageResult};
use crate::view::BoardView;
use crate::widget::{WidgetBoard, WidgetId, WidgetState};
use kurbo::{Point, Rect, Size, Vec2};

/// State of one drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    widget: WidgetId,
    /// Pointer position relative to the widget's top-left at drag start.
    offset: Vec2,
    /// Container rectangle, measured once per session.
    container: Rect,
    /// Widget size, measured once per session.
    widget_size: Size,
    /// Last computed container-relative position.
    position: Point,
    pending_frame: Option<FrameToken>,
    /// Whether the view already shows `position`.
    applied: bool,
}

impl DragSession {
    pub fn widget(&self) -> WidgetId {
        self.widget
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn widget_size(&self) -> Size {
        self.widget_size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Position for a pointer sample, clamped to the cached container.
    fn target_for(&self, pointer: Point) -> Point {
        let candidate = Point::new(
            pointer.x - self.container.x0 - self.offset.x,
            pointer.y - self.container.y0 - self.offset.y,
        );
        clamp_to_container(candidate, self.container.size(), self.widget_size)
    }
}

/// Drives drag sessions against a frame scheduler.
#[derive(Debug)]
pub struct DragEngine<F: FrameScheduler> {
    frames: F,
    session: Option<DragSession>,
    z_index: i32,
}

impl<F: FrameScheduler> DragEngine<F> {
    /// Create an engine. `z_index` is the draw priority of a dragged widget.
    pub fn new(frames: F, z_index: i32) -> Self {
        Self {
            frames,
            session: None,
            z_index,
        }
    }

    pub fn frames(&self) -> &F {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_widget(&self) -> Option<WidgetId> {
        self.session.as_ref().map(|s| s.widget)
    }

    /// Start dragging `id` with the pointer at `pointer` (page coordinates).
    ///
    /// Returns `false` when the widget cannot be dragged: it is unknown, being
    /// removed, or the view cannot measure it or its container.
    pub fn begin_drag<S: KeyValueStore>(
        &mut self,
        board: &mut WidgetBoard<S>,
        view: &mut dyn BoardView,
        id: WidgetId,
        pointer: Point,
    ) -> bool {
        if let Some(stale) = self.session.take() {
            log::warn!("Replacing stale drag session for widget {}", stale.widget);
            self.release(stale, board, view);
        }

        if !board.contains(id) || board.state(id).is_removing() {
            return false;
        }
        let Some(rect) = view.widget_rect(id) else {
            log::warn!("Widget {} is not rendered, ignoring drag", id);
            return false;
        };
        let Some(container) = view.container_rect() else {
            log::warn!("Widget container not found, ignoring drag");
            return false;
        };

        let session = DragSession {
            widget: id,
            offset: pointer - rect.origin(),
            container,
            widget_size: rect.size(),
            position: relative_origin(rect, container),
            pending_frame: None,
            applied: true,
        };
        log::debug!(
            "Drag start on widget {} at ({}, {})",
            id,
            session.position.x,
            session.position.y
        );

        board.set_state(id, WidgetState::Dragging);
        view.set_dragging(id, true);
        view.set_draw_priority(id, Some(self.z_index));
        self.session = Some(session);
        true
    }

    /// Feed a pointer sample. Returns the new tracked position.
    ///
    /// Only the first sample of a frame schedules a view update; later ones
    /// overwrite its target.
    pub fn update_drag(&mut self, pointer: Point) -> Option<Point> {
        let session = self.session.as_mut()?;
        session.position = session.target_for(pointer);
        session.applied = false;
        if session.pending_frame.is_none() {
            session.pending_frame = Some(self.frames.request_frame());
        }
        Some(session.position)
    }

    /// Apply the pending view update if `token` is this session's frame.
    pub fn on_frame(&mut self, token: FrameToken, view: &mut dyn BoardView) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.pending_frame != Some(token) {
            return false;
        }
        session.pending_frame = None;
        session.applied = true;
        view.place(session.widget, session.position);
        true
    }

    /// Finish the gesture and commit the tracked position.
    ///
    /// Returns the committed widget and position, or `None` when no session
    /// was active.
    pub fn end_drag<S: KeyValueStore>(
        &mut self,
        board: &mut WidgetBoard<S>,
        view: &mut dyn BoardView,
    ) -> StorageResult<Option<(WidgetId, Point)>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let (id, position) = (session.widget, session.position);
        self.release(session, board, view);
        log::debug!("Drag end on widget {} at ({}, {})", id, position.x, position.y);
        board.commit_position(id, position)?;
        Ok(Some((id, position)))
    }

    /// Input focus was lost mid-gesture.
    pub fn focus_lost<S: KeyValueStore>(
        &mut self,
        board: &mut WidgetBoard<S>,
        view: &mut dyn BoardView,
    ) -> StorageResult<Option<(WidgetId, Point)>> {
        if self.session.is_some() {
            log::debug!("Focus lost during drag, ending session");
        }
        self.end_drag(board, view)
    }

    /// Cancel the pending frame, show the final position and restore the
    /// widget's visual state.
    fn release<S: KeyValueStore>(
        &mut self,
        session: DragSession,
        board: &mut WidgetBoard<S>,
        view: &mut dyn BoardView,
    ) {
        if let Some(token) = session.pending_frame {
            self.frames.cancel_frame(token);
        }
        if !session.applied {
            view.place(session.widget, session.position);
        }
        view.set_dragging(session.widget, false);
        view.set_draw_priority(session.widget, None);
        if board.state(session.widget).is_dragging() {
            board.set_state(session.widget, WidgetState::Normal);
        }
    }
}

impl DragEngine<ManualFrameScheduler> {
    /// Advance the manual scheduler by one frame and run its callbacks.
    /// Returns the number of view updates applied.
    pub fn advance_frame(&mut self, view: &mut dyn BoardView) -> usize {
        let mut applied = 0;
        for token in self.frames.advance() {
            if self.on_frame(token, view) {
                applied += 1;
            }
        }
        applied
    }
}
