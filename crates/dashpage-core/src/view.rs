//! Rendering and navigation seams.
//!
//! The board never touches a DOM. Everything visual goes through
//! [`BoardView`], and opening links goes through [`Navigator`].

use crate::widget::{Widget, WidgetId};
use kurbo::{Point, Rect, Size};
use std::collections::BTreeMap;

/// What the board needs from the rendering layer.
pub trait BoardView {
    /// On-screen rectangle of the widget container, if it exists.
    fn container_rect(&self) -> Option<Rect>;

    /// On-screen rectangle of a rendered widget.
    fn widget_rect(&self, id: WidgetId) -> Option<Rect>;

    /// Create or redraw a widget.
    fn render(&mut self, widget: &Widget);

    /// Move a widget to a container-relative position.
    fn place(&mut self, id: WidgetId, position: Point);

    /// Toggle the dragging visual state.
    fn set_dragging(&mut self, id: WidgetId, dragging: bool);

    /// Raise a widget above its siblings, or restore its normal priority.
    fn set_draw_priority(&mut self, id: WidgetId, z_index: Option<i32>);

    /// Start the exit animation that precedes removal.
    fn play_exit_animation(&mut self, id: WidgetId);

    /// Drop a widget from the view.
    fn remove(&mut self, id: WidgetId);

    /// Show a message to the user.
    fn alert(&mut self, message: &str);
}

/// Opens URLs in a new browsing context.
pub trait Navigator {
    fn open_in_new_context(&mut self, url: &str);
}

/// Rendered state of one widget in a [`HeadlessView`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewWidget {
    pub label: String,
    pub rect: Rect,
    pub dragging: bool,
    pub z_index: Option<i32>,
    pub exiting: bool,
}

/// A view with no display, keeping rendered state in memory.
///
/// Used by the command line front end and by tests. Widgets render at a
/// fixed size unless overridden with [`set_widget_size`](Self::set_widget_size).
#[derive(Debug, Clone)]
pub struct HeadlessView {
    container: Option<Rect>,
    widget_size: Size,
    sizes: BTreeMap<WidgetId, Size>,
    widgets: BTreeMap<WidgetId, ViewWidget>,
    writes: usize,
    alerts: Vec<String>,
}

impl HeadlessView {
    pub fn new(container: Rect, widget_size: Size) -> Self {
        Self {
            container: Some(container),
            widget_size,
            sizes: BTreeMap::new(),
            widgets: BTreeMap::new(),
            writes: 0,
            alerts: Vec::new(),
        }
    }

    /// A view whose container element is missing.
    pub fn without_container(widget_size: Size) -> Self {
        Self {
            container: None,
            ..Self::new(Rect::ZERO, widget_size)
        }
    }

    pub fn set_container(&mut self, container: Option<Rect>) {
        self.container = container;
    }

    pub fn set_widget_size(&mut self, id: WidgetId, size: Size) {
        self.sizes.insert(id, size);
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.rect = Rect::from_origin_size(widget.rect.origin(), size);
        }
    }

    pub fn widget(&self, id: WidgetId) -> Option<&ViewWidget> {
        self.widgets.get(&id)
    }

    pub fn widgets(&self) -> impl Iterator<Item = (&WidgetId, &ViewWidget)> {
        self.widgets.iter()
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    /// Container-relative position of a rendered widget.
    pub fn position(&self, id: WidgetId) -> Option<Point> {
        let origin = self.container.map(|c| c.origin()).unwrap_or(Point::ZERO);
        self.widgets
            .get(&id)
            .map(|w| Point::new(w.rect.x0 - origin.x, w.rect.y0 - origin.y))
    }

    pub fn is_dragging(&self, id: WidgetId) -> bool {
        self.widgets.get(&id).is_some_and(|w| w.dragging)
    }

    /// Number of position writes applied so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    fn size_of(&self, id: WidgetId) -> Size {
        self.sizes.get(&id).copied().unwrap_or(self.widget_size)
    }

    fn absolute(&self, position: Point) -> Point {
        let origin = self.container.map(|c| c.origin()).unwrap_or(Point::ZERO);
        Point::new(origin.x + position.x, origin.y + position.y)
    }
}

impl BoardView for HeadlessView {
    fn container_rect(&self) -> Option<Rect> {
        self.container
    }

    fn widget_rect(&self, id: WidgetId) -> Option<Rect> {
        self.widgets.get(&id).map(|w| w.rect)
    }

    fn render(&mut self, widget: &Widget) {
        let rect = Rect::from_origin_size(self.absolute(widget.position), self.size_of(widget.id));
        let entry = self.widgets.entry(widget.id).or_insert_with(|| ViewWidget {
            label: String::new(),
            rect,
            dragging: false,
            z_index: None,
            exiting: false,
        });
        entry.label = widget.label();
        entry.rect = rect;
    }

    fn place(&mut self, id: WidgetId, position: Point) {
        let origin = self.absolute(position);
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.rect = Rect::from_origin_size(origin, widget.rect.size());
            self.writes += 1;
        }
    }

    fn set_dragging(&mut self, id: WidgetId, dragging: bool) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.dragging = dragging;
        }
    }

    fn set_draw_priority(&mut self, id: WidgetId, z_index: Option<i32>) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.z_index = z_index;
        }
    }

    fn play_exit_animation(&mut self, id: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.exiting = true;
        }
    }

    fn remove(&mut self, id: WidgetId) {
        self.widgets.remove(&id);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Navigator that only remembers what it was asked to open.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub opened: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn open_in_new_context(&mut self, url: &str) {
        self.opened.push(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::Theme;

    #[test]
    fn test_render_and_place() {
        let mut view = HeadlessView::new(
            Rect::new(10.0, 20.0, 810.0, 620.0),
            Size::new(150.0, 50.0),
        );
        let widget = Widget::text(WidgetId(1), "A", Point::new(5.0, 5.0), Theme::Green);
        view.render(&widget);
        assert_eq!(view.widget_rect(WidgetId(1)).unwrap().origin(), Point::new(15.0, 25.0));

        view.place(WidgetId(1), Point::new(100.0, 0.0));
        assert_eq!(view.position(WidgetId(1)), Some(Point::new(100.0, 0.0)));
        assert_eq!(view.writes(), 1);
    }

    #[test]
    fn test_place_unknown_widget_is_ignored() {
        let mut view = HeadlessView::new(Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(10.0, 10.0));
        view.place(WidgetId(9), Point::ZERO);
        assert_eq!(view.writes(), 0);
    }

    #[test]
    fn test_custom_widget_size() {
        let mut view = HeadlessView::new(Rect::new(0.0, 0.0, 100.0, 100.0), Size::new(10.0, 10.0));
        let widget = Widget::text(WidgetId(1), "A", Point::ZERO, Theme::Green);
        view.render(&widget);
        view.set_widget_size(WidgetId(1), Size::new(40.0, 30.0));
        assert_eq!(view.widget_rect(WidgetId(1)).unwrap().size(), Size::new(40.0, 30.0));
    }
}
