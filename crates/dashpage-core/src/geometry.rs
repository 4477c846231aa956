//! Container-relative positioning helpers.

use kurbo::{Point, Rect, Size};

/// Clamp one axis to `[0, limit]`.
///
/// A negative `limit` (the widget is larger than the container, or the
/// container has not been laid out yet) resolves to `0`.
pub fn clamp_axis(value: f64, limit: f64) -> f64 {
    value.min(limit).max(0.0)
}

/// Clamp a widget's top-left corner so the widget stays inside the container.
pub fn clamp_to_container(position: Point, container: Size, widget: Size) -> Point {
    Point::new(
        clamp_axis(position.x, container.width - widget.width),
        clamp_axis(position.y, container.height - widget.height),
    )
}

/// Whether a widget at `position` lies fully inside the container.
pub fn fits_in_container(position: Point, container: Size, widget: Size) -> bool {
    position.x >= 0.0
        && position.y >= 0.0
        && position.x <= container.width - widget.width
        && position.y <= container.height - widget.height
}

/// Whether the container can hold a widget of this size at all.
pub fn can_contain(container: Size, widget: Size) -> bool {
    container.width >= widget.width && container.height >= widget.height
}

/// Top-left of `rect` relative to the container's origin.
pub fn relative_origin(rect: Rect, container: Rect) -> Point {
    Point::new(rect.x0 - container.x0, rect.y0 - container.y0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_far_corner() {
        let clamped = clamp_to_container(
            Point::new(1000.0, 1000.0),
            Size::new(800.0, 600.0),
            Size::new(150.0, 50.0),
        );
        assert_eq!(clamped, Point::new(650.0, 550.0));
    }

    #[test]
    fn test_clamp_negative() {
        let clamped = clamp_to_container(
            Point::new(-40.0, -1.0),
            Size::new(800.0, 600.0),
            Size::new(150.0, 50.0),
        );
        assert_eq!(clamped, Point::ZERO);
    }

    #[test]
    fn test_clamp_axes_independent() {
        let clamped = clamp_to_container(
            Point::new(2000.0, 120.0),
            Size::new(800.0, 600.0),
            Size::new(150.0, 50.0),
        );
        assert_eq!(clamped, Point::new(650.0, 120.0));
    }

    #[test]
    fn test_degenerate_container() {
        let clamped = clamp_to_container(
            Point::new(300.0, 300.0),
            Size::ZERO,
            Size::new(150.0, 50.0),
        );
        assert_eq!(clamped, Point::ZERO);
        assert!(!can_contain(Size::ZERO, Size::new(150.0, 50.0)));
    }

    #[test]
    fn test_relative_origin() {
        let container = Rect::new(20.0, 100.0, 820.0, 700.0);
        let widget = Rect::new(70.0, 150.0, 220.0, 200.0);
        assert_eq!(relative_origin(widget, container), Point::new(50.0, 50.0));
    }

    proptest! {
        #[test]
        fn clamped_position_always_fits(
            x in -5000.0f64..5000.0,
            y in -5000.0f64..5000.0,
            cw in 0.0f64..2000.0,
            ch in 0.0f64..2000.0,
            ww in 0.0f64..400.0,
            wh in 0.0f64..400.0,
        ) {
            let container = Size::new(cw, ch);
            let widget = Size::new(ww, wh);
            let clamped = clamp_to_container(Point::new(x, y), container, widget);
            prop_assert!(clamped.x >= 0.0 && clamped.y >= 0.0);
            if can_contain(container, widget) {
                prop_assert!(fits_in_container(clamped, container, widget));
            }
        }
    }
}
