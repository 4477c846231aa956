//! Widget data: identity, content, theme and the persisted record shape.

use crate::trending::{TrendingBlock, TrendingItem};
use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board-unique widget identity, assigned in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(pub u64);

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Color theme of a user-created widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "theme-green")]
    Green,
    #[serde(rename = "theme-orange")]
    Orange,
    #[serde(rename = "theme-purple")]
    Purple,
    #[serde(rename = "theme-red")]
    Red,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Green, Theme::Orange, Theme::Purple, Theme::Red];

    /// CSS class the page uses for this theme.
    pub fn class_name(&self) -> &'static str {
        match self {
            Theme::Green => "theme-green",
            Theme::Orange => "theme-orange",
            Theme::Purple => "theme-purple",
            Theme::Red => "theme-red",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix("theme-").unwrap_or(s);
        match name.to_ascii_lowercase().as_str() {
            "green" => Ok(Theme::Green),
            "orange" => Ok(Theme::Orange),
            "purple" => Ok(Theme::Purple),
            "red" => Ok(Theme::Red),
            other => Err(format!("unknown theme: {other}")),
        }
    }
}

/// Where a widget came from. Only user-created widgets are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetOrigin {
    #[default]
    Custom,
    Trending,
}

/// What a widget displays.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetContent {
    /// A user-created text tag.
    Text(String),
    /// A block of externally-sourced trending records.
    Trending(TrendingBlock),
}

/// A positioned widget on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: WidgetId,
    pub content: WidgetContent,
    /// Offset of the top-left corner from the container origin.
    pub position: Point,
    pub theme: Theme,
}

impl Widget {
    pub fn text(id: WidgetId, text: impl Into<String>, position: Point, theme: Theme) -> Self {
        Self {
            id,
            content: WidgetContent::Text(text.into()),
            position,
            theme,
        }
    }

    pub fn trending(id: WidgetId, items: Vec<TrendingItem>, position: Point) -> Self {
        Self {
            id,
            content: WidgetContent::Trending(TrendingBlock::new(items)),
            position,
            theme: Theme::default(),
        }
    }

    pub fn origin(&self) -> WidgetOrigin {
        match self.content {
            WidgetContent::Text(_) => WidgetOrigin::Custom,
            WidgetContent::Trending(_) => WidgetOrigin::Trending,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.origin() == WidgetOrigin::Custom
    }

    /// Display label: the tag text, or the block title.
    pub fn label(&self) -> String {
        match &self.content {
            WidgetContent::Text(text) => text.clone(),
            WidgetContent::Trending(block) => block.title(),
        }
    }

    pub fn trending_block(&self) -> Option<&TrendingBlock> {
        match &self.content {
            WidgetContent::Trending(block) => Some(block),
            WidgetContent::Text(_) => None,
        }
    }

    /// Persisted form, `None` for externally-sourced widgets.
    pub fn to_record(&self) -> Option<WidgetRecord> {
        match &self.content {
            WidgetContent::Text(text) => Some(WidgetRecord {
                id: self.id,
                text: text.clone(),
                x: self.position.x,
                y: self.position.y,
                origin: WidgetOrigin::Custom,
                theme: self.theme,
            }),
            WidgetContent::Trending(_) => None,
        }
    }
}

/// One entry of the persisted widget list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    pub id: WidgetId,
    pub text: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default)]
    pub origin: WidgetOrigin,
    #[serde(default, deserialize_with = "lenient_theme")]
    pub theme: Theme,
}

/// Unknown or missing theme names fall back to the default theme.
fn lenient_theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(match name {
        Some(name) => name.parse().unwrap_or_else(|e| {
            log::warn!("Saved widget has {}, using default", e);
            Theme::default()
        }),
        None => Theme::default(),
    })
}

impl WidgetRecord {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let widget = Widget::text(WidgetId(3), "Work", Point::new(100.0, 400.0), Theme::Orange);
        let record = widget.to_record().unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["type"], "custom");
        assert_eq!(json["theme"], "theme-orange");
        assert_eq!(json["x"], 100.0);
    }

    #[test]
    fn test_record_defaults_theme() {
        let record: WidgetRecord =
            serde_json::from_str(r#"{"id": 7, "text": "Old", "x": 1.0, "y": 2.0}"#).unwrap();
        assert_eq!(record.theme, Theme::Green);
        assert_eq!(record.origin, WidgetOrigin::Custom);
        assert_eq!(record.position(), Point::new(1.0, 2.0));
    }

    #[test]
    fn test_record_unknown_theme_falls_back() {
        let record: WidgetRecord = serde_json::from_str(
            r#"{"id": 2, "text": "Odd", "x": 0.0, "y": 0.0, "theme": "theme-blue"}"#,
        )
        .unwrap();
        assert_eq!(record.theme, Theme::Green);

        let record: WidgetRecord =
            serde_json::from_str(r#"{"id": 2, "text": "Odd", "x": 0.0, "y": 0.0, "theme": null}"#)
                .unwrap();
        assert_eq!(record.theme, Theme::Green);
    }

    #[test]
    fn test_trending_widget_has_no_record() {
        let widget = Widget::trending(WidgetId(1), Vec::new(), Point::new(50.0, 50.0));
        assert_eq!(widget.origin(), WidgetOrigin::Trending);
        assert!(widget.to_record().is_none());
    }

    #[test]
    fn test_theme_from_str() {
        assert_eq!("red".parse::<Theme>().unwrap(), Theme::Red);
        assert_eq!("theme-purple".parse::<Theme>().unwrap(), Theme::Purple);
        assert!("blue".parse::<Theme>().is_err());
    }
}
