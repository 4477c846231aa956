//! The widget board: in-memory widget list, visual state and persistence.

use super::model::{Theme, Widget, WidgetContent, WidgetId, WidgetRecord};
use super::state::WidgetState;
use crate::config::BoardConfig;
use crate::geometry::{can_contain, clamp_to_container};
use crate::storage::{KeyValueStore, StorageResult, WIDGETS_KEY, load_json, save_json};
use crate::trending::{TrendingBlock, TrendingItem};
use crate::view::BoardView;
use kurbo::{Point, Size};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Owns every widget on the page.
///
/// User-created widgets are written back to the store as a whole list after
/// each mutation. Trending widgets live only in memory and are re-fetched on
/// every start.
pub struct WidgetBoard<S: KeyValueStore> {
    store: Arc<S>,
    config: BoardConfig,
    /// Widgets in creation order.
    widgets: Vec<Widget>,
    states: HashMap<WidgetId, WidgetState>,
    last_id: u64,
    rng: StdRng,
}

impl<S: KeyValueStore> WidgetBoard<S> {
    pub fn new(store: Arc<S>, config: BoardConfig) -> Self {
        Self {
            store,
            config,
            widgets: Vec::new(),
            states: HashMap::new(),
            last_id: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replace the random source used for default placement and themes.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn state(&self, id: WidgetId) -> WidgetState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn set_state(&mut self, id: WidgetId, state: WidgetState) {
        if self.contains(id) {
            self.states.insert(id, state);
        }
    }

    fn allocate_id(&mut self) -> WidgetId {
        self.last_id += 1;
        WidgetId(self.last_id)
    }

    fn container_size(view: &dyn BoardView) -> Option<Size> {
        view.container_rect().map(|rect| rect.size())
    }

    /// Random point leaving room for a default-sized widget.
    fn random_position(&mut self, view: &dyn BoardView) -> Point {
        let Some(container) = Self::container_size(view) else {
            log::warn!("Widget container not found, placing new widget at the origin");
            return Point::ZERO;
        };
        let max_x = container.width - self.config.widget_size.width;
        let max_y = container.height - self.config.widget_size.height;
        let x = if max_x > 0.0 { self.rng.gen_range(0.0..max_x) } else { 0.0 };
        let y = if max_y > 0.0 { self.rng.gen_range(0.0..max_y) } else { 0.0 };
        Point::new(x, y)
    }

    fn random_theme(&mut self) -> Theme {
        Theme::ALL[self.rng.gen_range(0..Theme::ALL.len())]
    }

    /// Keep a position inside the container when the container can hold the
    /// widget. An unmeasurable or too-small container leaves it untouched.
    fn settle(&self, position: Point, widget: Size, view: &dyn BoardView) -> Point {
        match Self::container_size(view) {
            Some(container) if can_contain(container, widget) => {
                clamp_to_container(position, container, widget)
            }
            _ => position,
        }
    }

    fn insert(&mut self, widget: Widget, view: &mut dyn BoardView) {
        view.render(&widget);
        self.states.insert(widget.id, WidgetState::Normal);
        self.widgets.push(widget);
    }

    /// Create a user widget, render it and persist the updated list.
    ///
    /// The widget stays on the board even when persisting fails.
    pub fn create_widget(
        &mut self,
        view: &mut dyn BoardView,
        text: impl Into<String>,
        position: Option<Point>,
        theme: Option<Theme>,
    ) -> StorageResult<WidgetId> {
        let id = self.allocate_id();
        let position = match position {
            Some(position) => self.settle(position, self.config.widget_size, view),
            None => self.random_position(view),
        };
        let theme = theme.unwrap_or_else(|| self.random_theme());
        let widget = Widget::text(id, text, position, theme);
        log::debug!("Creating widget {} at ({}, {})", id, position.x, position.y);
        self.insert(widget, view);
        self.persist()?;
        Ok(id)
    }

    /// Add a block of trending records. Never persisted.
    pub fn add_trending_block(
        &mut self,
        view: &mut dyn BoardView,
        items: Vec<TrendingItem>,
    ) -> WidgetId {
        let id = self.allocate_id();
        log::info!("Adding trending block {} with {} items", id, items.len());
        let widget = Widget::trending(id, items, self.config.trending_origin);
        self.insert(widget, view);
        id
    }

    /// Replace the records of a trending block in place.
    pub fn update_trending_block(
        &mut self,
        view: &mut dyn BoardView,
        id: WidgetId,
        items: Vec<TrendingItem>,
    ) -> bool {
        let Some(widget) = self.get_mut(id) else {
            return false;
        };
        if !matches!(widget.content, WidgetContent::Trending(_)) {
            return false;
        }
        widget.content = WidgetContent::Trending(TrendingBlock::new(items));
        view.render(widget);
        true
    }

    /// Ids of every trending block.
    pub fn trending_blocks(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|w| !w.is_persistent())
            .map(|w| w.id)
            .collect()
    }

    /// Drop every trending block immediately, without animation.
    pub fn remove_trending_blocks(&mut self, view: &mut dyn BoardView) -> usize {
        let ids = self.trending_blocks();
        for id in &ids {
            view.remove(*id);
            self.states.remove(id);
        }
        self.widgets.retain(|w| w.is_persistent());
        ids.len()
    }

    /// Link of the record at `rank` in a trending block.
    pub fn trending_link(&self, id: WidgetId, rank: usize) -> Option<&str> {
        self.get(id)?
            .trending_block()?
            .items
            .get(rank)
            .map(|item| item.link.as_str())
    }

    /// Start removing a widget by playing its exit animation.
    ///
    /// [`complete_removal`](Self::complete_removal) finishes the job once the
    /// animation is over.
    pub fn remove_widget(&mut self, view: &mut dyn BoardView, id: WidgetId) -> bool {
        if !self.contains(id) || self.state(id).is_removing() {
            return false;
        }
        view.play_exit_animation(id);
        self.states.insert(id, WidgetState::Removing);
        true
    }

    /// Remove a widget from the view, the board and the persisted list.
    pub fn complete_removal(
        &mut self,
        view: &mut dyn BoardView,
        id: WidgetId,
    ) -> StorageResult<bool> {
        let Some(index) = self.widgets.iter().position(|w| w.id == id) else {
            return Ok(false);
        };
        let widget = self.widgets.remove(index);
        self.states.remove(&id);
        view.remove(id);
        log::debug!("Removed widget {}", id);
        if widget.is_persistent() {
            self.persist()?;
        }
        Ok(true)
    }

    /// Widgets whose exit animation is still running.
    pub fn pending_removals(&self) -> Vec<WidgetId> {
        self.widgets
            .iter()
            .filter(|w| self.state(w.id).is_removing())
            .map(|w| w.id)
            .collect()
    }

    /// Record the authoritative position of a widget.
    pub fn commit_position(&mut self, id: WidgetId, position: Point) -> StorageResult<bool> {
        let Some(widget) = self.get_mut(id) else {
            return Ok(false);
        };
        widget.position = position;
        let persistent = widget.is_persistent();
        if persistent {
            self.persist()?;
        }
        Ok(true)
    }

    /// Move a widget without a drag gesture.
    ///
    /// The position is clamped against the measured widget and container,
    /// written to the view and committed. Returns the settled position.
    pub fn place_widget(
        &mut self,
        view: &mut dyn BoardView,
        id: WidgetId,
        position: Point,
    ) -> StorageResult<Option<Point>> {
        if !self.contains(id) {
            return Ok(None);
        }
        let size = view
            .widget_rect(id)
            .map(|rect| rect.size())
            .unwrap_or(self.config.widget_size);
        let settled = self.settle(position, size, view);
        view.place(id, settled);
        self.commit_position(id, settled)?;
        Ok(Some(settled))
    }

    /// Persisted form of every user widget, in board order.
    pub fn records(&self) -> Vec<WidgetRecord> {
        self.widgets.iter().filter_map(Widget::to_record).collect()
    }

    /// Write the user widget list to the store.
    pub fn persist(&self) -> StorageResult<()> {
        save_json(self.store.as_ref(), WIDGETS_KEY, &self.records())
    }

    /// Restore user widgets from the store.
    ///
    /// Entries that cannot be read are skipped one at a time. Missing,
    /// empty or wholly unreadable data seeds the configured example
    /// widgets instead. Returns the number of widgets added.
    pub fn load_persisted(&mut self, view: &mut dyn BoardView) -> StorageResult<usize> {
        let entries: Vec<Value> = match load_json(self.store.as_ref(), WIDGETS_KEY) {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(e) => {
                log::error!("Failed to load saved widgets: {}", e);
                Vec::new()
            }
        };
        let records: Vec<WidgetRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("Skipping saved widget {}: {}", index, e);
                    None
                }
            })
            .collect();

        if records.is_empty() {
            return self.seed_defaults(view);
        }

        let count = records.len();
        for record in records {
            let id = if record.id.0 == 0 || self.contains(record.id) {
                self.allocate_id()
            } else {
                self.last_id = self.last_id.max(record.id.0);
                record.id
            };
            let position = self.settle(record.position(), self.config.widget_size, view);
            self.insert(Widget::text(id, record.text, position, record.theme), view);
        }
        log::info!("Restored {} widgets", count);
        Ok(count)
    }

    fn seed_defaults(&mut self, view: &mut dyn BoardView) -> StorageResult<usize> {
        let seeds = self.config.seed_widgets.clone();
        log::info!("No saved widgets, creating {} examples", seeds.len());
        for seed in &seeds {
            let id = self.allocate_id();
            let theme = seed.theme.unwrap_or_else(|| self.random_theme());
            self.insert(Widget::text(id, seed.text.clone(), seed.position(), theme), view);
        }
        self.persist()?;
        Ok(seeds.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};
    use crate::view::HeadlessView;
    use kurbo::Rect;

    fn view() -> HeadlessView {
        HeadlessView::new(Rect::new(0.0, 0.0, 800.0, 600.0), Size::new(150.0, 50.0))
    }

    fn board(store: Arc<MemoryStore>) -> WidgetBoard<MemoryStore> {
        WidgetBoard::new(store, BoardConfig::default()).with_rng(StdRng::seed_from_u64(7))
    }

    fn stored(store: &MemoryStore) -> Vec<WidgetRecord> {
        load_json(store, WIDGETS_KEY).unwrap().unwrap_or_default()
    }

    #[test]
    fn test_seed_when_nothing_saved() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store.clone());

        assert_eq!(board.load_persisted(&mut view).unwrap(), 3);
        let positions: Vec<(String, Point)> =
            board.widgets().iter().map(|w| (w.label(), w.position)).collect();
        assert_eq!(
            positions,
            vec![
                ("Work".to_string(), Point::new(100.0, 400.0)),
                ("Study".to_string(), Point::new(300.0, 450.0)),
                ("Life".to_string(), Point::new(200.0, 500.0)),
            ]
        );
        assert_eq!(stored(&store).len(), 3);
    }

    #[test]
    fn test_seed_when_saved_list_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(WIDGETS_KEY, "[]").unwrap();
        let mut view = view();
        let mut board = board(store);
        assert_eq!(board.load_persisted(&mut view).unwrap(), 3);
    }

    #[test]
    fn test_malformed_data_falls_back_to_seeds() {
        let store = Arc::new(MemoryStore::new());
        store.set(WIDGETS_KEY, "{{{ definitely not a list").unwrap();
        let mut view = view();
        let mut board = board(store.clone());

        assert_eq!(board.load_persisted(&mut view).unwrap(), 3);
        assert_eq!(stored(&store).len(), 3);
    }

    #[test]
    fn test_bad_entries_do_not_drop_the_layout() {
        let store = Arc::new(MemoryStore::new());
        let saved = r#"[
            {"id": 1, "text": "Keep", "x": 10.0, "y": 20.0, "type": "custom", "theme": "theme-green"},
            {"id": 2, "text": "Odd", "x": 30.0, "y": 40.0, "type": "custom", "theme": "theme-blue"},
            {"id": 3, "x": 5.0, "y": 5.0},
            "garbage"
        ]"#;
        store.set(WIDGETS_KEY, saved).unwrap();
        let mut view = view();
        let mut board = board(store.clone());

        assert_eq!(board.load_persisted(&mut view).unwrap(), 2);
        let labels: Vec<String> = board.widgets().iter().map(Widget::label).collect();
        assert_eq!(labels, vec!["Keep".to_string(), "Odd".to_string()]);
        assert_eq!(board.get(WidgetId(2)).unwrap().theme, Theme::Green);
        // Nothing was written back; the stored list is untouched.
        assert_eq!(store.get(WIDGETS_KEY).unwrap().as_deref(), Some(saved));
    }

    #[test]
    fn test_round_trip_through_store() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut first = board(store.clone());
        first
            .create_widget(&mut view, "A", Some(Point::new(10.0, 20.0)), Some(Theme::Purple))
            .unwrap();

        let mut reloaded_view = self::view();
        let mut second = board(store);
        assert_eq!(second.load_persisted(&mut reloaded_view).unwrap(), 1);
        let widget = &second.widgets()[0];
        assert_eq!(widget.label(), "A");
        assert_eq!(widget.position, Point::new(10.0, 20.0));
        assert_eq!(widget.theme, Theme::Purple);
        assert!(reloaded_view.contains(widget.id));
    }

    #[test]
    fn test_restored_ids_continue_counter() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                WIDGETS_KEY,
                r#"[{"id": 4, "text": "a", "x": 0, "y": 0}, {"id": 9, "text": "b", "x": 5, "y": 5}]"#,
            )
            .unwrap();
        let mut view = view();
        let mut board = board(store);
        board.load_persisted(&mut view).unwrap();

        let id = board.create_widget(&mut view, "c", None, None).unwrap();
        assert_eq!(id, WidgetId(10));
    }

    #[test]
    fn test_random_position_within_bounds() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store);
        for _ in 0..50 {
            let id = board.create_widget(&mut view, "r", None, None).unwrap();
            let position = board.get(id).unwrap().position;
            assert!((0.0..650.0).contains(&position.x));
            assert!((0.0..550.0).contains(&position.y));
        }
    }

    #[test]
    fn test_random_position_without_container() {
        let store = Arc::new(MemoryStore::new());
        let mut view = HeadlessView::without_container(Size::new(150.0, 50.0));
        let mut board = board(store);
        let id = board.create_widget(&mut view, "r", None, None).unwrap();
        assert_eq!(board.get(id).unwrap().position, Point::ZERO);
    }

    #[test]
    fn test_explicit_position_is_clamped() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store);
        let id = board
            .create_widget(&mut view, "far", Some(Point::new(5000.0, -3.0)), None)
            .unwrap();
        assert_eq!(board.get(id).unwrap().position, Point::new(650.0, 0.0));
    }

    #[test]
    fn test_removal_removes_exactly_one() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store.clone());
        board.load_persisted(&mut view).unwrap();
        let target = board.widgets()[1].id;

        assert!(board.remove_widget(&mut view, target));
        assert_eq!(board.state(target), WidgetState::Removing);
        assert!(view.widget(target).unwrap().exiting);
        // Still persisted until the animation completes.
        assert_eq!(stored(&store).len(), 3);

        assert!(board.complete_removal(&mut view, target).unwrap());
        let remaining: Vec<String> = stored(&store).into_iter().map(|r| r.text).collect();
        assert_eq!(remaining, vec!["Work".to_string(), "Life".to_string()]);
        assert!(!view.contains(target));
        assert!(!board.complete_removal(&mut view, target).unwrap());
    }

    #[test]
    fn test_remove_twice_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store);
        let id = board.create_widget(&mut view, "x", None, None).unwrap();
        assert!(board.remove_widget(&mut view, id));
        assert!(!board.remove_widget(&mut view, id));
        assert_eq!(board.pending_removals(), vec![id]);
    }

    #[test]
    fn test_trending_blocks_are_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store.clone());
        board.create_widget(&mut view, "mine", None, None).unwrap();
        let block = board.add_trending_block(
            &mut view,
            vec![TrendingItem::from_keyword("k", "Show")],
        );
        board.commit_position(block, Point::new(300.0, 300.0)).unwrap();
        board.persist().unwrap();

        let records = stored(&store);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "mine");
        assert_eq!(board.get(block).unwrap().position, Point::new(300.0, 300.0));
        assert_eq!(
            board.trending_link(block, 0),
            Some("https://search.bilibili.com/all?keyword=k")
        );
        assert!(board.trending_link(block, 5).is_none());
    }

    #[test]
    fn test_update_and_remove_trending_blocks() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store);
        let text = board.create_widget(&mut view, "mine", None, None).unwrap();
        let block = board.add_trending_block(&mut view, Vec::new());
        assert_eq!(board.get(block).unwrap().position, Point::new(50.0, 50.0));

        let items = vec![
            TrendingItem::from_keyword("a", "A"),
            TrendingItem::from_keyword("b", "B"),
        ];
        assert!(board.update_trending_block(&mut view, block, items));
        assert!(!board.update_trending_block(&mut view, text, Vec::new()));
        assert_eq!(view.widget(block).unwrap().label, "Trending (2 items)");

        assert_eq!(board.remove_trending_blocks(&mut view), 1);
        assert!(!view.contains(block));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_place_widget_clamps_and_commits() {
        let store = Arc::new(MemoryStore::new());
        let mut view = view();
        let mut board = board(store.clone());
        let id = board
            .create_widget(&mut view, "p", Some(Point::new(0.0, 0.0)), None)
            .unwrap();

        let settled = board
            .place_widget(&mut view, id, Point::new(900.0, 700.0))
            .unwrap();
        assert_eq!(settled, Some(Point::new(650.0, 550.0)));
        assert_eq!(view.position(id), Some(Point::new(650.0, 550.0)));
        assert_eq!(stored(&store)[0].position(), Point::new(650.0, 550.0));
        assert_eq!(board.place_widget(&mut view, WidgetId(99), Point::ZERO).unwrap(), None);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Io("disk gone".to_string()))
        }
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Io("disk gone".to_string()))
        }
        fn remove(&self, _key: &str) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_persist_failure_keeps_widget() {
        let mut view = view();
        let mut board = WidgetBoard::new(Arc::new(FailingStore), BoardConfig::default());
        let result = board.create_widget(&mut view, "kept", Some(Point::new(1.0, 1.0)), None);
        assert!(matches!(result, Err(StorageError::Io(_))));
        assert_eq!(board.len(), 1);
    }
}
