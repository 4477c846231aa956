//! Application context.
//!
//! `App` owns one instance of every manager and routes page events to them.
//! Nothing is looked up globally; views and sources are handed in.

use dashpage_core::{
    BoardConfig, BoardView, DragEngine, EventBus, FrameScheduler, FrameToken, KeyValueStore,
    ManualFrameScheduler, Navigator, SearchEvent, SearchManager, Theme, TrendingSource, WidgetBoard,
    WidgetId,
};
use kurbo::Point;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct App<S, V, N, F = ManualFrameScheduler>
where
    S: KeyValueStore,
    V: BoardView,
    N: Navigator,
    F: FrameScheduler,
{
    board: WidgetBoard<S>,
    drag: DragEngine<F>,
    search: SearchManager<S>,
    search_events: EventBus<SearchEvent>,
    view: V,
    navigator: N,
    exit_animation: Duration,
    removal_deadlines: HashMap<WidgetId, Instant>,
}

impl<S, V, N, F> App<S, V, N, F>
where
    S: KeyValueStore,
    V: BoardView,
    N: Navigator,
    F: FrameScheduler,
{
    pub fn new(store: Arc<S>, config: BoardConfig, view: V, navigator: N, frames: F) -> Self {
        let drag = DragEngine::new(frames, config.drag_z_index);
        let exit_animation = config.exit_animation();
        Self {
            search: SearchManager::new(store.clone()),
            board: WidgetBoard::new(store, config),
            drag,
            search_events: EventBus::new(),
            view,
            navigator,
            exit_animation,
            removal_deadlines: HashMap::new(),
        }
    }

    /// Restore the persisted board. Returns the number of widgets shown.
    pub fn start(&mut self) -> usize {
        match self.board.load_persisted(&mut self.view) {
            Ok(count) => count,
            Err(e) => {
                log::error!("Failed to save seeded widgets: {}", e);
                self.board.len()
            }
        }
    }

    pub fn board(&self) -> &WidgetBoard<S> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut WidgetBoard<S> {
        &mut self.board
    }

    pub fn drag(&self) -> &DragEngine<F> {
        &self.drag
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn search(&self) -> &SearchManager<S> {
        &self.search
    }

    pub fn search_events_mut(&mut self) -> &mut EventBus<SearchEvent> {
        &mut self.search_events
    }

    // Pointer input

    pub fn pointer_down(&mut self, id: WidgetId, pointer: Point) -> bool {
        self.drag
            .begin_drag(&mut self.board, &mut self.view, id, pointer)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
        self.drag.update_drag(pointer)
    }

    pub fn pointer_up(&mut self) -> Option<(WidgetId, Point)> {
        match self.drag.end_drag(&mut self.board, &mut self.view) {
            Ok(committed) => committed,
            Err(e) => {
                log::error!("Failed to save widget position: {}", e);
                None
            }
        }
    }

    pub fn focus_lost(&mut self) {
        if let Err(e) = self.drag.focus_lost(&mut self.board, &mut self.view) {
            log::error!("Failed to save widget position: {}", e);
        }
    }

    /// A frame requested by the drag engine is due.
    pub fn frame(&mut self, token: FrameToken) -> bool {
        self.drag.on_frame(token, &mut self.view)
    }

    // Widgets

    /// Create a user widget. The widget stays on the page when saving
    /// fails; `None` means no widget was added.
    pub fn add_widget(
        &mut self,
        text: &str,
        position: Option<Point>,
        theme: Option<Theme>,
    ) -> Option<WidgetId> {
        match self
            .board
            .create_widget(&mut self.view, text, position, theme)
        {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("Failed to save widgets: {}", e);
                self.board.widgets().last().map(|w| w.id)
            }
        }
    }

    /// Close button pressed: start the exit animation.
    pub fn close_widget(&mut self, id: WidgetId) -> bool {
        self.close_widget_at(id, Instant::now())
    }

    /// Start the exit animation as of `now`. The widget is removed by the
    /// first [`App::tick`] at or after `now + exit_animation`.
    pub fn close_widget_at(&mut self, id: WidgetId, now: Instant) -> bool {
        if self.drag.active_widget() == Some(id) {
            self.pointer_up();
        }
        if !self.board.remove_widget(&mut self.view, id) {
            return false;
        }
        self.removal_deadlines.insert(id, now + self.exit_animation);
        true
    }

    /// Finish every removal whose exit animation has run out. Returns the
    /// removed ids.
    pub fn tick(&mut self, now: Instant) -> Vec<WidgetId> {
        let due: Vec<WidgetId> = self
            .board
            .pending_removals()
            .into_iter()
            .filter(|id| {
                self.removal_deadlines
                    .get(id)
                    .is_none_or(|deadline| *deadline <= now)
            })
            .collect();
        due.into_iter()
            .filter(|&id| self.finish_removal(id))
            .collect()
    }

    /// Earliest pending removal deadline, if any.
    pub fn next_removal(&self) -> Option<Instant> {
        self.removal_deadlines.values().min().copied()
    }

    /// Exit animation finished.
    pub fn finish_removal(&mut self, id: WidgetId) -> bool {
        self.removal_deadlines.remove(&id);
        match self.board.complete_removal(&mut self.view, id) {
            Ok(removed) => removed,
            Err(e) => {
                log::error!("Failed to save widgets after removal: {}", e);
                true
            }
        }
    }

    // Trending

    /// Automatic load at start-up. Failures are logged and skipped.
    pub fn load_trending(&mut self, source: &dyn TrendingSource) -> Option<WidgetId> {
        match source.fetch() {
            Ok(items) => {
                log::info!("Loaded {} trending items", items.len());
                Some(self.board.add_trending_block(&mut self.view, items))
            }
            Err(e) => {
                log::error!("Failed to load trending data: {}", e);
                None
            }
        }
    }

    /// Refresh button on a trending block. Failures are shown to the user.
    pub fn refresh_trending_block(&mut self, source: &dyn TrendingSource, id: WidgetId) -> bool {
        match source.refresh() {
            Ok(items) => {
                log::info!("Refreshed trending block {} with {} items", id, items.len());
                self.board.update_trending_block(&mut self.view, id, items)
            }
            Err(e) => {
                log::error!("Failed to refresh trending block {}: {}", id, e);
                self.view.alert(&format!("Refresh failed: {e}"));
                false
            }
        }
    }

    /// Replace every trending block with freshly refreshed data.
    pub fn reload_trending(&mut self, source: &dyn TrendingSource) -> bool {
        if let Some(active) = self.drag.active_widget() {
            if self.board.trending_blocks().contains(&active) {
                self.pointer_up();
            }
        }
        self.board.remove_trending_blocks(&mut self.view);
        match source.refresh() {
            Ok(items) => {
                self.board.add_trending_block(&mut self.view, items);
                self.view.alert("Trending data refreshed");
                true
            }
            Err(e) => {
                log::error!("Failed to reload trending data: {}", e);
                self.view.alert("Trending data refresh failed");
                false
            }
        }
    }

    /// Open the record at `rank` of a trending block.
    pub fn open_trending_item(&mut self, id: WidgetId, rank: usize) -> bool {
        let Some(link) = self.board.trending_link(id, rank) else {
            return false;
        };
        log::info!("Opening trending item {} of block {}", rank, id);
        self.navigator.open_in_new_context(link);
        true
    }

    // Search

    pub fn search_query(&mut self, query: &str) -> Option<String> {
        self.search
            .perform_search(query, &mut self.navigator, &mut self.search_events)
    }

    pub fn search_with(&mut self, query: &str, provider: Option<&str>) -> Option<String> {
        self.search.search_with(
            query,
            provider,
            &mut self.navigator,
            &mut self.search_events,
        )
    }

    pub fn switch_provider(&mut self, key: &str) -> bool {
        self.search.switch_provider(key, &mut self.search_events)
    }
}

impl<S, V, N> App<S, V, N, ManualFrameScheduler>
where
    S: KeyValueStore,
    V: BoardView,
    N: Navigator,
{
    /// Run one frame of the manual scheduler.
    pub fn advance_frame(&mut self) -> usize {
        self.drag.advance_frame(&mut self.view)
    }
}
