//! dashpage core library
//!
//! Platform-agnostic logic for a personal start page: a board of draggable
//! widgets with persisted layout, a multi-provider search box and a block of
//! trending records. Rendering, navigation, frame callbacks and HTTP are
//! reached through traits.

pub mod config;
pub mod drag;
pub mod events;
pub mod frame;
pub mod geometry;
pub mod search;
pub mod storage;
pub mod trending;
pub mod view;
pub mod widget;

pub use config::{BoardConfig, SeedWidget};
pub use drag::{DragEngine, DragSession};
pub use events::{EventBus, SearchEvent, SubscriptionId};
pub use frame::{FrameScheduler, FrameToken, ManualFrameScheduler};
pub use search::{Provider, ProviderRegistry, SearchManager};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use trending::{CacheFileSource, TrendingError, TrendingItem, TrendingResult, TrendingSource};
pub use view::{BoardView, HeadlessView, Navigator, RecordingNavigator};
pub use widget::{Theme, Widget, WidgetBoard, WidgetContent, WidgetId, WidgetOrigin, WidgetState};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
