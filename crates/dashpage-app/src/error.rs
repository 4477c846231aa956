//! Application errors.

use crate::config::ConfigError;
use dashpage_core::{StorageError, TrendingError, WidgetId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Trending(#[from] TrendingError),
    #[error("No widget with id {0}")]
    UnknownWidget(WidgetId),
    #[error("Unknown search provider: {0}")]
    UnknownProvider(String),
    #[error("No trending cache configured")]
    NoTrendingSource,
}
