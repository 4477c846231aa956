//! Multi-provider search box.

use crate::events::{EventBus, SearchEvent};
use crate::storage::{KeyValueStore, PROVIDER_KEY};
use crate::view::Navigator;
use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Provider used when nothing else is configured.
pub const DEFAULT_PROVIDER: &str = "google";

/// Characters a URI component keeps literal besides alphanumerics.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single URI component (spaces become `%20`).
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

/// A search destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub key: String,
    pub name: String,
    pub icon: String,
    /// The encoded query is appended to this.
    pub url_prefix: String,
    pub placeholder: String,
    pub color: String,
}

impl Provider {
    pub fn new(key: &str, name: &str, icon: &str, url_prefix: &str, color: &str) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            url_prefix: url_prefix.to_string(),
            placeholder: name.to_string(),
            color: color.to_string(),
        }
    }

    /// Full search URL for a query.
    pub fn query_url(&self, query: &str) -> String {
        format!("{}{}", self.url_prefix, encode_component(query))
    }
}

/// Ordered set of providers, keyed by `Provider::key`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            providers: vec![
                Provider::new(
                    "google",
                    "Google",
                    "fab fa-google",
                    "https://www.google.com/search?q=",
                    "#4285f4",
                ),
                Provider::new(
                    "bing",
                    "Bing",
                    "fab fa-microsoft",
                    "https://www.bing.com/search?q=",
                    "#0078d4",
                ),
                Provider::new(
                    "bilibili",
                    "Bilibili",
                    "fab fa-youtube",
                    "https://search.bilibili.com/all?keyword=",
                    "#fb7299",
                ),
                Provider::new(
                    "zhihu",
                    "Zhihu",
                    "fas fa-question-circle",
                    "https://www.zhihu.com/search?type=content&q=",
                    "#0084ff",
                ),
                Provider::new(
                    "github",
                    "GitHub",
                    "fab fa-github",
                    "https://github.com/search?q=",
                    "#333",
                ),
            ],
        }
    }
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn first(&self) -> Option<&Provider> {
        self.providers.first()
    }

    /// Insert or replace a provider.
    pub fn insert(&mut self, provider: Provider) {
        match self.providers.iter_mut().find(|p| p.key == provider.key) {
            Some(existing) => *existing = provider,
            None => self.providers.push(provider),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Provider> {
        let index = self.providers.iter().position(|p| p.key == key)?;
        Some(self.providers.remove(index))
    }
}

/// Dispatches queries to the selected provider and remembers the selection.
pub struct SearchManager<S: KeyValueStore> {
    store: Arc<S>,
    registry: ProviderRegistry,
    current: String,
}

impl<S: KeyValueStore> SearchManager<S> {
    /// Create with the default providers, restoring the last used one.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_registry(store, ProviderRegistry::default())
    }

    pub fn with_registry(store: Arc<S>, registry: ProviderRegistry) -> Self {
        let fallback = if registry.contains(DEFAULT_PROVIDER) {
            DEFAULT_PROVIDER.to_string()
        } else {
            registry.first().map(|p| p.key.clone()).unwrap_or_default()
        };
        let current = match store.get(PROVIDER_KEY) {
            Ok(Some(key)) if registry.contains(&key) => key,
            Ok(_) => fallback,
            Err(e) => {
                log::error!("Failed to read last search provider: {}", e);
                fallback
            }
        };
        log::info!("Search provider: {}", current);
        Self {
            store,
            registry,
            current,
        }
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<&Provider> {
        self.registry.get(&self.current)
    }

    pub fn current_key(&self) -> &str {
        &self.current
    }

    /// Open the query with the current provider. Blank queries do nothing.
    ///
    /// Returns the URL that was opened.
    pub fn perform_search(
        &self,
        query: &str,
        navigator: &mut dyn Navigator,
        bus: &mut EventBus<SearchEvent>,
    ) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            log::debug!("Empty query, not searching");
            return None;
        }
        let provider = self.current()?;
        let url = provider.query_url(query);
        log::info!("Searching {} for {:?}", provider.name, query);
        navigator.open_in_new_context(&url);
        bus.publish(&SearchEvent::SearchPerformed {
            query: query.to_string(),
            provider: provider.key.clone(),
            timestamp: Utc::now(),
        });
        Some(url)
    }

    /// Search with a specific provider, switching to it first when known.
    pub fn search_with(
        &mut self,
        query: &str,
        provider: Option<&str>,
        navigator: &mut dyn Navigator,
        bus: &mut EventBus<SearchEvent>,
    ) -> Option<String> {
        if let Some(key) = provider {
            self.switch_provider(key, bus);
        }
        self.perform_search(query, navigator, bus)
    }

    /// Select a provider. Unknown keys are ignored.
    pub fn switch_provider(&mut self, key: &str, bus: &mut EventBus<SearchEvent>) -> bool {
        let Some(provider) = self.registry.get(key) else {
            log::warn!("Unknown search provider: {}", key);
            return false;
        };
        let event = SearchEvent::ProviderChanged {
            provider: provider.key.clone(),
            name: provider.name.clone(),
        };
        self.current = key.to_string();
        self.save_current();
        bus.publish(&event);
        true
    }

    pub fn add_provider(&mut self, provider: Provider) {
        self.registry.insert(provider);
    }

    /// Remove a provider unless it is the last one. Removing the current
    /// provider selects the first remaining one.
    pub fn remove_provider(&mut self, key: &str) -> bool {
        if self.registry.len() <= 1 || !self.registry.contains(key) {
            return false;
        }
        self.registry.remove(key);
        if self.current == key {
            if let Some(first) = self.registry.first() {
                self.current = first.key.clone();
            }
            self.save_current();
        }
        true
    }

    fn save_current(&self) {
        if let Err(e) = self.store.set(PROVIDER_KEY, &self.current) {
            log::error!("Failed to save search provider: {}", e);
        }
    }
}
