//! # Filter/Sort Controller
//!
//! Holds the active filter set and the sort recency stack for one item
//! collection, derives the filtered and sorted view, and mirrors the durable
//! part of the state into URL query parameters.
//!
//! ## Recomputation
//!
//! 1. Items are keyed by identity; items without a key are dropped.
//! 2. Active filters are ANDed. Ids missing from the catalogue are inert.
//! 3. Active sorts are applied as stable sorts from the oldest activation to
//!    the newest, so the most recently selected sort dominates and older
//!    ones break its ties.
//! 4. The listener is only called when the ordered id list changed.
//!
//! ## Example
//!
//! ```rust
//! use showcase_core::controller::{
//!     Catalogue, FilterOption, FilterSortController, SortDirection, SortOption,
//! };
//!
//! let catalogue = Catalogue::new(
//!     vec![FilterOption::new("even", "Even", |n: &u32| n % 2 == 0)],
//!     vec![SortOption::new("value", "Value", SortDirection::Desc, |a: &u32, b: &u32| a.cmp(b))],
//! );
//!
//! let mut controller = FilterSortController::builder(catalogue, |n: &u32| Some(n.to_string()))
//!     .items(vec![1, 2, 3, 4])
//!     .build();
//!
//! controller.on_filter_select("even");
//! controller.on_sort_select("value");
//! assert_eq!(controller.items(), &[4, 2]);
//! ```

pub mod deferred;
pub mod options;
pub mod state;
pub mod url;

pub use deferred::{DeferredWriter, RecordingSink, UrlSink};
pub use options::{Catalogue, Comparator, FilterOption, Predicate, SortDirection, SortOption};
pub use state::{ControllerState, SortTransition};
pub use url::{GenericUrlCodec, QueryParams, UrlCodec, UrlState};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Derives the identity key of an item
pub type IdentityFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Receives the filtered, sorted view whenever its order changes
pub type Listener<T> = Box<dyn FnMut(&[T]) + Send>;

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Length bound of the sort recency stack
    pub max_sorts: usize,

    /// Sort id that is never written to the URL
    pub default_sort_id: String,

    /// Direction that is never written to the URL
    pub default_direction: SortDirection,

    /// Delay before a URL write is flushed
    pub url_write_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_sorts: 3,
            default_sort_id: "none".to_string(),
            default_direction: SortDirection::Desc,
            url_write_delay: Duration::from_millis(50),
        }
    }
}

/// Generic filter/sort controller over a collection of `T`
pub struct FilterSortController<T> {
    config: ControllerConfig,
    catalogue: Catalogue<T>,
    identity: IdentityFn<T>,
    items: Vec<T>,
    state: ControllerState,
    view: Vec<T>,
    last_emitted: Option<Vec<String>>,
    listener: Option<Listener<T>>,
    codec: Box<dyn UrlCodec>,
    url_writer: Option<DeferredWriter>,
}

/// Builder for [`FilterSortController`]
pub struct ControllerBuilder<T> {
    catalogue: Catalogue<T>,
    identity: IdentityFn<T>,
    items: Vec<T>,
    config: ControllerConfig,
    listener: Option<Listener<T>>,
    codec: Option<Box<dyn UrlCodec>>,
    sink: Option<Arc<dyn UrlSink>>,
    initial_query: Option<QueryParams>,
    initial_state: Option<UrlState>,
}

impl<T: Clone> ControllerBuilder<T> {
    /// Initial working collection
    pub fn items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_sorts(mut self, max_sorts: usize) -> Self {
        self.config.max_sorts = max_sorts;
        self
    }

    /// Called with the view whenever its order changes, including once on build
    pub fn listener(mut self, listener: impl FnMut(&[T]) + Send + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Codec used for seeding and URL writes (generic encoding by default)
    pub fn url_codec(mut self, codec: impl UrlCodec + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }

    /// Destination of deferred URL writes
    pub fn url_sink(mut self, sink: Arc<dyn UrlSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Query parameters to seed the state from
    pub fn initial_query(mut self, params: QueryParams) -> Self {
        self.initial_query = Some(params);
        self
    }

    /// Already-decoded state to seed from; takes precedence over `initial_query`
    pub fn initial_state(mut self, state: UrlState) -> Self {
        self.initial_state = Some(state);
        self
    }

    pub fn build(self) -> FilterSortController<T> {
        let mut config = self.config;
        config.max_sorts = config.max_sorts.max(1);

        let codec = self.codec.unwrap_or_else(|| {
            Box::new(GenericUrlCodec::new(
                config.default_sort_id.clone(),
                config.default_direction,
            ))
        });

        let url_writer = self
            .sink
            .map(|sink| DeferredWriter::new(sink, config.url_write_delay));

        let mut controller = FilterSortController {
            config,
            catalogue: self.catalogue,
            identity: self.identity,
            items: self.items,
            state: ControllerState::new(),
            view: Vec::new(),
            last_emitted: None,
            listener: self.listener,
            codec,
            url_writer,
        };

        let url_state = self
            .initial_state
            .or_else(|| self.initial_query.map(|params| controller.codec.decode(&params)));
        if let Some(url_state) = url_state {
            controller.seed(&url_state);
        }

        controller.recompute();
        controller
    }
}

impl<T: Clone> FilterSortController<T> {
    /// Start building a controller over `catalogue`, keyed by `identity`
    pub fn builder(
        catalogue: Catalogue<T>,
        identity: impl Fn(&T) -> Option<String> + Send + Sync + 'static,
    ) -> ControllerBuilder<T> {
        ControllerBuilder {
            catalogue,
            identity: Arc::new(identity),
            items: Vec::new(),
            config: ControllerConfig::default(),
            listener: None,
            codec: None,
            sink: None,
            initial_query: None,
            initial_state: None,
        }
    }

    /// Full filter catalogue annotated with active flags
    pub fn filter_options(&self) -> Vec<FilterOption<T>> {
        self.catalogue
            .filters
            .iter()
            .map(|filter| {
                let mut filter = filter.clone();
                filter.active = self.state.is_filter_active(&filter.id);
                filter
            })
            .collect()
    }

    /// Selectable sorts annotated with active flags and resolved directions
    pub fn sort_options(&self) -> Vec<SortOption<T>> {
        self.catalogue
            .sorts
            .iter()
            .filter(|sort| !sort.disabled)
            .map(|sort| {
                let mut sort = sort.clone();
                sort.active = self.state.is_sort_active(&sort.id);
                sort.direction = self.state.resolved_direction(&sort.id, sort.direction);
                sort
            })
            .collect()
    }

    /// Toggle a filter. Unknown ids are ignored.
    pub fn on_filter_select(&mut self, id: &str) {
        if self.catalogue.filter(id).is_none() {
            debug!("Ignoring selection of unknown filter `{}`", id);
            return;
        }
        self.update(|state, _| {
            state.toggle_filter(id);
            true
        });
    }

    /// Advance a sort through its three-state cycle. Unknown and disabled
    /// sorts are ignored.
    pub fn on_sort_select(&mut self, id: &str) {
        let Some(default) = self.catalogue.selectable_sort(id).map(|s| s.direction) else {
            debug!("Ignoring selection of unknown or disabled sort `{}`", id);
            return;
        };
        let max_sorts = self.config.max_sorts;
        self.update(|state, _| {
            let transition = state.cycle_sort(id, default, max_sorts);
            debug!("Sort `{}`: {:?}", id, transition);
            true
        });
    }

    /// Apply several state changes as one mutation: one version bump, one
    /// recomputation, one URL write. The closure returns whether it changed
    /// anything.
    pub fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut ControllerState, &Catalogue<T>) -> bool,
    {
        if !mutate(&mut self.state, &self.catalogue) {
            return;
        }
        self.state.bump_version();
        self.recompute();
        self.sync_url();
    }

    /// Replace the working collection and recompute the view
    pub fn update_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.recompute();
    }

    /// Swap the catalogue without recomputing. Active ids missing from the
    /// new catalogue stay in the state but become inert.
    pub fn set_catalogue(&mut self, catalogue: Catalogue<T>) {
        self.catalogue = catalogue;
    }

    pub fn catalogue(&self) -> &Catalogue<T> {
        &self.catalogue
    }

    /// Filtered, sorted view
    pub fn items(&self) -> &[T] {
        &self.view
    }

    /// Unfiltered working collection
    pub fn all_items(&self) -> &[T] {
        &self.items
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn active_filter_ids(&self) -> &[String] {
        self.state.active_filter_ids()
    }

    pub fn active_sort_ids(&self) -> &[String] {
        self.state.active_sort_ids()
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn max_sorts(&self) -> usize {
        self.config.max_sorts
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Resolved direction of a sort (its default when inactive)
    pub fn sort_direction(&self, id: &str) -> Option<SortDirection> {
        self.catalogue
            .sort(id)
            .map(|sort| self.state.resolved_direction(id, sort.direction))
    }

    /// The part of the state that survives a reload
    pub fn url_state(&self) -> UrlState {
        let sort = self.state.active_sort_ids().first().map(|id| {
            let default = self
                .catalogue
                .sort(id)
                .map(|s| s.direction)
                .unwrap_or(self.config.default_direction);
            (id.clone(), self.state.resolved_direction(id, default))
        });

        UrlState {
            filters: self.state.active_filter_ids().to_vec(),
            sort,
        }
    }

    /// Query parameters describing the current state
    pub fn query_params(&self) -> QueryParams {
        self.codec.encode(&self.url_state())
    }

    /// Write any deferred URL update now
    pub fn flush_url(&self) {
        if let Some(writer) = &self.url_writer {
            writer.flush();
        }
    }

    /// Apply decoded URL state; ids unknown to the catalogue are skipped
    fn seed(&mut self, url_state: &UrlState) {
        for id in &url_state.filters {
            if self.catalogue.filter(id).is_some() {
                self.state.activate_filter(id);
            } else {
                debug!("Dropping unknown filter `{}` from URL", id);
            }
        }

        if let Some((id, direction)) = &url_state.sort {
            match self.catalogue.selectable_sort(id).map(|s| s.direction) {
                Some(default) => {
                    self.state.activate_sort(id, self.config.max_sorts);
                    self.state.set_direction(id, *direction, default);
                }
                None => debug!("Dropping unknown sort `{}` from URL", id),
            }
        }
    }

    fn sync_url(&self) {
        if let Some(writer) = &self.url_writer {
            writer.schedule(self.codec.encode(&self.url_state()));
        }
    }

    fn recompute(&mut self) {
        let mut seen = HashSet::new();
        let mut keyed: Vec<(String, usize)> = Vec::with_capacity(self.items.len());
        for (index, item) in self.items.iter().enumerate() {
            let key = panic::catch_unwind(AssertUnwindSafe(|| (self.identity)(item)))
                .ok()
                .flatten()
                .filter(|key| !key.is_empty());
            match key {
                Some(key) if seen.insert(key.clone()) => keyed.push((key, index)),
                Some(key) => warn!("Dropping item with duplicate identity key `{}`", key),
                None => warn!("Dropping item without an identity key"),
            }
        }

        let active_filters: Vec<&FilterOption<T>> = self
            .state
            .active_filter_ids()
            .iter()
            .filter_map(|id| {
                let filter = self.catalogue.filter(id);
                if filter.is_none() {
                    debug!("Active filter `{}` is not in the catalogue; ignoring", id);
                }
                filter
            })
            .collect();

        let mut candidates: Vec<(String, usize)> = if active_filters.is_empty() {
            keyed
        } else {
            keyed
                .into_iter()
                .filter(|(_, index)| {
                    let item = &self.items[*index];
                    active_filters.iter().all(|filter| filter.matches(item))
                })
                .collect()
        };

        for id in self.state.active_sort_ids().iter().rev() {
            let Some(sort) = self.catalogue.sort(id) else {
                continue;
            };
            let direction = self.state.resolved_direction(id, sort.direction);
            let items = &self.items;
            let previous = candidates.clone();
            let sorted = panic::catch_unwind(AssertUnwindSafe(|| {
                candidates.sort_by(|(_, a), (_, b)| sort.compare(&items[*a], &items[*b], direction));
            }));
            if sorted.is_err() {
                warn!("Sort `{}` failed; keeping previous order", id);
                candidates = previous;
            }
        }

        self.view = candidates
            .iter()
            .map(|(_, index)| self.items[*index].clone())
            .collect();

        let ids: Vec<String> = candidates.into_iter().map(|(key, _)| key).collect();
        if self.last_emitted.as_ref() == Some(&ids) {
            debug!("View unchanged; skipping notification");
            return;
        }
        self.last_emitted = Some(ids);

        if let Some(listener) = self.listener.as_mut() {
            listener(&self.view);
        }
    }
}
