use super::catalogue::{build_catalogue, category_id, category_of, is_category_id};
use super::project::Project;
use super::stats::PortfolioStats;
use super::url::CategoryUrlCodec;
use crate::controller::{
    Catalogue, ControllerBuilder, ControllerConfig, ControllerState, FilterOption,
    FilterSortController, GenericUrlCodec, QueryParams, SortOption, UrlCodec, UrlSink, UrlState,
};
use std::sync::Arc;
use tracing::debug;

/// Filter/sort controller over [`Project`]s.
///
/// Only one language category can be active at a time: activating a
/// category filter removes every other category filter and sort.
pub struct ProjectController {
    inner: FilterSortController<Project>,
    stats: PortfolioStats,
}

pub struct ProjectControllerBuilder {
    inner: ControllerBuilder<Project>,
    catalogue: Catalogue<Project>,
    config: ControllerConfig,
    stats: PortfolioStats,
    initial_query: Option<QueryParams>,
}

impl ProjectControllerBuilder {
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn listener(mut self, listener: impl FnMut(&[Project]) + Send + 'static) -> Self {
        self.inner = self.inner.listener(listener);
        self
    }

    pub fn url_sink(mut self, sink: Arc<dyn UrlSink>) -> Self {
        self.inner = self.inner.url_sink(sink);
        self
    }

    pub fn initial_query(mut self, params: QueryParams) -> Self {
        self.initial_query = Some(params);
        self
    }

    pub fn build(self) -> ProjectController {
        let codec = CategoryUrlCodec::new(GenericUrlCodec::new(
            self.config.default_sort_id.clone(),
            self.config.default_direction,
        ));

        let mut inner = self.inner;
        if let Some(params) = self.initial_query {
            let mut url_state = codec.decode(&params);
            single_category(&mut url_state, &self.catalogue);
            inner = inner.initial_state(url_state);
        }

        let inner = inner.config(self.config).url_codec(codec).build();
        ProjectController {
            inner,
            stats: self.stats,
        }
    }
}

impl ProjectController {
    pub fn builder(projects: Vec<Project>) -> ProjectControllerBuilder {
        let stats = PortfolioStats::from_projects(&projects);
        let catalogue = build_catalogue(&projects);
        let inner = FilterSortController::builder(catalogue.clone(), Project::identity)
            .items(projects);
        ProjectControllerBuilder {
            inner,
            catalogue,
            config: ControllerConfig::default(),
            stats,
            initial_query: None,
        }
    }

    pub fn new(projects: Vec<Project>) -> Self {
        Self::builder(projects).build()
    }

    /// Toggle a filter, keeping at most one category active
    pub fn on_filter_select(&mut self, id: &str) {
        let activating_category = is_category_id(id)
            && self.inner.catalogue().filter(id).is_some()
            && !self.inner.state().is_filter_active(id);

        if !activating_category {
            self.inner.on_filter_select(id);
            return;
        }

        self.inner.update(|state, _| {
            clear_categories(state, Some(id));
            state.activate_filter(id);
            true
        });
    }

    pub fn on_sort_select(&mut self, id: &str) {
        self.inner.on_sort_select(id);
    }

    /// Filter and sort by one category together. If it is already the sole
    /// active category both are switched off.
    pub fn apply_category_filter_and_sort(&mut self, category: &str) {
        let id = category_id(category);
        if self.inner.catalogue().filter(&id).is_none() {
            debug!("Ignoring unknown category `{}`", category);
            return;
        }
        let sortable = self.inner.catalogue().selectable_sort(&id).is_some();
        let max_sorts = self.inner.max_sorts();

        self.inner.update(|state, _| {
            let active_categories: Vec<&String> = state
                .active_filter_ids()
                .iter()
                .filter(|f| is_category_id(f))
                .collect();

            if active_categories.len() == 1 && *active_categories[0] == id {
                state.deactivate_filter(&id);
                state.deactivate_sort(&id);
                return true;
            }

            clear_categories(state, None);
            state.activate_filter(&id);
            if sortable {
                state.activate_sort(&id, max_sorts);
            }
            true
        });
    }

    /// Category currently filtered on, if any
    pub fn active_category(&self) -> Option<&str> {
        self.inner
            .active_filter_ids()
            .iter()
            .find_map(|id| category_of(id))
    }

    /// Replace the projects and rebuild the catalogue from them
    pub fn update_items(&mut self, projects: Vec<Project>) {
        self.stats = PortfolioStats::from_projects(&projects);
        self.inner.set_catalogue(build_catalogue(&projects));
        self.inner.update_items(projects);
    }

    pub fn stats(&self) -> &PortfolioStats {
        &self.stats
    }

    pub fn filter_options(&self) -> Vec<FilterOption<Project>> {
        self.inner.filter_options()
    }

    pub fn sort_options(&self) -> Vec<SortOption<Project>> {
        self.inner.sort_options()
    }

    pub fn active_filter_ids(&self) -> &[String] {
        self.inner.active_filter_ids()
    }

    pub fn active_sort_ids(&self) -> &[String] {
        self.inner.active_sort_ids()
    }

    pub fn version(&self) -> u64 {
        self.inner.version()
    }

    pub fn items(&self) -> &[Project] {
        self.inner.items()
    }

    pub fn all_items(&self) -> &[Project] {
        self.inner.all_items()
    }

    pub fn url_state(&self) -> UrlState {
        self.inner.url_state()
    }

    pub fn query_params(&self) -> QueryParams {
        self.inner.query_params()
    }

    pub fn flush_url(&self) {
        self.inner.flush_url();
    }

    pub fn controller(&self) -> &FilterSortController<Project> {
        &self.inner
    }
}

/// Reduce decoded URL state to at most one category: the first one the
/// catalogue knows. Sorts on any other category go with it.
fn single_category(url_state: &mut UrlState, catalogue: &Catalogue<Project>) {
    let keep = url_state
        .filters
        .iter()
        .find(|id| is_category_id(id) && catalogue.filter(id).is_some())
        .cloned();
    let Some(keep) = keep else {
        return;
    };

    let before = url_state.filters.len();
    url_state
        .filters
        .retain(|id| !is_category_id(id) || *id == keep);
    if url_state.filters.len() < before {
        debug!("Keeping only category `{}` from URL", keep);
    }

    if matches!(&url_state.sort, Some((sort, _)) if is_category_id(sort) && *sort != keep) {
        url_state.sort = None;
    }
}

/// Drop every category filter and sort except `keep`
fn clear_categories(state: &mut ControllerState, keep: Option<&str>) {
    let filters: Vec<String> = state
        .active_filter_ids()
        .iter()
        .filter(|id| is_category_id(id) && Some(id.as_str()) != keep)
        .cloned()
        .collect();
    for id in filters {
        state.deactivate_filter(&id);
    }

    let sorts: Vec<String> = state
        .active_sort_ids()
        .iter()
        .filter(|id| is_category_id(id) && Some(id.as_str()) != keep)
        .cloned()
        .collect();
    for id in sorts {
        state.deactivate_sort(&id);
    }
}
