//! URL query-parameter persistence of controller state

use crate::controller::options::SortDirection;
use serde::Serialize;
use url::form_urlencoded;

pub const FILTER_PARAM: &str = "filter";
pub const SORT_PARAM: &str = "sort";
pub const SORT_DIR_PARAM: &str = "sortDir";

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Replace all values of a parameter
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.push((name, value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| k != name);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.0 {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The durable part of controller state: active filters plus the top of
/// the sort recency stack with its resolved direction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrlState {
    pub filters: Vec<String>,
    pub sort: Option<(String, SortDirection)>,
}

/// Maps [`UrlState`] to and from query parameters
pub trait UrlCodec: Send + Sync {
    fn encode(&self, state: &UrlState) -> QueryParams;

    fn decode(&self, params: &QueryParams) -> UrlState;
}

/// `filter=a,b&sort=id&sortDir=asc`; sort and direction are omitted when
/// they equal the configured defaults
#[derive(Debug, Clone)]
pub struct GenericUrlCodec {
    default_sort_id: String,
    default_direction: SortDirection,
}

impl GenericUrlCodec {
    pub fn new(default_sort_id: impl Into<String>, default_direction: SortDirection) -> Self {
        Self {
            default_sort_id: default_sort_id.into(),
            default_direction,
        }
    }
}

impl Default for GenericUrlCodec {
    fn default() -> Self {
        Self::new("none", SortDirection::Desc)
    }
}

impl UrlCodec for GenericUrlCodec {
    fn encode(&self, state: &UrlState) -> QueryParams {
        let mut params = QueryParams::new();

        if !state.filters.is_empty() {
            params.set(FILTER_PARAM, state.filters.join(","));
        }

        if let Some((id, direction)) = &state.sort {
            if *id != self.default_sort_id {
                params.set(SORT_PARAM, id.as_str());
            }
            if *direction != self.default_direction {
                params.set(SORT_DIR_PARAM, direction.as_str());
            }
        }

        params
    }

    fn decode(&self, params: &QueryParams) -> UrlState {
        let mut filters: Vec<String> = Vec::new();
        for id in params
            .get(FILTER_PARAM)
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            if !filters.iter().any(|f| f == id) {
                filters.push(id.to_string());
            }
        }

        let direction = params
            .get(SORT_DIR_PARAM)
            .and_then(|d| d.parse().ok())
            .unwrap_or(self.default_direction);

        let sort = params
            .get(SORT_PARAM)
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != self.default_sort_id)
            .map(|id| (id.to_string(), direction));

        UrlState { filters, sort }
    }
}
