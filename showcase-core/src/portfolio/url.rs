use super::catalogue::{category_id, category_of};
use crate::controller::{GenericUrlCodec, QueryParams, SortDirection, UrlCodec, UrlState};

pub const CATEGORY_PARAM: &str = "category";

/// Generic encoding plus a `category=<name>` shorthand for the state where
/// exactly one category filter and its matching sort are active.
#[derive(Debug, Clone, Default)]
pub struct CategoryUrlCodec {
    generic: GenericUrlCodec,
}

impl CategoryUrlCodec {
    pub fn new(generic: GenericUrlCodec) -> Self {
        Self { generic }
    }

    fn shorthand(state: &UrlState) -> Option<&str> {
        let [filter] = state.filters.as_slice() else {
            return None;
        };
        let category = category_of(filter)?;
        match &state.sort {
            Some((sort, SortDirection::Desc)) if sort == filter => Some(category),
            _ => None,
        }
    }
}

impl UrlCodec for CategoryUrlCodec {
    fn encode(&self, state: &UrlState) -> QueryParams {
        match Self::shorthand(state) {
            Some(category) => {
                let mut params = QueryParams::new();
                params.set(CATEGORY_PARAM, category);
                params
            }
            None => self.generic.encode(state),
        }
    }

    fn decode(&self, params: &QueryParams) -> UrlState {
        match params.get(CATEGORY_PARAM).map(str::trim) {
            Some(category) if !category.is_empty() => {
                let id = category_id(category);
                UrlState {
                    filters: vec![id.clone()],
                    sort: Some((id, SortDirection::Desc)),
                }
            }
            _ => self.generic.decode(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_state(name: &str) -> UrlState {
        UrlState {
            filters: vec![category_id(name)],
            sort: Some((category_id(name), SortDirection::Desc)),
        }
    }

    #[test]
    fn test_category_pair_collapses() {
        let codec = CategoryUrlCodec::default();
        let params = codec.encode(&category_state("Rust"));
        assert_eq!(params.to_query_string(), "category=Rust");
        assert_eq!(codec.decode(&params), category_state("Rust"));
    }

    #[test]
    fn test_other_states_use_generic_encoding() {
        let codec = CategoryUrlCodec::default();

        let mut state = category_state("Rust");
        state.filters.push("pinned".to_string());
        assert_eq!(
            codec.encode(&state).to_query_string(),
            "filter=category%3ARust%2Cpinned&sort=category%3ARust"
        );

        let mut ascending = category_state("Rust");
        ascending.sort = Some((category_id("Rust"), SortDirection::Asc));
        assert!(codec.encode(&ascending).get(CATEGORY_PARAM).is_none());
    }

    #[test]
    fn test_category_param_wins_on_decode() {
        let codec = CategoryUrlCodec::default();
        let params = QueryParams::parse("?filter=pinned&sort=mostStars&category=Go");
        assert_eq!(codec.decode(&params), category_state("Go"));

        let blank = QueryParams::parse("filter=pinned&category=");
        assert_eq!(codec.decode(&blank).filters, vec!["pinned"]);
    }
}
