//! Filter and sort catalogue entries

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// Filter predicate over an item
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Ascending comparator over two items
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Orient an ascending comparison
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// Run a user closure, turning a panic into `None`
fn guarded<R>(kind: &str, id: &str, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} `{}` panicked; treating result as neutral", kind, id);
            None
        }
    }
}

/// A selectable filter
#[derive(Clone)]
pub struct FilterOption<T> {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    pub predicate: Predicate<T>,
    /// Derived from controller state when the catalogue is read
    pub active: bool,
}

impl<T> FilterOption<T> {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            predicate: Arc::new(predicate),
            active: false,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Evaluate the predicate; a panicking predicate does not match
    pub fn matches(&self, item: &T) -> bool {
        guarded("filter", &self.id, || (self.predicate)(item)).unwrap_or(false)
    }
}

impl<T> fmt::Debug for FilterOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterOption")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("active", &self.active)
            .finish()
    }
}

/// A selectable sort
#[derive(Clone)]
pub struct SortOption<T> {
    pub id: String,
    pub label: String,
    pub icon: Option<String>,
    /// Default direction in the catalogue, resolved direction when read
    /// through the controller
    pub direction: SortDirection,
    pub disabled: bool,
    pub active: bool,
    pub comparator: Comparator<T>,
}

impl<T> SortOption<T> {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        direction: SortDirection,
        comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: None,
            direction,
            disabled: false,
            active: false,
            comparator: Arc::new(comparator),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Compare in the given direction; a panicking comparator means "equal"
    pub fn compare(&self, a: &T, b: &T, direction: SortDirection) -> Ordering {
        guarded("comparator", &self.id, || (self.comparator)(a, b))
            .map(|ordering| direction.apply(ordering))
            .unwrap_or(Ordering::Equal)
    }
}

impl<T> fmt::Debug for SortOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortOption")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("direction", &self.direction)
            .field("disabled", &self.disabled)
            .field("active", &self.active)
            .finish()
    }
}

/// Full set of filters and sorts a controller can offer
#[derive(Clone)]
pub struct Catalogue<T> {
    pub filters: Vec<FilterOption<T>>,
    pub sorts: Vec<SortOption<T>>,
}

impl<T> Default for Catalogue<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
        }
    }
}

impl<T> Catalogue<T> {
    pub fn new(filters: Vec<FilterOption<T>>, sorts: Vec<SortOption<T>>) -> Self {
        Self { filters, sorts }
    }

    pub fn filter(&self, id: &str) -> Option<&FilterOption<T>> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn sort(&self, id: &str) -> Option<&SortOption<T>> {
        self.sorts.iter().find(|s| s.id == id)
    }

    /// Sort that exists and can be activated
    pub fn selectable_sort(&self, id: &str) -> Option<&SortOption<T>> {
        self.sort(id).filter(|s| !s.disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parse_and_flip() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!(" DESC ".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("up".parse::<SortDirection>().is_err());
        assert_eq!(SortDirection::Desc.flipped(), SortDirection::Asc);
        assert_eq!(SortDirection::Desc.apply(Ordering::Less), Ordering::Greater);
    }

    #[test]
    fn test_panicking_predicate_does_not_match() {
        let filter = FilterOption::new("odd", "Odd", |n: &i32| {
            if *n == 3 {
                panic!("bad item");
            }
            n % 2 == 1
        });

        assert!(filter.matches(&1));
        assert!(!filter.matches(&2));
        assert!(!filter.matches(&3));
    }

    #[test]
    fn test_panicking_comparator_is_equal() {
        let sort = SortOption::new("value", "Value", SortDirection::Asc, |a: &i32, b: &i32| {
            if *a == 0 || *b == 0 {
                panic!("zero");
            }
            a.cmp(b)
        });

        assert_eq!(sort.compare(&1, &2, SortDirection::Asc), Ordering::Less);
        assert_eq!(sort.compare(&1, &2, SortDirection::Desc), Ordering::Greater);
        assert_eq!(sort.compare(&0, &2, SortDirection::Asc), Ordering::Equal);
    }

    #[test]
    fn test_catalogue_lookup() {
        let catalogue = Catalogue::new(
            vec![FilterOption::new("even", "Even", |n: &i32| n % 2 == 0)],
            vec![
                SortOption::new("value", "Value", SortDirection::Desc, |a: &i32, b: &i32| a.cmp(b)),
                SortOption::new("off", "Off", SortDirection::Desc, |a: &i32, b: &i32| a.cmp(b))
                    .disabled(true),
            ],
        );

        assert!(catalogue.filter("even").is_some());
        assert!(catalogue.filter("odd").is_none());
        assert!(catalogue.selectable_sort("value").is_some());
        assert!(catalogue.sort("off").is_some());
        assert!(catalogue.selectable_sort("off").is_none());
    }
}
