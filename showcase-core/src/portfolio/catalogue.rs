//! Filter and sort catalogue derived from the current projects.

use super::project::Project;
use super::stats::PortfolioStats;
use crate::controller::{Catalogue, FilterOption, SortDirection, SortOption};
use std::cmp::Ordering;

pub const FILTER_PINNED: &str = "pinned";
pub const FILTER_HAS_DEMO: &str = "hasDemo";
pub const FILTER_ORIGINAL: &str = "original";
pub const FILTER_ACTIVE: &str = "active";

pub const SORT_MOST_STARS: &str = "mostStars";
pub const SORT_MOST_FORKS: &str = "mostForks";
pub const SORT_RECENTLY_UPDATED: &str = "recentlyUpdated";
pub const SORT_NAME: &str = "name";
pub const SORT_LONGEST_ACTIVE: &str = "longestActive";

/// Prefix shared by the per-language filter and sort ids
pub const CATEGORY_PREFIX: &str = "category:";

/// Id of the filter and sort pair for `category`
pub fn category_id(category: &str) -> String {
    format!("{}{}", CATEGORY_PREFIX, category)
}

/// Category name of a category filter or sort id
pub fn category_of(id: &str) -> Option<&str> {
    id.strip_prefix(CATEGORY_PREFIX).filter(|name| !name.is_empty())
}

pub fn is_category_id(id: &str) -> bool {
    category_of(id).is_some()
}

/// Build the catalogue for `projects`. Numeric sorts are disabled when no
/// project has a non-zero value for them.
pub fn build_catalogue(projects: &[Project]) -> Catalogue<Project> {
    let stats = PortfolioStats::from_projects(projects);
    let categories = stats.categories(1);

    let mut filters = vec![
        FilterOption::new(FILTER_PINNED, "Pinned", |p: &Project| p.pinned).with_icon("pin"),
        FilterOption::new(FILTER_HAS_DEMO, "Live demo", Project::has_demo).with_icon("globe"),
        FilterOption::new(FILTER_ORIGINAL, "Original", |p: &Project| !p.fork).with_icon("code"),
        FilterOption::new(FILTER_ACTIVE, "Active", |p: &Project| !p.archived).with_icon("pulse"),
    ];
    filters.extend(categories.iter().map(|category| {
        let name = category.clone();
        FilterOption::new(category_id(category), category.clone(), move |p: &Project| {
            p.category_weight(&name) > 0.0
        })
    }));

    let no_stars = projects.iter().all(|p| p.stars == 0);
    let no_forks = projects.iter().all(|p| p.forks == 0);

    let mut sorts = vec![
        SortOption::new(SORT_MOST_STARS, "Most stars", SortDirection::Desc, |a: &Project, b: &Project| {
            a.stars.cmp(&b.stars)
        })
        .with_icon("star")
        .disabled(no_stars),
        SortOption::new(SORT_MOST_FORKS, "Most forks", SortDirection::Desc, |a: &Project, b: &Project| {
            a.forks.cmp(&b.forks)
        })
        .with_icon("fork")
        .disabled(no_forks),
        SortOption::new(
            SORT_RECENTLY_UPDATED,
            "Recently updated",
            SortDirection::Desc,
            |a: &Project, b: &Project| a.last_activity().cmp(&b.last_activity()),
        )
        .with_icon("clock"),
        SortOption::new(SORT_NAME, "Name", SortDirection::Asc, |a: &Project, b: &Project| {
            a.name.to_lowercase().cmp(&b.name.to_lowercase())
        })
        .with_icon("text"),
        SortOption::new(
            SORT_LONGEST_ACTIVE,
            "Longest active",
            SortDirection::Desc,
            |a: &Project, b: &Project| a.active_duration().cmp(&b.active_duration()),
        )
        .with_icon("calendar"),
    ];
    sorts.extend(categories.iter().map(|category| {
        let name = category.clone();
        SortOption::new(
            category_id(category),
            category.clone(),
            SortDirection::Desc,
            move |a: &Project, b: &Project| {
                a.category_weight(&name)
                    .partial_cmp(&b.category_weight(&name))
                    .unwrap_or(Ordering::Equal)
            },
        )
    }));

    Catalogue::new(filters, sorts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, stars: u32, lang: &str) -> Project {
        Project {
            name: name.to_string(),
            full_name: format!("octo/{}", name),
            stars,
            language: Some(lang.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_category_ids() {
        assert_eq!(category_id("Rust"), "category:Rust");
        assert_eq!(category_of("category:Rust"), Some("Rust"));
        assert_eq!(category_of("category:"), None);
        assert_eq!(category_of("mostStars"), None);
    }

    #[test]
    fn test_catalogue_has_one_pair_per_language() {
        let catalogue = build_catalogue(&[project("a", 1, "Rust"), project("b", 0, "Go")]);

        assert!(catalogue.filter("category:Rust").is_some());
        assert!(catalogue.filter("category:Go").is_some());
        assert!(catalogue.sort("category:Go").is_some());
        assert!(catalogue.filter("category:Python").is_none());
        assert_eq!(catalogue.filters.len(), 6);
    }

    #[test]
    fn test_all_zero_numeric_sorts_are_disabled() {
        let catalogue = build_catalogue(&[project("a", 2, "Rust"), project("b", 0, "Rust")]);

        assert!(catalogue.selectable_sort(SORT_MOST_STARS).is_some());
        assert!(catalogue.sort(SORT_MOST_FORKS).unwrap().disabled);
        assert!(catalogue.selectable_sort(SORT_MOST_FORKS).is_none());
    }

    #[test]
    fn test_category_sort_orders_by_weight() {
        let mut mixed = project("mixed", 0, "Rust");
        mixed.languages.insert("Rust".to_string(), 30);
        mixed.languages.insert("Go".to_string(), 70);
        let pure = project("pure", 0, "Go");

        let catalogue = build_catalogue(&[mixed.clone(), pure.clone()]);
        let sort = catalogue.sort("category:Go").unwrap();

        assert_eq!(sort.compare(&pure, &mixed, SortDirection::Desc), Ordering::Less);
        assert!(catalogue.filter("category:Rust").unwrap().matches(&mixed));
        assert!(!catalogue.filter("category:Rust").unwrap().matches(&pure));
    }
}
