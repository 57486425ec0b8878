//! Integration tests for the filter/sort controller and the project adapter

use chrono::{TimeZone, Utc};
use showcase_core::controller::{
    Catalogue, ControllerConfig, FilterOption, FilterSortController, QueryParams, RecordingSink,
    SortDirection, SortOption,
};
use showcase_core::portfolio::{Project, ProjectController};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn project(name: &str, stars: u32, forks: u32, pinned: bool, lang: &str) -> Project {
    Project {
        name: name.to_string(),
        full_name: format!("octo/{}", name),
        stars,
        forks,
        pinned,
        language: Some(lang.to_string()),
        created_at: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
        pushed_at: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(stars as i64)),
        ..Default::default()
    }
}

fn projects() -> Vec<Project> {
    vec![
        project("atlas", 120, 14, true, "Rust"),
        project("beacon", 8, 0, false, "Go"),
        project("cinder", 45, 3, true, "Rust"),
        project("drift", 45, 9, false, "Python"),
        project("ember", 0, 0, true, "TypeScript"),
    ]
}

fn names(items: &[Project]) -> Vec<String> {
    items.iter().map(|p| p.name.clone()).collect()
}

#[test]
fn test_seed_from_url() {
    let controller = ProjectController::builder(projects())
        .initial_query(QueryParams::parse("?filter=pinned&sort=mostStars&sortDir=asc"))
        .build();

    assert_eq!(controller.active_filter_ids(), ["pinned"]);
    assert_eq!(controller.active_sort_ids(), ["mostStars"]);
    assert_eq!(
        controller.controller().sort_direction("mostStars"),
        Some(SortDirection::Asc)
    );
    assert_eq!(names(controller.items()), vec!["ember", "cinder", "atlas"]);
    assert_eq!(controller.version(), 0);
}

#[test]
fn test_seed_ignores_unknown_ids() {
    let controller = ProjectController::builder(projects())
        .initial_query(QueryParams::parse("filter=pinned,bogus&sort=bogus&sortDir=sideways"))
        .build();

    assert_eq!(controller.active_filter_ids(), ["pinned"]);
    assert!(controller.active_sort_ids().is_empty());
}

#[test]
fn test_sort_tri_state_cycle() {
    let mut controller = ProjectController::new(projects());
    let direction = |c: &ProjectController| {
        c.sort_options()
            .into_iter()
            .find(|s| s.id == "mostStars")
            .map(|s| (s.active, s.direction))
    };

    assert_eq!(direction(&controller), Some((false, SortDirection::Desc)));
    controller.on_sort_select("mostStars");
    assert_eq!(direction(&controller), Some((true, SortDirection::Desc)));
    controller.on_sort_select("mostStars");
    assert_eq!(direction(&controller), Some((true, SortDirection::Asc)));
    controller.on_sort_select("mostStars");
    assert_eq!(direction(&controller), Some((false, SortDirection::Desc)));
    controller.on_sort_select("mostStars");
    assert_eq!(direction(&controller), Some((true, SortDirection::Desc)));
}

#[test]
fn test_max_sorts_evicts_oldest() {
    let mut controller = ProjectController::builder(projects())
        .config(ControllerConfig {
            max_sorts: 2,
            ..Default::default()
        })
        .build();

    controller.on_sort_select("mostStars");
    controller.on_sort_select("mostStars");
    controller.on_sort_select("mostForks");
    controller.on_sort_select("name");

    assert_eq!(controller.active_sort_ids(), ["name", "mostForks"]);

    // The evicted sort comes back at its default direction
    controller.on_sort_select("mostStars");
    assert_eq!(controller.active_sort_ids(), ["mostStars", "name"]);
    assert_eq!(
        controller.controller().sort_direction("mostStars"),
        Some(SortDirection::Desc)
    );
}

#[test]
fn test_filter_toggle_is_idempotent() {
    let emitted = Arc::new(Mutex::new(Vec::new()));
    let sink = emitted.clone();
    let mut controller = ProjectController::builder(projects())
        .listener(move |items| sink.lock().unwrap().push(names(items)))
        .build();
    let before = names(controller.items());

    controller.on_filter_select("pinned");
    controller.on_filter_select("pinned");

    assert_eq!(names(controller.items()), before);
    assert!(controller.active_filter_ids().is_empty());

    let emitted = emitted.lock().unwrap();
    assert_eq!(emitted.len(), 3);
    assert_eq!(emitted.last(), Some(&before));
}

#[test]
fn test_no_notification_when_filter_matches_everything() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let all_active: Vec<Project> = projects()
        .into_iter()
        .map(|mut p| {
            p.archived = false;
            p
        })
        .collect();
    let mut controller = ProjectController::builder(all_active)
        .listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    controller.on_filter_select("active");
    controller.on_filter_select("active");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(controller.version(), 2);
}

#[test]
fn test_multi_sort_tie_break() {
    let mut controller = ProjectController::new(projects());
    controller.on_sort_select("mostForks");
    controller.on_sort_select("mostStars");

    // cinder and drift tie on stars; forks decide
    assert_eq!(
        names(controller.items()),
        vec!["atlas", "drift", "cinder", "beacon", "ember"]
    );
}

#[test]
fn test_longest_active_sort() {
    let mut controller = ProjectController::new(projects());
    controller.on_sort_select("longestActive");
    assert_eq!(names(controller.items())[0], "atlas");
}

#[test]
fn test_panicking_predicate_is_contained() {
    let catalogue = Catalogue::new(
        vec![FilterOption::new("fragile", "Fragile", |n: &i32| {
            if *n == 3 {
                panic!("bad item");
            }
            n % 2 == 1
        })],
        vec![SortOption::new("value", "Value", SortDirection::Asc, |a: &i32, b: &i32| {
            if *a == 5 || *b == 5 {
                panic!("bad comparison");
            }
            a.cmp(b)
        })],
    );
    let mut controller = FilterSortController::builder(catalogue, |n: &i32| Some(n.to_string()))
        .items(vec![5, 1, 3, 7])
        .build();

    controller.on_filter_select("fragile");
    assert_eq!(controller.items(), &[5, 1, 7]);

    controller.on_sort_select("value");
    assert_eq!(controller.items().len(), 3);
    assert!(controller.items().contains(&5));
}

#[tokio::test]
async fn test_url_writes_are_coalesced() {
    let sink = Arc::new(RecordingSink::new());
    let mut controller = ProjectController::builder(projects())
        .config(ControllerConfig {
            url_write_delay: Duration::from_millis(20),
            ..Default::default()
        })
        .url_sink(sink.clone())
        .build();

    controller.on_filter_select("pinned");
    controller.on_sort_select("mostStars");
    controller.on_sort_select("mostStars");
    assert!(sink.writes().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;

    let writes = sink.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(
        writes[0].to_query_string(),
        "filter=pinned&sort=mostStars&sortDir=asc"
    );
}

#[test]
fn test_round_trip_through_url() {
    let mut controller = ProjectController::new(projects());
    controller.on_filter_select("original");
    controller.on_sort_select("name");
    controller.on_sort_select("name");

    let restored = ProjectController::builder(projects())
        .initial_query(controller.query_params())
        .build();

    assert_eq!(restored.active_filter_ids(), controller.active_filter_ids());
    assert_eq!(restored.active_sort_ids(), controller.active_sort_ids());
    assert_eq!(names(restored.items()), names(controller.items()));
}
