use super::types::GithubRepo;
use showcase_core::portfolio::Project;
use std::collections::{BTreeMap, HashSet};

/// Build a [`Project`] from a repository, its language breakdown and the
/// set of pinned (lowercased) full names
pub fn to_project(
    repo: GithubRepo,
    languages: BTreeMap<String, u64>,
    pinned: &HashSet<String>,
) -> Project {
    let pinned = pinned.contains(&repo.full_name.to_lowercase());
    let homepage = repo.homepage.filter(|url| !url.trim().is_empty());

    Project {
        id: repo.id,
        name: repo.name,
        full_name: repo.full_name,
        description: repo.description,
        html_url: repo.html_url,
        homepage,
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        watchers: repo.watchers_count,
        open_issues: repo.open_issues_count,
        language: repo.language,
        languages,
        topics: repo.topics,
        pinned,
        fork: repo.fork,
        archived: repo.archived,
        created_at: repo.created_at,
        pushed_at: repo.pushed_at,
        updated_at: repo.updated_at,
    }
}
