use super::project::Project;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate figures for one language
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageStat {
    pub name: String,

    /// Number of projects using the language at all
    pub count: usize,

    /// Sum of per-project weights
    pub weight: f64,
}

/// Aggregates over the full project collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioStats {
    pub total_projects: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub pinned: usize,
    pub languages: Vec<LanguageStat>,
}

impl PortfolioStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        let mut by_language: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        for project in projects {
            for (lang, weight) in project.category_weights() {
                let entry = by_language.entry(lang).or_default();
                entry.0 += 1;
                entry.1 += weight;
            }
        }

        let mut languages: Vec<LanguageStat> = by_language
            .into_iter()
            .map(|(name, (count, weight))| LanguageStat { name, count, weight })
            .collect();
        languages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Self {
            total_projects: projects.len(),
            total_stars: projects.iter().map(|p| p.stars as u64).sum(),
            total_forks: projects.iter().map(|p| p.forks as u64).sum(),
            pinned: projects.iter().filter(|p| p.pinned).count(),
            languages,
        }
    }

    /// Languages used by at least `min_count` projects, most common first
    pub fn categories(&self, min_count: usize) -> Vec<String> {
        self.languages
            .iter()
            .filter(|stat| stat.count >= min_count)
            .map(|stat| stat.name.clone())
            .collect()
    }

    pub fn language(&self, name: &str) -> Option<&LanguageStat> {
        self.languages.iter().find(|stat| stat.name == name)
    }
}
