use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A repository shown in the portfolio
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub homepage: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub watchers: u32,
    pub open_issues: u32,

    /// Primary language as reported by the host
    pub language: Option<String>,

    /// Bytes of source per language
    pub languages: BTreeMap<String, u64>,
    pub topics: Vec<String>,
    pub pinned: bool,
    pub fork: bool,
    pub archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Stable identity key: the lowercased full name
    pub fn identity(&self) -> Option<String> {
        let key = self.full_name.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_lowercase())
        }
    }

    pub fn has_demo(&self) -> bool {
        self.homepage
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }

    /// Time between creation and the last push
    pub fn active_duration(&self) -> Option<Duration> {
        match (self.created_at, self.pushed_at) {
            (Some(created), Some(pushed)) if pushed >= created => Some(pushed - created),
            (Some(_), Some(_)) => Some(Duration::zero()),
            _ => None,
        }
    }

    /// Most recent activity timestamp
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.pushed_at.max(self.updated_at)
    }

    /// Share of the code base per language, summing to 1.0.
    ///
    /// Without byte counts the primary language gets the full weight.
    pub fn category_weights(&self) -> BTreeMap<String, f64> {
        let total: u64 = self.languages.values().sum();
        if total == 0 {
            return self
                .language
                .iter()
                .filter(|lang| !lang.is_empty())
                .map(|lang| (lang.clone(), 1.0))
                .collect();
        }

        self.languages
            .iter()
            .filter(|(_, bytes)| **bytes > 0)
            .map(|(lang, bytes)| (lang.clone(), *bytes as f64 / total as f64))
            .collect()
    }

    pub fn category_weight(&self, category: &str) -> f64 {
        self.category_weights().get(category).copied().unwrap_or(0.0)
    }
}
