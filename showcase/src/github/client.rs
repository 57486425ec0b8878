use super::transform::to_project;
use super::types::{GithubRepo, GithubUser, GraphqlResponse, PinnedData};
use showcase_core::cache::{HttpClient, RequestOptions, ResponseCache};
use showcase_core::error::{Result, ShowcaseError};
use showcase_core::portfolio::Project;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Language breakdowns are never cached for less than this
pub const LANGUAGES_MIN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Concurrent language lookups per client
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;

const PINNED_QUERY: &str = "query($login: String!) { user(login: $login) { pinnedItems(first: 6, types: REPOSITORY) { nodes { ... on Repository { nameWithOwner } } } } }";

/// GitHub API access through the response cache
#[derive(Clone)]
pub struct GithubClient {
    cache: ResponseCache,
    http: Arc<dyn HttpClient>,
    api_url: String,
    token: Option<String>,
    /// Shared by every copy made with `with_token`
    fetch_permits: Arc<Semaphore>,
}

impl GithubClient {
    pub fn new(cache: ResponseCache, http: Arc<dyn HttpClient>, api_url: impl Into<String>) -> Self {
        Self {
            cache,
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
            fetch_permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENCY)),
        }
    }

    /// Limit concurrent language lookups to `limit` (at least one)
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.fetch_permits = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// Copy of this client that authenticates with `token`
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            ..self.clone()
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn options(&self, base: RequestOptions) -> RequestOptions {
        let options = base.header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => options.bearer(token),
            None => options,
        }
    }

    pub async fn user(&self, login: &str) -> Result<GithubUser> {
        let url = format!("{}/users/{}", self.api_url, login);
        self.cache
            .cached_fetch(
                self.http.as_ref(),
                &url,
                &self.options(RequestOptions::get()),
                self.cache.default_ttl(),
            )
            .await
    }

    /// All public repositories of `login`, following pagination
    pub async fn repositories(&self, login: &str) -> Result<Vec<GithubRepo>> {
        let mut repos = Vec::new();
        for page in 1..=MAX_PAGES {
            let url = format!(
                "{}/users/{}/repos?per_page={}&page={}&sort=pushed",
                self.api_url, login, PER_PAGE, page
            );
            let batch: Vec<GithubRepo> = self
                .cache
                .cached_fetch(
                    self.http.as_ref(),
                    &url,
                    &self.options(RequestOptions::get()),
                    self.cache.default_ttl(),
                )
                .await?;
            let last = batch.len() < PER_PAGE;
            repos.extend(batch);
            if last {
                break;
            }
        }
        debug!("Fetched {} repositories for {}", repos.len(), login);
        Ok(repos)
    }

    /// Bytes of code per language for `owner/name`
    pub async fn languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>> {
        let url = format!("{}/repos/{}/languages", self.api_url, full_name);
        let ttl = self.cache.default_ttl().max(LANGUAGES_MIN_TTL);
        self.cache
            .cached_fetch(self.http.as_ref(), &url, &self.options(RequestOptions::get()), ttl)
            .await
    }

    /// Lowercased full names of the repositories pinned on the profile
    pub async fn pinned(&self, login: &str) -> Result<Vec<String>> {
        let url = format!("{}/graphql", self.api_url);
        let body = serde_json::json!({
            "query": PINNED_QUERY,
            "variables": { "login": login },
        })
        .to_string();

        let response: GraphqlResponse<PinnedData> = self
            .cache
            .cached_fetch(
                self.http.as_ref(),
                &url,
                &self.options(RequestOptions::post_json(body)),
                self.cache.default_ttl(),
            )
            .await?;

        match response.data {
            Some(data) => Ok(data.names()),
            None => {
                let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
                Err(ShowcaseError::Other(format!("GraphQL error: {}", messages.join("; "))))
            }
        }
    }

    /// Repositories of `login` as projects. Language and pinned lookups
    /// degrade to empty data when they fail.
    pub async fn load_projects(&self, login: &str) -> Result<Vec<Project>> {
        let repos = self.repositories(login).await?;

        let pinned: HashSet<String> = if self.has_token() {
            match self.pinned(login).await {
                Ok(names) => names.into_iter().collect(),
                Err(e) => {
                    warn!("Failed to load pinned repositories for {}: {}", login, e);
                    HashSet::new()
                }
            }
        } else {
            debug!("No token; skipping pinned repositories");
            HashSet::new()
        };

        let mut tasks = JoinSet::new();
        for (index, repo) in repos.iter().enumerate() {
            let client = self.clone();
            let permits = Arc::clone(&self.fetch_permits);
            let full_name = repo.full_name.clone();
            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        warn!("Language lookup for {} not started: {}", full_name, e);
                        return (index, BTreeMap::new());
                    }
                };
                let languages = match client.languages(&full_name).await {
                    Ok(languages) => languages,
                    Err(e) => {
                        warn!("Failed to load languages for {}: {}", full_name, e);
                        BTreeMap::new()
                    }
                };
                (index, languages)
            });
        }

        let mut languages = vec![BTreeMap::new(); repos.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, langs)) => languages[index] = langs,
                Err(e) => warn!("Language lookup task failed: {}", e),
            }
        }

        let projects: Vec<Project> = repos
            .into_iter()
            .zip(languages)
            .map(|(repo, langs)| to_project(repo, langs, &pinned))
            .collect();

        info!("Loaded {} projects for {}", projects.len(), login);
        Ok(projects)
    }
}
