//! API routes for the showcase server

use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use showcase_core::controller::{ControllerConfig, QueryParams, SortDirection};
use showcase_core::layout::{solve, LayoutConstraints, LayoutResult};
use showcase_core::portfolio::{PortfolioStats, Project, ProjectController};
use std::sync::Arc;

use super::error::ApiError;
use super::middleware::ForwardedToken;
use crate::github::GithubClient;

/// Application state
pub struct AppState {
    pub github: GithubClient,
    pub default_user: Option<String>,
    pub controller: ControllerConfig,
    pub layout: LayoutConstraints,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// One filter or sort entry as shown to the client
#[derive(Debug, Serialize)]
pub struct OptionView {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

/// Project listing response
#[derive(Serialize)]
pub struct ProjectsResponse {
    pub user: String,
    pub projects: Vec<Project>,
    pub total: usize,
    pub filters: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
    /// Canonical query string for the applied state
    pub query: String,
    pub stats: PortfolioStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutResult>,
}

/// Largest item count accepted by the layout endpoint
pub const MAX_LAYOUT_ITEMS: usize = 1000;

/// Layout query parameters
#[derive(Deserialize)]
pub struct LayoutQuery {
    pub width: f64,
    pub count: Option<usize>,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Projects filtered and sorted by the state encoded in the query string
pub async fn projects(
    State(app_state): State<Arc<AppState>>,
    Extension(ForwardedToken(token)): Extension<ForwardedToken>,
    RawQuery(query): RawQuery,
) -> Result<Json<ProjectsResponse>, ApiError> {
    let params = QueryParams::parse(query.as_deref().unwrap_or_default());

    let user = params
        .get("user")
        .map(str::to_string)
        .or_else(|| app_state.default_user.clone())
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingUser)?;

    let width = params
        .get("width")
        .map(|w| {
            w.parse::<f64>().map_err(|e| ApiError::InvalidParam {
                name: "width",
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let github = match token {
        Some(token) => app_state.github.with_token(Some(token)),
        None => app_state.github.clone(),
    };
    let projects = github.load_projects(&user).await?;

    let controller = ProjectController::builder(projects)
        .config(app_state.controller.clone())
        .initial_query(params)
        .build();

    let layout = width.map(|width| {
        solve(&LayoutConstraints {
            total_width: width,
            item_count_upper_bound: controller.items().len().max(1),
            ..app_state.layout
        })
    });

    let filters = controller
        .filter_options()
        .into_iter()
        .map(|f| OptionView {
            id: f.id,
            label: f.label,
            icon: f.icon,
            active: f.active,
            direction: None,
        })
        .collect();
    let sorts = controller
        .sort_options()
        .into_iter()
        .map(|s| OptionView {
            id: s.id,
            label: s.label,
            icon: s.icon,
            active: s.active,
            direction: Some(s.direction),
        })
        .collect();

    Ok(Json(ProjectsResponse {
        user,
        total: controller.items().len(),
        projects: controller.items().to_vec(),
        filters,
        sorts,
        query: controller.query_params().to_query_string(),
        stats: controller.stats().clone(),
        layout,
    }))
}

/// Layout for a container width
pub async fn layout(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<LayoutQuery>,
) -> Result<Json<LayoutResult>, ApiError> {
    let count = params.count.unwrap_or(app_state.layout.item_count_upper_bound);
    if count > MAX_LAYOUT_ITEMS {
        return Err(ApiError::InvalidParam {
            name: "count",
            reason: format!("must be at most {}", MAX_LAYOUT_ITEMS),
        });
    }

    let constraints = LayoutConstraints {
        total_width: params.width,
        item_count_upper_bound: count,
        ..app_state.layout
    };
    Ok(Json(solve(&constraints)))
}

/// Drop every cached response
pub async fn clear_cache(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.github.cache().clear().await;
    StatusCode::NO_CONTENT
}
