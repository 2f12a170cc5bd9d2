// handlers/public/github.rs - GET /api/github/repos

use axum::extract::State;

use crate::error::ApiError;
use crate::external::RepoSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn github_repos(State(state): State<AppState>) -> ApiResult<Vec<RepoSummary>> {
    let github = state
        .github
        .as_ref()
        .ok_or_else(|| ApiError::not_found("GitHub integration is not configured"))?;

    let repos = github
        .repos()
        .await
        .map_err(|e| ApiError::upstream("github repository fetch failed", &e, "Error fetching repositories"))?;
    Ok(ApiResponse::success(repos))
}
