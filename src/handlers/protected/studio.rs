// handlers/protected/studio.rs - GET /studio[/*]
//
// Serves the shell that boots the CMS studio. The access gate has already
// established an admin session and attached it as `StudioUser`.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Extension,
};
use tracing::{error, info};

use crate::middleware::access_gate::is_protected;
use crate::middleware::StudioUser;
use crate::render::page;
use crate::state::AppState;

pub async fn studio(State(state): State<AppState>, user: Option<Extension<StudioUser>>, uri: Uri) -> Response {
    let Some(Extension(StudioUser(claims))) = user else {
        // Only reachable when a studio route escapes the gate's prefixes.
        error!(path = %uri.path(), "studio route served without a gate decision");
        return StatusCode::FORBIDDEN.into_response();
    };

    let security = &state.config.security;
    let base_path = security
        .protected_prefixes
        .iter()
        .find(|prefix| is_protected(uri.path(), std::slice::from_ref(*prefix)))
        .map(String::as_str)
        .unwrap_or("/studio");

    info!(user = %claims.display_name(), path = %uri.path(), "studio opened");
    Html(page::studio(&state.config.cms, base_path, claims.display_name())).into_response()
}
