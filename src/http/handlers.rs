//! Route handlers for the two-phase collection flow.
//!
//! | Route      | Method | Result                                   |
//! |------------|--------|------------------------------------------|
//! | `/healthz` | any    | `200 ok`                                 |
//! | `/collect` | POST   | enriched page (browser data merged in)   |
//! | `/collect` | other  | `405`, `Allow: POST`                     |
//! | anything   | any    | first-phase page with collector script   |
//!
//! The phase is decided by the route alone. There is no session store.

use axum::extract::{Request, State};
use axum::http::Method;
use axum::response::{Html, IntoResponse, Response};

use super::server::AppState;
use crate::error::ReflectError;
use crate::reflection::{ClientData, RequestSnapshot};
use crate::render::RenderModel;

pub async fn health() -> &'static str {
    "ok"
}

/// First phase: reflect the request and embed the collector script.
pub async fn reflect(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ReflectError> {
    let snapshot = RequestSnapshot::capture(request, state.capture.body_limit).await?;
    render_page(&state, snapshot)
}

/// Second phase: reflect this request and merge the posted browser data.
pub async fn collect(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ReflectError> {
    if request.method() != Method::POST {
        return Err(ReflectError::MethodNotAllowed);
    }

    let snapshot = RequestSnapshot::capture(request, state.capture.collect_limit()).await?;
    let client_data = ClientData::parse(snapshot.body_preview.as_bytes())?;

    tracing::debug!(
        supplied = client_data.is_supplied(),
        bytes = snapshot.body_captured,
        "Client payload received"
    );

    render_page(&state, snapshot.with_client_data(client_data))
}

fn render_page(state: &AppState, snapshot: RequestSnapshot) -> Result<Response, ReflectError> {
    let model = RenderModel::new(snapshot);
    let html = state.renderer.render(&model)?;
    Ok(Html(html).into_response())
}
