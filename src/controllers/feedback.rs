/*
 * src/controllers/feedback.rs
 *
 * File for the Session Feedback Controller API Endpoints
 *
 * Purpose:
 *   Record implicit session signals (like/unlike/open/add_to_route/dwell)
 *   and expose the resulting session profile for debugging (§4.8). The
 *   vibe vector is updated from the venue's own tags (C2), looked up by
 *   place_id, never from client-supplied tags.
 *
 * Include:
 *   api_feedback       - POST /api/feedback                      -> record a signal
 *   api_session_profile - GET /api/feedback/profile/{session_id} -> current profile snapshot
 */

use std::sync::Arc;

use axum::{Extension, Json, extract::Path, routing::{get, post}};
use sqlx::PgPool;
use utoipa::OpenApi;

use crate::controllers::AxumRouter;
use crate::error::{ApiResult, PublicError};
use crate::http_models::feedback::{FeedbackRequest, FeedbackResponse, SessionProfileResponse};
use crate::session_store::SessionStore;

#[derive(OpenApi)]
#[openapi(
	paths(api_feedback, api_session_profile),
	info(title = "Feedback Routes", description = "Implicit session signal capture."),
	tags((name = "Feedback"))
)]
pub struct FeedbackApiDoc;

/// Records an implicit session signal against the session's vibe vector
/// and novelty preference. Tags come from the venue's own record, not
/// the request body, so a caller can't inflate their vibe vector with
/// tags unrelated to the venue they signaled against.
///
/// # Method
/// `POST /api/feedback`
#[utoipa::path(
	post,
	path = "",
	request_body = FeedbackRequest,
	responses((status = 200, body = FeedbackResponse)),
	tag = "Feedback"
)]
pub async fn api_feedback(
	Extension(sessions): Extension<Arc<SessionStore>>,
	Extension(pool): Extension<PgPool>,
	Json(payload): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
	let tags_raw: Option<String> = sqlx::query_scalar("SELECT tags FROM venues WHERE id = $1")
		.bind(payload.place_id)
		.fetch_optional(&pool)
		.await?
		.flatten();
	let tags: Vec<String> = tags_raw
		.map(|t| t.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
		.unwrap_or_default();

	sessions.add_signal(&payload.session_id, payload.place_id, payload.action, &tags, payload.dwell_ms, payload.step);
	Ok(Json(FeedbackResponse { accepted: true }))
}

/// Returns the current session profile snapshot, or 404 if the session
/// has never recorded a signal or has expired.
///
/// # Method
/// `GET /api/feedback/profile/{session_id}`
#[utoipa::path(
	get,
	path = "/profile/{session_id}",
	responses((status = 200, body = SessionProfileResponse), (status = 404, description = "session not found or expired")),
	tag = "Feedback"
)]
pub async fn api_session_profile(Extension(sessions): Extension<Arc<SessionStore>>, Path(session_id): Path<String>) -> ApiResult<Json<SessionProfileResponse>> {
	let profile = sessions
		.get(&session_id)
		.ok_or_else(|| PublicError::NotFound(format!("session {session_id}")))?;
	Ok(Json(SessionProfileResponse::from(profile)))
}

pub fn feedback_routes() -> AxumRouter {
	AxumRouter::new()
		.route("/", post(api_feedback))
		.route("/profile/{session_id}", get(api_session_profile))
}
