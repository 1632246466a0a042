/*
 * src/http_models/feedback.rs
 *
 * File for session feedback HTTP DTOs (POST /api/feedback,
 * GET /api/feedback/profile/{session_id}, C8)
 */

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::session::{SessionProfile, SignalAction};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackRequest {
	pub session_id: String,
	pub place_id: i64,
	pub action: SignalAction,
	pub dwell_ms: Option<u64>,
	pub step: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FeedbackResponse {
	pub accepted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionProfileResponse {
	pub session_id: String,
	pub vibe_vector: std::collections::HashMap<String, f64>,
	pub novelty_preference: f64,
	pub signal_count: usize,
}

impl From<SessionProfile> for SessionProfileResponse {
	fn from(profile: SessionProfile) -> Self {
		Self {
			session_id: profile.session_id,
			vibe_vector: profile.vibe_vector,
			novelty_preference: profile.novelty_preference,
			signal_count: profile.signal_log.len(),
		}
	}
}
