/*
 * src/models/session.rs
 *
 * File for Session Profile Store models (C8)
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::global::{NOVELTY_PREFERENCE_CEILING, SESSION_SIGNAL_LOG_CAP, VIBE_SIGNAL_WEIGHT};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
	Like,
	Unlike,
	Open,
	AddToRoute,
	Dwell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
	pub place_id: i64,
	pub action: SignalAction,
	pub dwell_ms: Option<u64>,
	pub step: Option<String>,
	pub ts: DateTime<Utc>,
}

const NOVELTY_TAGS: [&str; 4] = ["hidden_gem", "unique", "new", "different"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProfile {
	pub session_id: String,
	pub vibe_vector: HashMap<String, f64>,
	pub novelty_preference: f64,
	pub recent_areas: VecDeque<String>,
	pub signal_log: VecDeque<SignalEntry>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl SessionProfile {
	pub fn new(session_id: String) -> Self {
		let now = Utc::now();
		Self {
			session_id,
			vibe_vector: HashMap::new(),
			novelty_preference: 0.5,
			recent_areas: VecDeque::new(),
			signal_log: VecDeque::new(),
			created_at: now,
			updated_at: now,
		}
	}

	pub fn is_expired(&self, now: DateTime<Utc>, ttl_hours: i64) -> bool {
		(now - self.created_at).num_hours() > ttl_hours
	}

	/// §4.8: on like/add_to_route, bump the vibe vector for the venue's
	/// tags and re-normalize to L1 == 1. Nudges novelty preference toward
	/// the ceiling when any tag signals novelty-seeking.
	pub fn record_signal(&mut self, place_id: i64, action: SignalAction, tags: &[String], dwell_ms: Option<u64>, step: Option<String>) {
		let now = Utc::now();
		self.signal_log.push_back(SignalEntry {
			place_id,
			action,
			dwell_ms,
			step,
			ts: now,
		});
		while self.signal_log.len() > SESSION_SIGNAL_LOG_CAP {
			self.signal_log.pop_front();
		}

		if matches!(action, SignalAction::Like | SignalAction::AddToRoute) {
			for tag in tags {
				*self.vibe_vector.entry(tag.clone()).or_insert(0.0) += VIBE_SIGNAL_WEIGHT;
			}
			self.normalize_vibe_vector();

			if tags.iter().any(|t| NOVELTY_TAGS.contains(&t.as_str())) {
				let gap = NOVELTY_PREFERENCE_CEILING - self.novelty_preference;
				self.novelty_preference += gap * 0.5;
			}
		}

		self.updated_at = now;
	}

	fn normalize_vibe_vector(&mut self) {
		let total: f64 = self.vibe_vector.values().map(|v| v.abs()).sum();
		if total > 1.0 {
			for v in self.vibe_vector.values_mut() {
				*v /= total;
			}
		}
	}

	pub fn vibe_l1_norm(&self) -> f64 {
		self.vibe_vector.values().map(|v| v.abs()).sum()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vibe_vector_stays_within_l1_budget() {
		let mut profile = SessionProfile::new("s1".to_string());
		for _ in 0..50 {
			profile.record_signal(
				1,
				SignalAction::Like,
				&["chill".to_string(), "rooftop".to_string()],
				None,
				None,
			);
		}
		assert!(profile.vibe_l1_norm() <= 1.0 + 1e-6);
	}

	#[test]
	fn novelty_preference_rises_on_hidden_gem_signal() {
		let mut profile = SessionProfile::new("s1".to_string());
		let before = profile.novelty_preference;
		profile.record_signal(1, SignalAction::Like, &["hidden_gem".to_string()], None, None);
		assert!(profile.novelty_preference > before);
	}

	#[test]
	fn signal_log_bounded_to_cap() {
		let mut profile = SessionProfile::new("s1".to_string());
		for i in 0..(SESSION_SIGNAL_LOG_CAP + 20) {
			profile.record_signal(i as i64, SignalAction::Open, &[], None, None);
		}
		assert_eq!(profile.signal_log.len(), SESSION_SIGNAL_LOG_CAP);
	}
}
