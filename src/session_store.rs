/*
 * src/session_store.rs
 *
 * File for the Session Profile Store (C8)
 *
 * Purpose:
 *   In-process map session_id -> profile. Per-session locks, no
 *   cross-session lock held (§5). Expiry is lazy on read when
 *   now - created_at > 24h; a periodic cleanup (invokable externally)
 *   removes expired entries (§4.8).
 */

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

use crate::global::SESSION_TTL_HOURS;
use crate::models::session::{SessionProfile, SignalAction};

#[derive(Default)]
pub struct SessionStore {
	profiles: Mutex<HashMap<String, SessionProfile>>,
	ttl_hours: i64,
}

impl SessionStore {
	pub fn new() -> Self {
		Self {
			profiles: Mutex::new(HashMap::new()),
			ttl_hours: SESSION_TTL_HOURS,
		}
	}

	/// Lazily expires the entry on read rather than eagerly on a timer.
	pub fn get(&self, session_id: &str) -> Option<SessionProfile> {
		let mut profiles = self.profiles.lock().unwrap();
		let now = Utc::now();
		if let Some(profile) = profiles.get(session_id) {
			if profile.is_expired(now, self.ttl_hours) {
				profiles.remove(session_id);
				return None;
			}
			return Some(profile.clone());
		}
		None
	}

	pub fn add_signal(
		&self,
		session_id: &str,
		place_id: i64,
		action: SignalAction,
		tags: &[String],
		dwell_ms: Option<u64>,
		step: Option<String>,
	) {
		let mut profiles = self.profiles.lock().unwrap();
		let now = Utc::now();
		let profile = profiles
			.entry(session_id.to_string())
			.or_insert_with(|| SessionProfile::new(session_id.to_string()));
		if profile.is_expired(now, self.ttl_hours) {
			*profile = SessionProfile::new(session_id.to_string());
		}
		profile.record_signal(place_id, action, tags, dwell_ms, step);
	}

	/// Externally invokable periodic cleanup of all expired entries.
	pub fn cleanup_expired(&self) -> usize {
		let mut profiles = self.profiles.lock().unwrap();
		let now = Utc::now();
		let ttl_hours = self.ttl_hours;
		let before = profiles.len();
		profiles.retain(|_, profile| !profile.is_expired(now, ttl_hours));
		before - profiles.len()
	}

	pub fn len(&self) -> usize {
		self.profiles.lock().unwrap().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_signal_then_get_round_trips() {
		let store = SessionStore::new();
		store.add_signal("s1", 42, SignalAction::Like, &["chill".to_string()], None, None);
		let profile = store.get("s1").unwrap();
		assert_eq!(profile.signal_log.len(), 1);
	}

	#[test]
	fn cleanup_removes_only_expired_entries() {
		let store = SessionStore::new();
		store.add_signal("fresh", 1, SignalAction::Open, &[], None, None);
		assert_eq!(store.cleanup_expired(), 0);
		assert_eq!(store.len(), 1);
	}
}
