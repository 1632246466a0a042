/*
 * src/slotter/cache.rs
 *
 * File for the parse result cache (§4.4)
 *
 * Purpose:
 *   Cache SlotterResults keyed by a fingerprint of the normalized query,
 *   area, and rounded geo. TTL 15 minutes, capacity 1000, LRU-evicted by
 *   oldest 20% on overflow. Eviction must not block readers (§5), so the
 *   whole cache sits behind a single Mutex and sheds load opportunistically
 *   rather than using fine-grained per-entry locking.
 */

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::global::{PARSE_CACHE_CAPACITY, PARSE_CACHE_EVICT_FRACTION, PARSE_CACHE_TTL_SECONDS};
use crate::models::slot::SlotterResult;
use crate::ontology::normalize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
	pub fn new(query: &str, area: Option<&str>, lat: Option<f64>, lng: Option<f64>) -> Self {
		let normalized = normalize(query);
		let area = area.unwrap_or("");
		let lat = lat.map(|v| format!("{:.4}", v)).unwrap_or_default();
		let lng = lng.map(|v| format!("{:.4}", v)).unwrap_or_default();
		Self(format!("{normalized}|{area}|{lat}|{lng}"))
	}
}

struct Entry {
	result: SlotterResult,
	inserted_at: DateTime<Utc>,
	last_accessed: DateTime<Utc>,
}

pub struct ParseCache {
	entries: Mutex<HashMap<CacheKey, Entry>>,
	ttl_seconds: i64,
	capacity: usize,
}

impl Default for ParseCache {
	fn default() -> Self {
		Self::new(PARSE_CACHE_TTL_SECONDS, PARSE_CACHE_CAPACITY)
	}
}

impl ParseCache {
	pub fn new(ttl_seconds: i64, capacity: usize) -> Self {
		Self {
			entries: Mutex::new(HashMap::new()),
			ttl_seconds,
			capacity,
		}
	}

	pub fn get(&self, key: &CacheKey) -> Option<SlotterResult> {
		let mut entries = self.entries.lock().unwrap();
		let now = Utc::now();
		let expired = entries
			.get(key)
			.map(|e| (now - e.inserted_at).num_seconds() > self.ttl_seconds)
			.unwrap_or(false);
		if expired {
			entries.remove(key);
			return None;
		}
		if let Some(entry) = entries.get_mut(key) {
			entry.last_accessed = now;
			return Some(entry.result.clone());
		}
		None
	}

	pub fn put(&self, key: CacheKey, result: SlotterResult) {
		let mut entries = self.entries.lock().unwrap();
		let now = Utc::now();
		entries.insert(
			key,
			Entry {
				result,
				inserted_at: now,
				last_accessed: now,
			},
		);

		if entries.len() > self.capacity {
			let evict_count = ((entries.len() as f64) * PARSE_CACHE_EVICT_FRACTION).ceil() as usize;
			let mut by_age: Vec<(CacheKey, DateTime<Utc>)> =
				entries.iter().map(|(k, v)| (k.clone(), v.last_accessed)).collect();
			by_age.sort_by_key(|(_, ts)| *ts);
			for (key, _) in by_age.into_iter().take(evict_count) {
				entries.remove(&key);
			}
		}
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::slot::SlotterDebug;

	fn dummy_result() -> SlotterResult {
		SlotterResult {
			slots: vec![],
			fallback_used: false,
			fallback_reason: None,
			processing_time_ms: 1,
			debug: SlotterDebug::default(),
		}
	}

	#[test]
	fn put_then_get_round_trips() {
		let cache = ParseCache::new(900, 1000);
		let key = CacheKey::new("chill", None, None, None);
		cache.put(key.clone(), dummy_result());
		assert!(cache.get(&key).is_some());
	}

	#[test]
	fn expired_entry_is_not_returned() {
		let cache = ParseCache::new(-1, 1000);
		let key = CacheKey::new("chill", None, None, None);
		cache.put(key.clone(), dummy_result());
		assert!(cache.get(&key).is_none());
	}

	#[test]
	fn overflow_evicts_oldest_entries() {
		let cache = ParseCache::new(900, 10);
		for i in 0..12 {
			let key = CacheKey::new(&format!("query {i}"), None, None, None);
			cache.put(key, dummy_result());
		}
		assert!(cache.len() <= 10);
	}
}
