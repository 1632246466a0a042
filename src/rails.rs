/*
 * src/rails.rs
 *
 * File for the Rail Composer (C6)
 *
 * Purpose:
 *   Execute all slots concurrently, apply cross-rail deduplication,
 *   per-rail diversification, and assemble the response (§4.6).
 */

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::timeout;
use utoipa::ToSchema;

use crate::global::{DEFAULT_RAIL_LIMIT, MMR_LAMBDA};
use crate::models::session::SessionProfile;
use crate::models::slot::Slot;
use crate::retrieval::{GeoPoint, RetrievalEngine, ScoredVenue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RailMode {
	Light,
	Vibe,
	Surprise,
}

impl RailMode {
	pub fn parse(raw: &str) -> Self {
		match raw {
			"vibe" => RailMode::Vibe,
			"surprise" => RailMode::Surprise,
			_ => RailMode::Light,
		}
	}
}

#[derive(Debug, Clone)]
pub struct Rail {
	pub step: usize,
	pub label: String,
	pub items: Vec<ScoredVenue>,
	pub origin: String,
	pub reason: String,
	pub candidate_count: usize,
	pub timed_out: bool,
}

pub struct RailComposer {
	engine: Arc<RetrievalEngine>,
	per_call_timeout: Duration,
}

impl RailComposer {
	pub fn new(engine: Arc<RetrievalEngine>) -> Self {
		Self {
			engine,
			per_call_timeout: Duration::from_millis(1500),
		}
	}

	/// §4.6: fan out one retrieval call per slot, dedup across rails
	/// keeping each venue in its highest-scoring rail, diversify within
	/// each rail with an MMR-style sweep, then attach mode-specific
	/// behavior and a human-readable reason.
	pub async fn compose(
		&self,
		slots: &[Slot],
		user_geo: Option<GeoPoint>,
		radius_m: Option<f64>,
		mode: RailMode,
		limit_per_step: usize,
		session: Option<&SessionProfile>,
	) -> Vec<Rail> {
		let limit_per_step = if limit_per_step == 0 { DEFAULT_RAIL_LIMIT } else { limit_per_step };

		let effective_engine = match mode {
			RailMode::Vibe => Arc::new(self.engine.with_doubled_vibe_weight()),
			RailMode::Surprise => Arc::new(self.engine.with_increased_signal_weight()),
			RailMode::Light => Arc::clone(&self.engine),
		};

		let mut fetches = Vec::with_capacity(slots.len());
		for slot in slots {
			let engine = Arc::clone(&effective_engine);
			let slot = slot.clone();
			let user_geo = user_geo.clone();
			let per_call_timeout = self.per_call_timeout;
			fetches.push(async move {
				let fetch_limit = (limit_per_step * 3) as i64;
				match timeout(per_call_timeout, engine.search_by_slot(&slot, fetch_limit, user_geo, radius_m)).await {
					Ok(Ok(items)) => (slot, items, false),
					Ok(Err(_)) => (slot, Vec::new(), false),
					Err(_) => (slot, Vec::new(), true),
				}
			});
		}
		let fetched = futures::future::join_all(fetches).await;

		let mut rails: Vec<Rail> = Vec::with_capacity(fetched.len());
		for (step, (slot, mut items, timed_out)) in fetched.into_iter().enumerate() {
			if let (RailMode::Vibe, Some(session)) = (mode, session) {
				apply_vibe_boost(&mut items, session);
			}
			rails.push(Rail {
				step,
				label: format!("{:?}:{}", slot.slot_type, slot.canonical).to_lowercase(),
				items,
				origin: slot.canonical.clone(),
				reason: reason_for_slot(&slot),
				candidate_count: 0,
				timed_out,
			});
		}

		deduplicate_across_rails(&mut rails);

		for rail in rails.iter_mut() {
			rail.candidate_count = rail.items.len();
			let extraordinary_candidate = if mode == RailMode::Surprise {
				rail.items.iter().find(|i| i.venue.signal_bool("extraordinary")).cloned()
			} else {
				None
			};
			rail.items = diversify(std::mem::take(&mut rail.items), limit_per_step);
			if let Some(extraordinary) = extraordinary_candidate {
				force_include_extraordinary(rail, extraordinary);
			}
		}

		rails
	}
}

fn reason_for_slot(slot: &Slot) -> String {
	format!("Matches your {} intent", slot.label.to_lowercase())
}

/// §4.6 step 3: a venue id appears in at most one rail; conflicts go to
/// the rail where the venue scores highest, visiting rails in slot order.
fn deduplicate_across_rails(rails: &mut [Rail]) {
	let mut best_rail_for_id: std::collections::HashMap<i64, (usize, f64)> = std::collections::HashMap::new();
	for (idx, rail) in rails.iter().enumerate() {
		for item in &rail.items {
			let entry = best_rail_for_id.entry(item.venue.id).or_insert((idx, item.score));
			if item.score > entry.1 {
				*entry = (idx, item.score);
			}
		}
	}
	for (idx, rail) in rails.iter_mut().enumerate() {
		rail.items.retain(|item| {
			best_rail_for_id
				.get(&item.venue.id)
				.map(|(winner, _)| *winner == idx)
				.unwrap_or(false)
		});
	}
}

fn signature(item: &ScoredVenue) -> String {
	item.venue.category.clone().unwrap_or_default()
}

fn category_similarity(a: &ScoredVenue, b: &ScoredVenue) -> f64 {
	if signature(a) == signature(b) && !signature(a).is_empty() {
		1.0
	} else {
		0.0
	}
}

/// §4.6 step 4: MMR-style diversification, picking the item maximizing
/// `score - lambda * max_similarity_to_already_picked` each round.
fn diversify(mut candidates: Vec<ScoredVenue>, target_len: usize) -> Vec<ScoredVenue> {
	candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
	let mut picked: Vec<ScoredVenue> = Vec::with_capacity(target_len);
	let mut seen_ids = HashSet::new();

	while picked.len() < target_len && !candidates.is_empty() {
		let mut best_idx = 0usize;
		let mut best_value = f64::MIN;
		for (idx, candidate) in candidates.iter().enumerate() {
			let max_sim = picked
				.iter()
				.map(|p| category_similarity(candidate, p))
				.fold(0.0_f64, f64::max);
			let value = candidate.score - MMR_LAMBDA * max_sim;
			if value > best_value {
				best_value = value;
				best_idx = idx;
			}
		}
		let chosen = candidates.remove(best_idx);
		if seen_ids.insert(chosen.venue.id) {
			picked.push(chosen);
		}
	}
	picked
}

fn apply_vibe_boost(items: &mut [ScoredVenue], session: &SessionProfile) {
	for item in items.iter_mut() {
		let overlap: f64 = item
			.venue
			.tags
			.iter()
			.filter_map(|tag| session.vibe_vector.get(tag))
			.sum();
		item.score += 0.6 * overlap;
	}
	items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
}

/// §4.6 mode `surprise`: force-include at least one `extraordinary`
/// venue per rail when one is available, replacing the lowest-scoring
/// picked item rather than growing the rail past `limit_per_step`.
fn force_include_extraordinary(rail: &mut Rail, extraordinary: ScoredVenue) {
	if rail.items.iter().any(|i| i.venue.id == extraordinary.venue.id) {
		return;
	}
	if let Some(weakest) = rail
		.items
		.iter()
		.enumerate()
		.min_by(|(_, a), (_, b)| a.score.partial_cmp(&b.score).unwrap())
		.map(|(idx, _)| idx)
	{
		rail.items[weakest] = extraordinary;
		rail.items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
	} else {
		rail.items.push(extraordinary);
	}
}
