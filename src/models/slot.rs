/*
 * src/models/slot.rs
 *
 * File for Slot Extractor output models (C4)
 */

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotType {
	Vibe,
	Experience,
	Drink,
	Cuisine,
	Dish,
	Area,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
	Exact,
	Phrase,
	Multiword,
	Unigram,
	Fuzzy,
}

/// An area viewport filter: SW/NE corners of a rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Viewport {
	pub sw_lat: f64,
	pub sw_lng: f64,
	pub ne_lat: f64,
	pub ne_lng: f64,
}

/// The predicate a slot's retrieval call must satisfy against candidate
/// venues: a required tag set, plus an optional area viewport.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FilterPredicate {
	pub required_tags: Vec<String>,
	pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Slot {
	pub slot_type: SlotType,
	pub canonical: String,
	pub label: String,
	pub confidence: f64,
	pub matched_substring: String,
	pub match_kind: MatchKind,
	pub filter: FilterPredicate,
	pub position: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SlotterDebug {
	pub raw_matches: usize,
	pub overlaps_resolved: usize,
	pub confidence_floor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotterResult {
	pub slots: Vec<Slot>,
	pub fallback_used: bool,
	pub fallback_reason: Option<String>,
	pub processing_time_ms: u64,
	pub debug: SlotterDebug,
}

impl SlotterResult {
	/// §8 universal invariant: slot positions strictly increasing.
	pub fn positions_strictly_increasing(&self) -> bool {
		self.slots.windows(2).all(|w| w[0].position < w[1].position)
	}
}
