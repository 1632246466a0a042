/*
 * src/slotter/mod.rs
 *
 * File for the Slot Extractor (C4)
 *
 * Purpose:
 *   Parse a free-text query into an ordered list of typed slots with
 *   confidences and a fallback strategy (§4.4).
 */

pub mod cache;

use std::sync::Arc;
use std::time::Instant;

use crate::global::{CONFIDENCE_FLOOR_DEFAULT, CONFIDENCE_FLOOR_VAGUE, VAGUE_TOKEN_THRESHOLD};
use crate::models::slot::{FilterPredicate, MatchKind, Slot, SlotType, SlotterDebug, SlotterResult};
use crate::ontology::{normalize, Ontology};
use cache::{CacheKey, ParseCache};

#[derive(Debug, Clone)]
pub struct SlotterConfig {
	pub max_slots: usize,
	pub min_confidence: f64,
	pub enable_fuzzy: bool,
	pub fuzzy_threshold: f64,
	pub fallback_enabled: bool,
	/// Declared precedence: first non-empty strategy wins (§9 resolution).
	pub fallback_strategies: Vec<FallbackStrategy>,
}

impl Default for SlotterConfig {
	fn default() -> Self {
		Self {
			max_slots: 3,
			min_confidence: 0.3,
			enable_fuzzy: true,
			fuzzy_threshold: 0.75,
			fallback_enabled: true,
			fallback_strategies: vec![FallbackStrategy::SignalsEditorial, FallbackStrategy::CoOccurrence],
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackStrategy {
	SignalsEditorial,
	CoOccurrence,
}

struct Candidate {
	slot_type: SlotType,
	canonical: String,
	label: String,
	confidence: f64,
	matched_substring: String,
	match_kind: MatchKind,
	expansion_tags: Vec<String>,
	start_token: usize,
	end_token: usize,
}

pub struct Slotter {
	ontology: Arc<Ontology>,
	cache: ParseCache,
	config: SlotterConfig,
}

impl Slotter {
	pub fn new(ontology: Arc<Ontology>, config: SlotterConfig) -> Self {
		Self {
			ontology,
			cache: ParseCache::default(),
			config,
		}
	}

	pub fn parse(&self, query: &str, area: Option<&str>, user_lat: Option<f64>, user_lng: Option<f64>) -> (SlotterResult, bool) {
		let key = CacheKey::new(query, area, user_lat, user_lng);
		if let Some(cached) = self.cache.get(&key) {
			return (cached, true);
		}

		let result = self.parse_uncached(query);
		self.cache.put(key, result.clone());
		(result, false)
	}

	fn parse_uncached(&self, query: &str) -> SlotterResult {
		let started = Instant::now();
		let normalized = normalize(query);
		let tokens: Vec<&str> = normalized.split_whitespace().collect();

		let mut candidates: Vec<Candidate> = Vec::new();
		let l_max = 4usize;

		// Step 2a/2b: longest-first phrase/multiword matches over sliding windows.
		let mut covered = vec![false; tokens.len()];
		for window_len in (1..=l_max.min(tokens.len().max(1))).rev() {
			if window_len < 1 {
				continue;
			}
			for start in 0..tokens.len().saturating_sub(window_len - 1) {
				let end = start + window_len;
				if end > tokens.len() {
					continue;
				}
				if covered[start..end].iter().any(|c| *c) {
					continue;
				}
				let phrase = tokens[start..end].join(" ");
				if let Some(entry) = self.ontology.resolve(&phrase) {
					let is_multiword = window_len > 1;
					let confidence = if window_len == 1 {
						0.70
					} else if phrase == normalize(entry.synonyms.first().map(|s| s.as_str()).unwrap_or("")) {
						0.95
					} else {
						0.85
					};
					let match_kind = if window_len == 1 {
						MatchKind::Unigram
					} else if is_multiword {
						MatchKind::Phrase
					} else {
						MatchKind::Multiword
					};
					candidates.push(Candidate {
						slot_type: entry.slot_type,
						canonical: entry.canonical.clone(),
						label: entry.label.clone(),
						confidence,
						matched_substring: phrase,
						match_kind,
						expansion_tags: entry.expansion_tags.clone(),
						start_token: start,
						end_token: end,
					});
					for slot in covered.iter_mut().take(end).skip(start) {
						*slot = true;
					}
				}
			}
		}

		// Step 2d: bounded fuzzy matching over residual tokens.
		if self.config.enable_fuzzy {
			for (idx, token) in tokens.iter().enumerate() {
				if covered[idx] {
					continue;
				}
				if let Some((entry, similarity)) = self.best_fuzzy_match(token) {
					if similarity >= self.config.fuzzy_threshold {
						candidates.push(Candidate {
							slot_type: entry.slot_type,
							canonical: entry.canonical.clone(),
							label: entry.label.clone(),
							confidence: 0.50 * similarity,
							matched_substring: token.to_string(),
							match_kind: MatchKind::Fuzzy,
							expansion_tags: entry.expansion_tags.clone(),
							start_token: idx,
							end_token: idx + 1,
						});
					}
				}
			}
		}

		// Step 3: deny-filter.
		candidates.retain(|c| {
			let entry = self.ontology.entries().iter().find(|e| e.canonical == c.canonical);
			match entry {
				Some(entry) => !entry.denylist.iter().any(|d| normalized.contains(d.as_str())),
				None => true,
			}
		});

		// Step 4: resolve overlaps, keep higher confidence; tie -> longer match, then earlier position.
		candidates.sort_by(|a, b| {
			b.confidence
				.partial_cmp(&a.confidence)
				.unwrap()
				.then((b.end_token - b.start_token).cmp(&(a.end_token - a.start_token)))
				.then(a.start_token.cmp(&b.start_token))
		});
		let mut resolved: Vec<Candidate> = Vec::new();
		let mut taken = vec![false; tokens.len()];
		let raw_match_count = candidates.len();
		for candidate in candidates {
			let span_free = !taken[candidate.start_token..candidate.end_token].iter().any(|t| *t);
			if span_free {
				for slot in taken.iter_mut().take(candidate.end_token).skip(candidate.start_token) {
					*slot = true;
				}
				resolved.push(candidate);
			}
		}
		let overlaps_resolved = raw_match_count.saturating_sub(resolved.len());

		// Step 5: rank by position, dedup by (type, canonical), trim, enforce confidence floor.
		resolved.sort_by_key(|c| c.start_token);
		let vague = tokens.len() <= VAGUE_TOKEN_THRESHOLD
			&& !resolved.iter().any(|c| matches!(c.match_kind, MatchKind::Phrase));
		let confidence_floor = if vague { CONFIDENCE_FLOOR_VAGUE } else { CONFIDENCE_FLOOR_DEFAULT };
		let floor = confidence_floor.max(self.config.min_confidence);

		let mut seen = std::collections::HashSet::new();
		let mut slots: Vec<Slot> = Vec::new();
		for candidate in resolved {
			if candidate.confidence < floor {
				continue;
			}
			let dedup_key = (candidate.slot_type, candidate.canonical.clone());
			if !seen.insert(dedup_key) {
				continue;
			}
			slots.push(Slot {
				slot_type: candidate.slot_type,
				canonical: candidate.canonical,
				label: candidate.label,
				confidence: candidate.confidence,
				matched_substring: candidate.matched_substring,
				match_kind: candidate.match_kind,
				filter: FilterPredicate {
					required_tags: candidate.expansion_tags,
					viewport: None,
				},
				position: candidate.start_token,
			});
			if slots.len() >= self.config.max_slots {
				break;
			}
		}

		let (slots, fallback_used, fallback_reason) = if slots.is_empty() && self.config.fallback_enabled {
			let (fallback_slot, reason) = self.run_fallback();
			match fallback_slot {
				Some(slot) => (vec![slot], true, Some(reason)),
				None => (vec![], true, Some(reason)),
			}
		} else {
			(slots, false, None)
		};

		SlotterResult {
			slots,
			fallback_used,
			fallback_reason,
			processing_time_ms: started.elapsed().as_millis() as u64,
			debug: SlotterDebug {
				raw_matches: raw_match_count,
				overlaps_resolved,
				confidence_floor: floor,
			},
		}
	}

	fn best_fuzzy_match(&self, token: &str) -> Option<(&crate::models::synonym::SynonymEntry, f64)> {
		let mut best: Option<(&crate::models::synonym::SynonymEntry, f64)> = None;
		for entry in self.ontology.entries() {
			for synonym in &entry.synonyms {
				let sim = token_similarity(token, &normalize(synonym));
				if best.map(|(_, b)| sim > b).unwrap_or(true) {
					best = Some((entry, sim));
				}
			}
		}
		best
	}

	/// §4.4 step 6: run configured fallback strategies in declared order,
	/// first non-empty wins.
	fn run_fallback(&self) -> (Option<Slot>, String) {
		for strategy in &self.config.fallback_strategies {
			match strategy {
				FallbackStrategy::SignalsEditorial => {
					if let Some(entry) = self.ontology.entries_for_type(SlotType::Vibe).next() {
						return (
							Some(Slot {
								slot_type: SlotType::Vibe,
								canonical: entry.canonical.clone(),
								label: entry.label.clone(),
								confidence: 0.4,
								matched_substring: String::new(),
								match_kind: MatchKind::Fuzzy,
								filter: FilterPredicate {
									required_tags: vec!["editor_pick".to_string()],
									viewport: None,
								},
								position: 0,
							}),
							"signals:editorial".to_string(),
						);
					}
				}
				FallbackStrategy::CoOccurrence => {
					if let Some(entry) = self.ontology.entries().first() {
						return (
							Some(Slot {
								slot_type: entry.slot_type,
								canonical: entry.canonical.clone(),
								label: entry.label.clone(),
								confidence: 0.4,
								matched_substring: String::new(),
								match_kind: MatchKind::Fuzzy,
								filter: FilterPredicate::default(),
								position: 0,
							}),
							"co-occurrence".to_string(),
						);
					}
				}
			}
		}
		(None, "no_intents".to_string())
	}
}

/// Normalized Levenshtein similarity in [0,1]; 1.0 is an exact match.
fn token_similarity(a: &str, b: &str) -> f64 {
	if a == b {
		return 1.0;
	}
	let distance = levenshtein(a, b);
	let max_len = a.chars().count().max(b.chars().count()).max(1);
	1.0 - (distance as f64 / max_len as f64)
}

fn levenshtein(a: &str, b: &str) -> usize {
	let a: Vec<char> = a.chars().collect();
	let b: Vec<char> = b.chars().collect();
	let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
	for (i, row) in dp.iter_mut().enumerate() {
		row[0] = i;
	}
	for j in 0..=b.len() {
		dp[0][j] = j;
	}
	for i in 1..=a.len() {
		for j in 1..=b.len() {
			let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
			dp[i][j] = (dp[i - 1][j] + 1).min(dp[i][j - 1] + 1).min(dp[i - 1][j - 1] + cost);
		}
	}
	dp[a.len()][b.len()]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::synonym::SynonymEntry;

	fn sample_ontology() -> Arc<Ontology> {
		let entries = vec![
			SynonymEntry {
				slot_type: SlotType::Vibe,
				canonical: "chill".to_string(),
				label: "Chill".to_string(),
				synonyms: vec!["chill".to_string(), "relax".to_string()],
				expansion_tags: vec![],
				denylist: vec![],
			},
			SynonymEntry {
				slot_type: SlotType::Dish,
				canonical: "tom_yum".to_string(),
				label: "Tom Yum".to_string(),
				synonyms: vec!["tom yum".to_string()],
				expansion_tags: vec![],
				denylist: vec![],
			},
			SynonymEntry {
				slot_type: SlotType::Experience,
				canonical: "rooftop".to_string(),
				label: "Rooftop".to_string(),
				synonyms: vec!["rooftop".to_string()],
				expansion_tags: vec![],
				denylist: vec![],
			},
		];
		Arc::new(Ontology::load(entries).unwrap())
	}

	#[test]
	fn multi_intent_query_extracts_three_slots_in_order() {
		let slotter = Slotter::new(sample_ontology(), SlotterConfig::default());
		let (result, _) = slotter.parse("today i wanna chill, eat tom yum and go on the rooftop", None, None, None);
		assert!(result.positions_strictly_increasing());
		let canonicals: Vec<&str> = result.slots.iter().map(|s| s.canonical.as_str()).collect();
		assert_eq!(canonicals, vec!["chill", "tom_yum", "rooftop"]);
	}

	#[test]
	fn unknown_query_triggers_fallback() {
		let slotter = Slotter::new(sample_ontology(), SlotterConfig::default());
		let (result, _) = slotter.parse("totally unknown gibberish", None, None, None);
		assert!(result.fallback_used);
		assert!(result.slots.iter().all(|s| s.confidence <= 0.5));
	}

	#[test]
	fn max_slots_is_never_exceeded() {
		let slotter = Slotter::new(sample_ontology(), SlotterConfig::default());
		let (result, _) = slotter.parse("chill relax tom yum rooftop chill", None, None, None);
		assert!(result.slots.len() <= 3);
	}

	#[test]
	fn second_parse_is_served_from_cache() {
		let slotter = Slotter::new(sample_ontology(), SlotterConfig::default());
		let (_, hit1) = slotter.parse("chill", None, None, None);
		let (_, hit2) = slotter.parse("chill", None, None, None);
		assert!(!hit1);
		assert!(hit2);
	}
}
