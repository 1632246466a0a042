/*
 * src/ontology.rs
 *
 * File for the Ontology & Synonym Dictionary (C1)
 *
 * Purpose:
 *   Load and validate the tag taxonomy and per-slot synonym -> canonical
 *   maps. Immutable after load; readers need no locks (§5).
 *
 * Include:
 *   Ontology          - loaded, validated in-memory dictionary
 *   OntologyError     - validation failure kinds
 *   OntologyHealth     - boolean + counters surfaced via the health probe
 */

use std::collections::{HashMap, HashSet};

use crate::models::slot::SlotType;
use crate::models::synonym::SynonymEntry;

#[derive(Debug, Clone, PartialEq)]
pub enum OntologyError {
	InvalidTags(String),
	DuplicateSynonyms(String),
	MissingCanonical(String),
}

impl std::fmt::Display for OntologyError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			OntologyError::InvalidTags(msg) => write!(f, "INVALID_TAGS: {msg}"),
			OntologyError::DuplicateSynonyms(msg) => write!(f, "DUPLICATE_SYNONYMS: {msg}"),
			OntologyError::MissingCanonical(msg) => write!(f, "MISSING_CANONICAL: {msg}"),
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct OntologyHealth {
	pub healthy: bool,
	pub entry_count: usize,
	pub warning_count: usize,
	pub warnings: Vec<String>,
}

/// Normalizes a surface form: case-fold, strip accents (best-effort via
/// NFD-less ASCII-range stripping), drop punctuation, collapse whitespace.
pub fn normalize(surface: &str) -> String {
	let folded = surface.to_lowercase();
	let cleaned: String = folded
		.chars()
		.filter(|c| !matches!(c, '\u{0300}'..='\u{036f}'))
		.map(|c| if c.is_alphanumeric() { c } else { ' ' })
		.collect();
	cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug)]
pub struct Ontology {
	entries: Vec<SynonymEntry>,
	/// normalized surface -> index into `entries`
	alias_map: HashMap<String, usize>,
	health: OntologyHealth,
}

impl Ontology {
	/// Loads and validates a set of synonym entries. Fails closed on
	/// `INVALID_TAGS` / `DUPLICATE_SYNONYMS` / `MISSING_CANONICAL`;
	/// empty synonym lists and unreachable entries are warnings only.
	pub fn load(entries: Vec<SynonymEntry>) -> Result<Self, OntologyError> {
		let canonicals: HashSet<&str> = entries.iter().map(|e| e.canonical.as_str()).collect();

		let mut alias_map: HashMap<String, usize> = HashMap::new();
		let mut warnings = Vec::new();

		for (idx, entry) in entries.iter().enumerate() {
			if entry.canonical.trim().is_empty() {
				return Err(OntologyError::MissingCanonical(format!(
					"entry at index {idx} has no canonical id"
				)));
			}
			for tag in &entry.expansion_tags {
				if !canonicals.contains(tag.as_str()) {
					return Err(OntologyError::InvalidTags(format!(
						"expansion tag '{tag}' on '{}' is not a known canonical",
						entry.canonical
					)));
				}
			}
			if entry.synonyms.is_empty() {
				warnings.push(format!("entry '{}' has no synonyms", entry.canonical));
			}
			for surface in &entry.synonyms {
				let key = normalize(surface);
				if let Some(&existing) = alias_map.get(&key) {
					if entries[existing].canonical != entry.canonical {
						return Err(OntologyError::DuplicateSynonyms(format!(
							"'{key}' maps to both '{}' and '{}'",
							entries[existing].canonical, entry.canonical
						)));
					}
				}
				alias_map.insert(key, idx);
			}
		}

		let referenced: HashSet<&str> = entries
			.iter()
			.flat_map(|e| e.expansion_tags.iter().map(|s| s.as_str()))
			.collect();
		for entry in &entries {
			if !referenced.contains(entry.canonical.as_str()) && entry.expansion_tags.is_empty() {
				warnings.push(format!("entry '{}' is unreachable via expansion", entry.canonical));
			}
		}

		let health = OntologyHealth {
			healthy: true,
			entry_count: entries.len(),
			warning_count: warnings.len(),
			warnings,
		};

		Ok(Self {
			entries,
			alias_map,
			health,
		})
	}

	pub fn alias_map(&self) -> &HashMap<String, usize> {
		&self.alias_map
	}

	pub fn entry(&self, idx: usize) -> &SynonymEntry {
		&self.entries[idx]
	}

	pub fn entries(&self) -> &[SynonymEntry] {
		&self.entries
	}

	pub fn resolve(&self, surface: &str) -> Option<&SynonymEntry> {
		self.alias_map.get(&normalize(surface)).map(|&idx| &self.entries[idx])
	}

	pub fn entries_for_type(&self, slot_type: SlotType) -> impl Iterator<Item = &SynonymEntry> {
		self.entries.iter().filter(move |e| e.slot_type == slot_type)
	}

	/// Boost map for a canonical tag: its own expansion tags, used by C5's
	/// lexical query construction.
	pub fn boost_map(&self, canonical: &str) -> Vec<String> {
		self.entries
			.iter()
			.find(|e| e.canonical == canonical)
			.map(|e| e.expansion_tags.clone())
			.unwrap_or_default()
	}

	pub fn health(&self) -> &OntologyHealth {
		&self.health
	}

	pub fn validate(&self) -> Result<OntologyHealth, OntologyError> {
		Ontology::load(self.entries.clone()).map(|o| o.health)
	}
}

/// Built-in synonym entries covering the slot types named in §4.1:
/// vibes, experiences, dishes, cuisines, drinks, and areas. Loaded once
/// at process start; operators wanting a different taxonomy replace
/// this with a database- or file-backed loader behind the same `load`
/// entry point.
pub fn seed_entries() -> Vec<SynonymEntry> {
	vec![
		SynonymEntry {
			slot_type: SlotType::Vibe,
			canonical: "chill".to_string(),
			label: "Chill".to_string(),
			synonyms: vec!["chill".to_string(), "relax".to_string(), "laid back".to_string(), "laidback".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Vibe,
			canonical: "romantic".to_string(),
			label: "Romantic".to_string(),
			synonyms: vec!["romantic".to_string(), "date night".to_string(), "intimate".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Vibe,
			canonical: "lively".to_string(),
			label: "Lively".to_string(),
			synonyms: vec!["lively".to_string(), "energetic".to_string(), "buzzing".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Experience,
			canonical: "rooftop".to_string(),
			label: "Rooftop".to_string(),
			synonyms: vec!["rooftop".to_string(), "roof top".to_string(), "sky bar".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Experience,
			canonical: "live_music".to_string(),
			label: "Live Music".to_string(),
			synonyms: vec!["live music".to_string(), "live band".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Experience,
			canonical: "cinema".to_string(),
			label: "Cinema".to_string(),
			synonyms: vec!["cinema".to_string(), "movie".to_string(), "movies".to_string(), "film".to_string()],
			expansion_tags: vec!["cinema".to_string()],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Dish,
			canonical: "tom_yum".to_string(),
			label: "Tom Yum".to_string(),
			synonyms: vec!["tom yum".to_string(), "tomyum".to_string(), "tom yum goong".to_string()],
			expansion_tags: vec!["thai".to_string()],
			denylist: vec!["tom yum knock off".to_string()],
		},
		SynonymEntry {
			slot_type: SlotType::Dish,
			canonical: "pad_thai".to_string(),
			label: "Pad Thai".to_string(),
			synonyms: vec!["pad thai".to_string(), "padthai".to_string()],
			expansion_tags: vec!["thai".to_string()],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Cuisine,
			canonical: "thai".to_string(),
			label: "Thai".to_string(),
			synonyms: vec!["thai".to_string(), "thai food".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Cuisine,
			canonical: "japanese".to_string(),
			label: "Japanese".to_string(),
			synonyms: vec!["japanese".to_string(), "japanese food".to_string(), "izakaya".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Drink,
			canonical: "cocktail".to_string(),
			label: "Cocktails".to_string(),
			synonyms: vec!["cocktail".to_string(), "cocktails".to_string(), "drinks".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Drink,
			canonical: "craft_beer".to_string(),
			label: "Craft Beer".to_string(),
			synonyms: vec!["craft beer".to_string(), "beer".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
		SynonymEntry {
			slot_type: SlotType::Area,
			canonical: "riverside".to_string(),
			label: "Riverside".to_string(),
			synonyms: vec!["riverside".to_string(), "river side".to_string(), "by the river".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		},
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_entries() -> Vec<SynonymEntry> {
		vec![
			SynonymEntry {
				slot_type: SlotType::Vibe,
				canonical: "chill".to_string(),
				label: "Chill".to_string(),
				synonyms: vec!["chill".to_string(), "relax".to_string(), "laid back".to_string()],
				expansion_tags: vec![],
				denylist: vec![],
			},
			SynonymEntry {
				slot_type: SlotType::Dish,
				canonical: "tom_yum".to_string(),
				label: "Tom Yum".to_string(),
				synonyms: vec!["tom yum".to_string(), "tomyum".to_string()],
				expansion_tags: vec!["chill".to_string()],
				denylist: vec!["tom yum knock off".to_string()],
			},
		]
	}

	#[test]
	fn alias_map_round_trips_every_synonym() {
		let ontology = Ontology::load(sample_entries()).unwrap();
		for entry in ontology.entries() {
			for synonym in &entry.synonyms {
				let resolved = ontology.resolve(synonym).unwrap();
				assert_eq!(resolved.canonical, entry.canonical);
			}
		}
	}

	#[test]
	fn normalize_case_folds_and_collapses_whitespace() {
		assert_eq!(normalize("  Laid   Back  "), "laid back");
	}

	#[test]
	fn duplicate_synonym_across_canonicals_fails_closed() {
		let mut entries = sample_entries();
		entries.push(SynonymEntry {
			slot_type: SlotType::Vibe,
			canonical: "other".to_string(),
			label: "Other".to_string(),
			synonyms: vec!["chill".to_string()],
			expansion_tags: vec![],
			denylist: vec![],
		});
		let err = Ontology::load(entries).unwrap_err();
		assert!(matches!(err, OntologyError::DuplicateSynonyms(_)));
	}

	#[test]
	fn unknown_expansion_tag_fails_closed() {
		let mut entries = sample_entries();
		entries[1].expansion_tags.push("not_a_canonical".to_string());
		let err = Ontology::load(entries).unwrap_err();
		assert!(matches!(err, OntologyError::InvalidTags(_)));
	}

	#[test]
	fn empty_synonym_list_is_a_warning_not_a_failure() {
		let mut entries = sample_entries();
		entries[0].synonyms.clear();
		let ontology = Ontology::load(entries).unwrap();
		assert!(ontology.health().warning_count >= 1);
	}
}
