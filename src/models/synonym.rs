/*
 * src/models/synonym.rs
 *
 * File for Ontology & Synonym Dictionary models (C1)
 */

use serde::{Deserialize, Serialize};

use crate::models::slot::SlotType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymEntry {
	pub slot_type: SlotType,
	pub canonical: String,
	pub label: String,
	pub synonyms: Vec<String>,
	pub expansion_tags: Vec<String>,
	#[serde(default)]
	pub denylist: Vec<String>,
}

impl SynonymEntry {
	pub fn is_multiword(s: &str) -> bool {
		s.trim().contains(' ')
	}
}
