/*
 * src/ingestion/editor.rs
 *
 * File for the Editor/Validator agent (C3)
 *
 * Purpose:
 *   Checks publishing invariants (§3). Critical fields missing ->
 *   NEEDS_REVISION with a diagnostic per missing field. Non-critical
 *   fields missing (photos, rating) may still publish with the
 *   corresponding quality_flag = missing. Computes final quality flags
 *   from field-specific thresholds (§4.3).
 */

use crate::models::venue::{valid_coords, FieldQuality, QualityFlags, Venue};

#[derive(Default)]
pub struct Editor;

pub struct EditorVerdict {
	pub issues: Vec<String>,
	pub quality_flags: QualityFlags,
}

impl Editor {
	pub fn review(&self, venue: &Venue) -> EditorVerdict {
		let mut issues = Vec::new();

		if venue.name.trim().is_empty() {
			issues.push("MISSING_NAME".to_string());
		}

		let coords_quality = match venue.lat.zip(venue.lng) {
			Some((lat, lng)) if valid_coords(lat, lng) => FieldQuality::Good,
			Some(_) => {
				issues.push("INVALID_COORDS".to_string());
				FieldQuality::Weak
			}
			None => {
				issues.push("MISSING_COORDS".to_string());
				FieldQuality::Missing
			}
		};

		if venue.summary.is_none() && venue.description.is_none() {
			issues.push("MISSING_DESCRIPTION_OR_SUMMARY".to_string());
		}

		let summary_quality = match venue.summary.as_deref().map(str::len) {
			Some(len) if len >= 120 => FieldQuality::Excellent,
			Some(len) if len >= 40 => FieldQuality::Good,
			Some(_) => FieldQuality::Weak,
			None => FieldQuality::Missing,
		};

		let tags_quality = match venue.tags.len() {
			n if n >= 6 => FieldQuality::Rich,
			n if n >= 3 => FieldQuality::Good,
			0 => FieldQuality::Missing,
			_ => FieldQuality::Weak,
		};

		// Photos are non-critical: missing ones lower the quality flag
		// but never block publication (§4.3).
		let photos_quality = if venue.picture_url.is_some() {
			FieldQuality::Excellent
		} else {
			FieldQuality::Missing
		};

		EditorVerdict {
			issues,
			quality_flags: QualityFlags {
				summary: summary_quality,
				tags: tags_quality,
				photos: photos_quality,
				coords: coords_quality,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::venue::{Attempts, VenueStatus};
	use chrono::Utc;

	fn base_venue() -> Venue {
		Venue {
			id: 1,
			source_id: None,
			source: None,
			name: "Rooftop Bar".to_string(),
			category: Some("bar".to_string()),
			description: Some("a rooftop bar with skyline views".to_string()),
			summary: Some("Skyline rooftop bar with craft cocktails and sunset views every evening".to_string()),
			tags: vec!["rooftop".to_string(), "chill".to_string(), "romantic".to_string()],
			address: Some("1 Sky Ave".to_string()),
			lat: Some(13.75),
			lng: Some(100.50),
			price_level: Some(3),
			rating: Some(4.6),
			opening_hours: None,
			website: None,
			phone: None,
			picture_url: Some("http://example.com/p.jpg".to_string()),
			map_url: None,
			place_id: None,
			business_status: None,
			signals: Default::default(),
			status: VenueStatus::Enriched,
			attempts: Attempts::default(),
			quality_flags: QualityFlags::default(),
			last_error: None,
			scraped_at: None,
			updated_at: Utc::now(),
			published_at: None,
			events: vec![],
		}
	}

	#[test]
	fn complete_venue_has_no_issues() {
		let verdict = Editor::default().review(&base_venue());
		assert!(verdict.issues.is_empty());
	}

	#[test]
	fn missing_coords_is_a_critical_issue() {
		let mut venue = base_venue();
		venue.lat = None;
		venue.lng = None;
		let verdict = Editor::default().review(&venue);
		assert!(verdict.issues.contains(&"MISSING_COORDS".to_string()));
	}

	#[test]
	fn missing_photo_is_noncritical_but_flagged() {
		let mut venue = base_venue();
		venue.picture_url = None;
		let verdict = Editor::default().review(&venue);
		assert!(verdict.issues.is_empty());
		assert_eq!(verdict.quality_flags.photos, FieldQuality::Missing);
	}
}
