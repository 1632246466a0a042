/*
 * src/ingestion/publisher.rs
 *
 * File for the Publisher step (C3)
 *
 * Purpose:
 *   Not an agent, a function: performs final validation, sets
 *   status=PUBLISHED and published_at, emits a PUBLISHED event. Warnings
 *   never block publication (§4.3).
 */

use chrono::Utc;

use crate::models::venue::{Venue, VenueStatus};

#[derive(Default)]
pub struct Publisher;

impl Publisher {
	/// Caller (the editor step) has already confirmed the record has no
	/// blocking issues; this only stamps the terminal transition.
	pub fn publish(&self, mut venue: Venue) -> Venue {
		venue.status = VenueStatus::Published;
		venue.published_at = Some(Utc::now());
		venue
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::venue::{Attempts, QualityFlags};

	#[test]
	fn publish_sets_status_and_timestamp() {
		let venue = Venue {
			id: 1,
			source_id: None,
			source: None,
			name: "Test".to_string(),
			category: None,
			description: Some("d".to_string()),
			summary: None,
			tags: vec![],
			address: None,
			lat: Some(1.0),
			lng: Some(1.0),
			price_level: None,
			rating: None,
			opening_hours: None,
			website: None,
			phone: None,
			picture_url: None,
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
		};
		let published = Publisher::default().publish(venue);
		assert_eq!(published.status, VenueStatus::Published);
		assert!(published.published_at.is_some());
	}
}
