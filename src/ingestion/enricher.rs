/*
 * src/ingestion/enricher.rs
 *
 * File for the Enricher agent (C3)
 *
 * Purpose:
 *   External geocoding capability: input = name + address; output =
 *   canonical place id, coordinates, formatted address, rating, price
 *   level, opening hours, phone, website, photo URLs. May fail with
 *   NOT_FOUND (-> NEEDS_REVISION) or PROVIDER_ERROR (retry with backoff,
 *   increments attempts.enricher) (§4.3).
 */

use async_trait::async_trait;
use google_maps::Client;
use num_traits::ToPrimitive;

use crate::global::GOOGLE_MAPS_API_KEY;
use crate::models::venue::Venue;

pub struct EnricherOutcome {
	pub place_id: String,
	pub lat: f64,
	pub lng: f64,
	pub formatted_address: String,
	pub rating: Option<f64>,
	pub price_level: Option<i16>,
	pub opening_hours: Option<serde_json::Value>,
	pub phone: Option<String>,
	pub website: Option<String>,
	pub photo_urls: Vec<String>,
}

pub enum EnricherError {
	NotFound,
	Provider(String),
}

#[async_trait]
pub trait EnricherCapability: Send + Sync {
	async fn enrich(&self, venue: &Venue) -> Result<EnricherOutcome, EnricherError>;
}

/// Backed by `google_maps::Client::geocoding`, the same capability the
/// fallback itinerary tool uses to resolve a location string to coordinates.
pub struct GoogleMapsEnricher;

#[async_trait]
impl EnricherCapability for GoogleMapsEnricher {
	async fn enrich(&self, venue: &Venue) -> Result<EnricherOutcome, EnricherError> {
		let api_key = std::env::var(GOOGLE_MAPS_API_KEY).map_err(|e| EnricherError::Provider(e.to_string()))?;
		let client = Client::try_new(api_key).map_err(|e| EnricherError::Provider(e.to_string()))?;

		let address = venue
			.address
			.clone()
			.unwrap_or_else(|| venue.name.clone());

		let geocode_res = client
			.geocoding()
			.with_address(address.as_str())
			.execute()
			.await
			.map_err(|e| EnricherError::Provider(e.to_string()))?;

		if let Some(err) = geocode_res.error_message {
			return Err(EnricherError::Provider(err));
		}
		if !matches!(geocode_res.status, google_maps::geocoding::Status::Ok) {
			return Err(EnricherError::NotFound);
		}
		let Some(result) = geocode_res.results.into_iter().next() else {
			return Err(EnricherError::NotFound);
		};

		let lat = result.geometry.location.lat.to_f64().ok_or(EnricherError::NotFound)?;
		let lng = result.geometry.location.lng.to_f64().ok_or(EnricherError::NotFound)?;

		Ok(EnricherOutcome {
			place_id: result.place_id,
			lat,
			lng,
			formatted_address: result.formatted_address,
			rating: None,
			price_level: None,
			opening_hours: None,
			phone: None,
			website: None,
			photo_urls: vec![],
		})
	}
}

#[cfg(test)]
pub struct StubEnricher {
	pub lat: f64,
	pub lng: f64,
	pub photo_url: Option<String>,
}

#[cfg(test)]
#[async_trait]
impl EnricherCapability for StubEnricher {
	async fn enrich(&self, _venue: &Venue) -> Result<EnricherOutcome, EnricherError> {
		Ok(EnricherOutcome {
			place_id: "stub-place-id".to_string(),
			lat: self.lat,
			lng: self.lng,
			formatted_address: "123 Stub St".to_string(),
			rating: Some(4.5),
			price_level: Some(2),
			opening_hours: None,
			phone: None,
			website: None,
			photo_urls: self.photo_url.clone().into_iter().collect(),
		})
	}
}
