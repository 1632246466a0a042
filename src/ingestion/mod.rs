/*
 * src/ingestion/mod.rs
 *
 * File for the Ingestion Pipeline (C3)
 *
 * Purpose:
 *   Progress a venue through NEW -> SUMMARIZED -> ENRICHED -> PUBLISHED
 *   (or NEEDS_REVISION/FAILED). Each step is a pure function of
 *   (record, capabilities) -> patch + events; state changes occur in one
 *   transaction per step (§4.3). Provider exceptions never reach the HTTP
 *   layer directly (§7) — they are converted into diagnostics on the
 *   record here.
 */

pub mod editor;
pub mod enricher;
pub mod publisher;
pub mod summarizer;

use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::error::{ApiResult, PrivateError, PublicError};
use crate::models::venue::{Venue, VenueStatus};
use editor::Editor;
use enricher::{EnricherCapability, EnricherOutcome};
use publisher::Publisher;
use summarizer::{SummarizerCapability, SummarizerOutcome};

const MAX_SUMMARIZER_ATTEMPTS: i32 = 3;

pub struct IngestionPipeline<S: SummarizerCapability, E: EnricherCapability> {
	pool: PgPool,
	summarizer: S,
	enricher: E,
	editor: Editor,
	publisher: Publisher,
}

impl<S: SummarizerCapability, E: EnricherCapability> IngestionPipeline<S, E> {
	pub fn new(pool: PgPool, summarizer: S, enricher: E) -> Self {
		Self {
			pool,
			summarizer,
			enricher,
			editor: Editor::default(),
			publisher: Publisher::default(),
		}
	}

	/// Loads the record, advances it through whichever step its current
	/// status implies, and persists the result transactionally. Replayable:
	/// the patch is always computed from the current record (§4.3).
	pub async fn advance(&self, venue_id: i64) -> ApiResult<Venue> {
		let venue = self.load(venue_id).await?;
		match venue.status {
			VenueStatus::New => self.run_summarizer(venue).await,
			VenueStatus::Summarized => self.run_enricher(venue).await,
			VenueStatus::Enriched | VenueStatus::NeedsRevision => self.run_editor(venue).await,
			other => {
				warn!(venue_id, ?other, "advance called on a terminal or non-advanceable status");
				Ok(venue)
			}
		}
	}

	async fn load(&self, venue_id: i64) -> ApiResult<Venue> {
		let row = sqlx::query_as::<_, crate::sql_models::venue::VenueRow>("SELECT * FROM venues WHERE id = $1")
			.bind(venue_id)
			.fetch_optional(&self.pool)
			.await?
			.ok_or_else(|| PublicError::NotFound(format!("venue {venue_id}")))?;
		Ok(row.into())
	}

	async fn run_summarizer(&self, mut venue: Venue) -> ApiResult<Venue> {
		if venue.attempts.summarizer >= MAX_SUMMARIZER_ATTEMPTS {
			venue.status = VenueStatus::Failed;
			venue.last_error = Some("NO_SUMMARY: attempts exhausted".to_string());
			self.persist(&venue, "summarizer", "error", "NO_SUMMARY", None).await?;
			return Ok(venue);
		}

		venue.attempts.summarizer += 1;
		match self.summarizer.summarize(&venue).await {
			Ok(SummarizerOutcome { summary, tags, signals }) => {
				venue.summary = Some(summary);
				venue.tags = tags;
				for (key, value) in signals {
					venue.signals.insert(key, value);
				}
				venue.status = VenueStatus::Summarized;
				self.persist(&venue, "summarizer", "info", "SUMMARIZED", None).await?;
				info!(venue_id = venue.id, "summarizer advanced venue to SUMMARIZED");
			}
			Err(reason) => {
				error!(venue_id = venue.id, reason, "summarizer failed");
				if venue.attempts.summarizer >= MAX_SUMMARIZER_ATTEMPTS {
					venue.status = VenueStatus::Failed;
				}
				venue.last_error = Some(format!("NO_SUMMARY: {reason}"));
				self.persist(&venue, "summarizer", "error", "NO_SUMMARY", Some(reason)).await?;
			}
		}
		Ok(venue)
	}

	async fn run_enricher(&self, mut venue: Venue) -> ApiResult<Venue> {
		venue.attempts.enricher += 1;
		match self.enricher.enrich(&venue).await {
			Ok(EnricherOutcome {
				place_id,
				lat,
				lng,
				formatted_address,
				rating,
				price_level,
				opening_hours,
				phone,
				website,
				photo_urls,
			}) => {
				if !crate::models::venue::valid_coords(lat, lng) {
					return Err(PublicError::InvalidCoords(format!("enricher returned ({lat}, {lng})")).into());
				}
				venue.place_id = Some(place_id);
				venue.lat = Some(lat);
				venue.lng = Some(lng);
				venue.address = Some(formatted_address);
				venue.rating = rating;
				venue.price_level = price_level;
				venue.opening_hours = opening_hours;
				venue.phone = phone;
				venue.website = website;
				venue.picture_url = photo_urls.into_iter().next();
				venue.status = VenueStatus::Enriched;
				self.persist(&venue, "enricher", "info", "ENRICHED", None).await?;
			}
			Err(enricher::EnricherError::NotFound) => {
				venue.status = VenueStatus::NeedsRevision;
				venue.last_error = Some("NOT_FOUND".to_string());
				self.persist(&venue, "enricher", "warn", "NOT_FOUND", None).await?;
			}
			Err(enricher::EnricherError::Provider(reason)) => {
				venue.last_error = Some(format!("PROVIDER_ERROR: {reason}"));
				self.persist(&venue, "enricher", "error", "PROVIDER_ERROR", Some(reason)).await?;
				return Err(PrivateError::ProviderError("enricher provider call failed".to_string()).into());
			}
		}
		Ok(venue)
	}

	async fn run_editor(&self, mut venue: Venue) -> ApiResult<Venue> {
		venue.attempts.editor_cycles += 1;
		let verdict = self.editor.review(&venue);
		venue.quality_flags = verdict.quality_flags;

		if !verdict.issues.is_empty() {
			venue.status = VenueStatus::NeedsRevision;
			venue.last_error = Some(verdict.issues.join("; "));
			self.persist(&venue, "editor", "warn", "NEEDS_REVISION", Some(verdict.issues.join("; "))).await?;
			return Ok(venue);
		}

		let published = self.publisher.publish(venue);
		self.persist(&published, "publisher", "info", "PUBLISHED", None).await?;
		Ok(published)
	}

	/// One transaction per step (§4.3): persists the computed patch plus
	/// an append-only event row.
	async fn persist(&self, venue: &Venue, agent: &str, level: &str, code: &str, note: Option<String>) -> ApiResult<()> {
		let mut tx = self.pool.begin().await?;

		let signals = serde_json::to_value(&venue.signals).unwrap_or_default();
		let attempts = serde_json::to_value(&venue.attempts).unwrap_or_default();
		let quality_flags = serde_json::to_value(&venue.quality_flags).unwrap_or_default();
		let tags = venue.tags.join(",");

		sqlx::query(
			"UPDATE venues SET \
			 summary = $1, tags = $2, signals = $3, status = $4, attempts = $5, \
			 quality_flags = $6, last_error = $7, lat = $8, lng = $9, address = $10, \
			 rating = $11, price_level = $12, opening_hours = $13, phone = $14, \
			 website = $15, picture_url = $16, place_id = $17, published_at = $18, \
			 updated_at = now() \
			 WHERE id = $19",
		)
		.bind(&venue.summary)
		.bind(&tags)
		.bind(&signals)
		.bind(venue.status)
		.bind(&attempts)
		.bind(&quality_flags)
		.bind(&venue.last_error)
		.bind(venue.lat)
		.bind(venue.lng)
		.bind(&venue.address)
		.bind(venue.rating)
		.bind(venue.price_level)
		.bind(&venue.opening_hours)
		.bind(&venue.phone)
		.bind(&venue.website)
		.bind(&venue.picture_url)
		.bind(&venue.place_id)
		.bind(venue.published_at)
		.bind(venue.id)
		.execute(&mut *tx)
		.await?;

		sqlx::query("INSERT INTO venue_events (venue_id, agent, level, code, note, ts) VALUES ($1, $2, $3, $4, $5, now())")
			.bind(venue.id)
			.bind(agent)
			.bind(level)
			.bind(code)
			.bind(&note)
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::create_test_pool;
	use enricher::StubEnricher;
	use summarizer::StubSummarizer;

	async fn insert_new_venue(pool: &PgPool, name: &str) -> i64 {
		let row: (i64,) = sqlx::query_as(
			"INSERT INTO venues (name, description, status) VALUES ($1, 'a fine place to be', 'NEW') RETURNING id",
		)
		.bind(name)
		.fetch_one(pool)
		.await
		.unwrap();
		row.0
	}

	async fn load_status(pool: &PgPool, id: i64) -> VenueStatus {
		let row: (VenueStatus,) = sqlx::query_as("SELECT status FROM venues WHERE id = $1").bind(id).fetch_one(pool).await.unwrap();
		row.0
	}

	/// §4.3: a venue advances NEW -> SUMMARIZED -> ENRICHED -> PUBLISHED
	/// across four `advance` calls, with an event row per step.
	#[tokio::test]
	async fn advance_drives_a_venue_through_the_full_lifecycle() {
		let pool = create_test_pool().await;
		let venue_id = insert_new_venue(&pool, "Lifecycle Test Venue").await;

		let pipeline = IngestionPipeline::new(
			pool.clone(),
			StubSummarizer {
				summary: "A lovely spot with great ambience and friendly staff all night long".to_string(),
				tags: vec!["chill".to_string(), "rooftop".to_string(), "cocktail".to_string()],
			},
			StubEnricher { lat: 13.75, lng: 100.50, photo_url: Some("https://example.com/p.jpg".to_string()) },
		);

		let venue = pipeline.advance(venue_id).await.unwrap();
		assert_eq!(venue.status, VenueStatus::Summarized);

		let venue = pipeline.advance(venue_id).await.unwrap();
		assert_eq!(venue.status, VenueStatus::Enriched);

		let venue = pipeline.advance(venue_id).await.unwrap();
		assert_eq!(venue.status, VenueStatus::Published);
		assert!(venue.published_at.is_some());
		assert!(venue.satisfies_publish_invariant());

		assert_eq!(load_status(&pool, venue_id).await, VenueStatus::Published);

		let event_count: (i64,) = sqlx::query_as("SELECT count(*) FROM venue_events WHERE venue_id = $1")
			.bind(venue_id)
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(event_count.0, 3);
	}

	/// §4.3: a summarizer failure is recorded as a diagnostic rather than
	/// surfaced as an API error, and the venue stays advanceable until
	/// attempts are exhausted.
	#[tokio::test]
	async fn summarizer_failure_records_diagnostic_without_failing_the_call() {
		struct FailingSummarizer;
		#[async_trait::async_trait]
		impl summarizer::SummarizerCapability for FailingSummarizer {
			async fn summarize(&self, _venue: &Venue) -> Result<SummarizerOutcome, String> {
				Err("upstream timeout".to_string())
			}
		}

		let pool = create_test_pool().await;
		let venue_id = insert_new_venue(&pool, "Failing Summarizer Venue").await;
		let pipeline = IngestionPipeline::new(pool.clone(), FailingSummarizer, StubEnricher { lat: 1.0, lng: 1.0, photo_url: None });

		let venue = pipeline.advance(venue_id).await.unwrap();
		assert_eq!(venue.status, VenueStatus::New);
		assert!(venue.last_error.as_deref().unwrap().contains("NO_SUMMARY"));
	}
}
