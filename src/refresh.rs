/*
 * src/refresh.rs
 *
 * File for the Refresh Scheduler (C7)
 *
 * Purpose:
 *   A single background loop on a fixed cadence that refreshes the
 *   derived search view atomically, updates a heartbeat record, and
 *   re-runs ontology validation (§4.7). Cancellable on shutdown via a
 *   `CancellationToken`; must not hold an open transaction across sleeps
 *   (DESIGN NOTES §9).
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::global::REFRESH_BACKOFF_CAP_SECONDS;
use crate::ontology::Ontology;

#[derive(Default)]
pub struct HealthFlag(AtomicBool);

impl HealthFlag {
	pub fn new_healthy() -> Self {
		Self(AtomicBool::new(true))
	}

	pub fn is_healthy(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}

	pub fn set(&self, healthy: bool) {
		self.0.store(healthy, Ordering::Relaxed);
	}
}

#[derive(Debug)]
enum RefreshError {
	Db(sqlx::Error),
	OntologyRegression(String),
}

impl std::fmt::Display for RefreshError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RefreshError::Db(err) => write!(f, "{err}"),
			RefreshError::OntologyRegression(err) => write!(f, "ontology validation regressed: {err}"),
		}
	}
}

impl From<sqlx::Error> for RefreshError {
	fn from(err: sqlx::Error) -> Self {
		RefreshError::Db(err)
	}
}

pub struct RefreshScheduler {
	pool: PgPool,
	ontology: Arc<Ontology>,
	health: Arc<HealthFlag>,
	interval: Duration,
}

impl RefreshScheduler {
	pub fn new(pool: PgPool, ontology: Arc<Ontology>, health: Arc<HealthFlag>, interval_secs: u64) -> Self {
		Self {
			pool,
			ontology,
			health,
			interval: Duration::from_secs(interval_secs),
		}
	}

	/// Runs until `token` is cancelled. Failures in one iteration never
	/// abort the loop; backoff after a failure is linear with a cap.
	pub async fn run(self, token: CancellationToken) {
		let mut consecutive_failures: u32 = 0;
		loop {
			tokio::select! {
				_ = token.cancelled() => {
					info!("refresh scheduler received shutdown signal");
					return;
				}
				_ = sleep(self.interval) => {}
			}

			match self.refresh_once().await {
				Ok(()) => {
					consecutive_failures = 0;
					self.health.set(true);
				}
				Err(err) => {
					consecutive_failures += 1;
					error!(error = %err, consecutive_failures, "refresh iteration failed");
					self.health.set(false);
					let backoff = Duration::from_secs(
						(consecutive_failures as u64 * self.interval.as_secs().max(1)).min(REFRESH_BACKOFF_CAP_SECONDS),
					);
					tokio::select! {
						_ = token.cancelled() => return,
						_ = sleep(backoff) => {}
					}
				}
			}
		}
	}

	async fn refresh_once(&self) -> Result<(), RefreshError> {
		sqlx::query("REFRESH MATERIALIZED VIEW CONCURRENTLY venue_search_view")
			.execute(&self.pool)
			.await?;

		sqlx::query(
			"INSERT INTO search_view_heartbeat (view_name, refreshed_at) VALUES ($1, now()) \
			 ON CONFLICT (view_name) DO UPDATE SET refreshed_at = now()",
		)
		.bind("venue_search_view")
		.execute(&self.pool)
		.await?;

		self.ontology.validate().map_err(|err| RefreshError::OntologyRegression(err.to_string()))?;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn health_flag_defaults_unhealthy_but_new_healthy_starts_true() {
		assert!(!HealthFlag::default().is_healthy());
		assert!(HealthFlag::new_healthy().is_healthy());
	}

	#[test]
	fn health_flag_can_flip_on_regression() {
		let flag = HealthFlag::new_healthy();
		flag.set(false);
		assert!(!flag.is_healthy());
	}
}
