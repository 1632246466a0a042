#![allow(unexpected_cfgs)]

mod config;
mod controllers;
mod db;
mod error;
mod global;
mod http_models;
mod ingestion;
mod log;
mod models;
mod ontology;
mod rails;
mod refresh;
mod retrieval;
mod session_store;
mod slotter;
mod sql_models;

#[cfg(not(tarpaulin_include))]
mod swagger;

use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use http::Method;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::controllers::AxumRouter;
use crate::ontology::Ontology;
use crate::rails::RailComposer;
use crate::refresh::{HealthFlag, RefreshScheduler};
use crate::retrieval::RetrievalEngine;
use crate::session_store::SessionStore;
use crate::slotter::{Slotter, SlotterConfig};

#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();
	log::init_panic_handler();
	log::init_logger();

	let config = Config::from_env();
	let pool = db::create_pool().await;

	let ontology = Arc::new(Ontology::load(ontology::seed_entries()).expect("built-in ontology failed validation"));

	let slotter_config = SlotterConfig {
		max_slots: config.flags.slotter_max_slots,
		min_confidence: config.flags.slotter_min_confidence,
		..SlotterConfig::default()
	};
	let slotter = Arc::new(Slotter::new(Arc::clone(&ontology), slotter_config));

	let engine = Arc::new(RetrievalEngine::new(pool.clone()));
	let composer = Arc::new(RailComposer::new(Arc::clone(&engine)));
	let sessions = Arc::new(SessionStore::new());
	let health = Arc::new(HealthFlag::new_healthy());

	let cors = CorsLayer::new()
		.allow_origin(Any)
		.allow_methods([Method::GET, Method::POST])
		.allow_headers(Any);

	let api_routes = AxumRouter::new()
		.nest("/places", controllers::places::places_routes())
		.nest("/parse", controllers::parse::parse_routes())
		.nest("/compose", controllers::rails::rails_routes())
		.nest("/rails", controllers::rails::rails_query_routes())
		.nest("/feedback", controllers::feedback::feedback_routes());
	let api_routes = AxumRouter::new().nest("/api", api_routes).nest("/health", controllers::health::health_routes());

	#[cfg(all(not(test), debug_assertions))]
	let api_routes = crate::swagger::merge_swagger(api_routes);

	let shutdown_token = CancellationToken::new();
	let scheduler = RefreshScheduler::new(pool.clone(), Arc::clone(&ontology), Arc::clone(&health), config.refresh_interval_secs);
	let scheduler_token = shutdown_token.clone();
	tokio::spawn(scheduler.run(scheduler_token));

	let cleanup_token = shutdown_token.clone();
	tokio::spawn(session_cleanup_loop(Arc::clone(&sessions), cleanup_token));

	let app = axum::Router::new()
		.merge(api_routes)
		.layer(Extension(pool.clone()))
		.layer(Extension(config.clone()))
		.layer(Extension(ontology))
		.layer(Extension(slotter))
		.layer(Extension(engine))
		.layer(Extension(composer))
		.layer(Extension(sessions))
		.layer(Extension(Arc::clone(&health)))
		.layer(cors);

	let addr: std::net::SocketAddr = config.bind_address.parse().expect("Invalid BIND_ADDRESS format");
	info!(%addr, "server starting");

	let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
	axum::serve(listener, app.into_make_service())
		.with_graceful_shutdown(async move {
			let _ = tokio::signal::ctrl_c().await;
			shutdown_token.cancel();
		})
		.await?;

	Ok(())
}

/// Periodic sweep of expired session profiles (§4.8), run alongside the
/// refresh scheduler rather than inline on every read.
#[cfg(not(tarpaulin_include))]
async fn session_cleanup_loop(sessions: Arc<SessionStore>, token: CancellationToken) {
	loop {
		tokio::select! {
			_ = token.cancelled() => return,
			_ = tokio::time::sleep(Duration::from_secs(3600)) => {}
		}
		let removed = sessions.cleanup_expired();
		if removed > 0 {
			info!(removed, "expired session profiles cleaned up");
		}
	}
}
