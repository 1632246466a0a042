pub const LOG_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/logs");
pub const CRASH_LOG: &str = "crash.log";
pub const LATEST_LOG: &str = "latest.log";

/// Env var name holding the Google Maps API key used by the enricher capability.
pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
/// Env var name holding the summarizer LLM provider key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Max slots a single query may be decomposed into (§4.4).
pub const DEFAULT_MAX_SLOTS: usize = 3;
/// Static confidence floor for queries judged non-vague (§4.4).
pub const CONFIDENCE_FLOOR_DEFAULT: f64 = 0.7;
/// Confidence floor used for vague queries (≤3 tokens, no phrase match).
pub const CONFIDENCE_FLOOR_VAGUE: f64 = 0.4;
/// A query of this many tokens or fewer is a candidate for the vague floor.
pub const VAGUE_TOKEN_THRESHOLD: usize = 3;

/// Parse cache entry lifetime.
pub const PARSE_CACHE_TTL_SECONDS: i64 = 15 * 60;
/// Parse cache capacity before an LRU eviction sweep runs.
pub const PARSE_CACHE_CAPACITY: usize = 1000;
/// Fraction of the cache evicted, oldest-first, once capacity is exceeded.
pub const PARSE_CACHE_EVICT_FRACTION: f64 = 0.2;

/// Default rails target length per step, before diversification trims it.
pub const DEFAULT_RAIL_LIMIT: usize = 6;
/// MMR trade-off between relevance and diversity in rail composition (§4.6).
pub const MMR_LAMBDA: f64 = 0.3;
/// Distance (m) at which `geo_score` decays to one half (§4.5).
pub const GEO_SCORE_TAU_M: f64 = 500.0;

/// Default interval between derived-view refresh sweeps (§4.7).
pub const DEFAULT_REFRESH_INTERVAL_SECONDS: u64 = 300;
/// Cap on the linear backoff applied after a failed refresh iteration.
pub const REFRESH_BACKOFF_CAP_SECONDS: u64 = 3600;

/// Session profile time-to-live before lazy expiry on read (§4.8).
pub const SESSION_TTL_HOURS: i64 = 24;
/// Bound on the per-session signal ring buffer (§4.8).
pub const SESSION_SIGNAL_LOG_CAP: usize = 100;
/// Weight added to a tag's vibe-vector entry on `like`/`add_to_route`.
pub const VIBE_SIGNAL_WEIGHT: f64 = 0.1;
/// Novelty preference ceiling nudged toward on hidden-gem style signals.
pub const NOVELTY_PREFERENCE_CEILING: f64 = 0.8;
