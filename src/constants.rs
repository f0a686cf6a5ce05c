/// Highest reading progress value; reaching it marks an item completed.
pub const MAX_READING_PROGRESS: u8 = 100;

/// Format version written into export documents.
pub const EXPORT_FORMAT_VERSION: &str = "2.0";

/// Format version of documents produced by the browser client.
pub const LEGACY_FORMAT_VERSION: &str = "1.0";

/// Default cache lifetime for fetched content (minutes).
pub const DEFAULT_CONTENT_CACHE_TTL_MINUTES: i64 = 15;

/// Default age cutoff for the retention purge (days).
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Default content fetch timeout (seconds).
pub const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;

/// Average asteroid density used when none is supplied (kg/m³).
pub const DEFAULT_ASTEROID_DENSITY_KG_M3: f64 = 2600.0;

/// Population assumed near the impact site when none is supplied.
pub const DEFAULT_TARGET_POPULATION: u64 = 1_000_000;

/// Joules per megaton of TNT.
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Maximum accepted item id length.
pub const MAX_ITEM_ID_LEN: usize = 128;

/// Maximum accepted note length (bytes).
pub const MAX_NOTE_LEN: usize = 16 * 1024;
