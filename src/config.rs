use std::env;

// ============================================================================
// Application Configuration
// ============================================================================

/// Default maximum in-clause size for the collection batch loader.
pub const DEFAULT_BATCH_CHUNK_SIZE: usize = 100;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub batch_chunk_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("invalid BATCH_CHUNK_SIZE: {0:?} (must be a positive integer)")]
    InvalidChunkSize(String),
}

impl AppConfig {
    /// Read configuration from the environment. Fails before anything
    /// connects to storage.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;
        let batch_chunk_size = chunk_size_from(env::var("BATCH_CHUNK_SIZE").ok())?;

        Ok(Self {
            database_url,
            batch_chunk_size,
        })
    }
}

fn chunk_size_from(raw: Option<String>) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(DEFAULT_BATCH_CHUNK_SIZE),
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(parsed) if parsed >= 1 => Ok(parsed),
            _ => Err(ConfigError::InvalidChunkSize(raw)),
        },
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
