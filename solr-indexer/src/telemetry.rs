//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::IndexingError;

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. With `json`
/// set, events are written as one JSON object per line.
pub fn init_tracing(json: bool) -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| IndexingError::tracing(e.to_string()))
}
