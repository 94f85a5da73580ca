//! Output sinks for [`Scraper::print`](crate::Scraper::print).

use serde_json::{Map, Value};

/// Receives recipe records, one call per record.
pub trait RecipeSink {
    fn emit(&self, record: &Map<String, Value>);
}

impl<F> RecipeSink for F
where
    F: Fn(&Map<String, Value>),
{
    fn emit(&self, record: &Map<String, Value>) {
        self(record)
    }
}

/// Sink that logs each record as JSON through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    pub pretty: bool,
}

impl TracingSink {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl RecipeSink for TracingSink {
    fn emit(&self, record: &Map<String, Value>) {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(record)
        } else {
            serde_json::to_string(record)
        };
        match rendered {
            Ok(json) => tracing::info!(target: "larder::print", fields = record.len(), "{}", json),
            Err(e) => tracing::warn!(target: "larder::print", "Failed to render record: {}", e),
        }
    }
}
