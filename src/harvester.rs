// Engine facade: one config and one store per session
//
// The ingestion adapter boundary lives here: callers hand over raw bodies
// tagged with a content-type hint, nothing else. Each call runs its whole
// parse → walk → insert sequence to completion before returning, so every
// ingestion is one atomic batch of inserts relative to any other.

use crate::config::HarvestConfig;
use crate::parser;
use crate::store::{SubscriptionId, Subscriber, TemplateRecord, TemplateStore};
use crate::traversal::Walker;
use serde_json::Value;
use tracing::debug;

pub struct Harvester {
    config: HarvestConfig,
    walker: Walker,
    store: TemplateStore,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        let walker = Walker::new(config.max_nodes);
        Self {
            config,
            walker,
            store: TemplateStore::new(),
        }
    }

    /// Ingestion adapter entry point. Non-JSON content types are ignored
    /// outright; everything else goes through the guarded parser. Returns
    /// whether a payload was actually walked.
    pub fn on_response_body(&mut self, body: &str, content_type: &str) -> bool {
        if !is_json_content_type(content_type) {
            return false;
        }
        match parser::try_parse(body, &self.config) {
            Some(value) => {
                self.walker.walk(&value, &mut self.store);
                true
            }
            None => {
                debug!("skipped body ({} bytes, {})", body.len(), content_type);
                false
            }
        }
    }

    /// Direct entry for values parsed elsewhere (the HAR source).
    pub fn ingest_value(&mut self, value: &Value) {
        self.walker.walk(value, &mut self.store);
    }

    pub fn snapshot(&self) -> Vec<TemplateRecord> {
        self.store.snapshot()
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.store.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }
}

/// JSON-family hints only: application/json, text/json, ...+json
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("json")
}
