//! JSON processor interface and ordered processor chains.
//!
//! A processor is a pure `Value -> Value` rewrite. Processors must accept any
//! well-formed JSON value and return shapes they do not understand unchanged;
//! there is no error path.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

/// A reversible, order-composable transform over a parsed JSON value.
pub trait JsonProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Rewrite `json`, returning the result.
    fn process_json(&self, json: Value) -> Value;
}

/// Processors applied strictly in registration order, each receiving the
/// previous one's output.
#[derive(Clone, Default)]
pub struct ProcessorChain {
    processors: Vec<Arc<dyn JsonProcessor>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processor to the end of the chain.
    pub fn push<P: JsonProcessor + 'static>(&mut self, processor: P) {
        self.processors.push(Arc::new(processor));
    }

    /// Append an already shared processor.
    pub fn push_shared(&mut self, processor: Arc<dyn JsonProcessor>) {
        self.processors.push(processor);
    }

    pub fn clear(&mut self) {
        self.processors.clear();
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn JsonProcessor>> {
        self.processors.iter()
    }

    /// Run `json` through every processor in order.
    pub fn apply(&self, json: Value) -> Value {
        if !self.processors.is_empty() {
            debug!(chain = ?self, "applying processors");
        }
        self.processors
            .iter()
            .fold(json, |acc, processor| processor.process_json(acc))
    }
}

impl Extend<Arc<dyn JsonProcessor>> for ProcessorChain {
    fn extend<I: IntoIterator<Item = Arc<dyn JsonProcessor>>>(&mut self, iter: I) {
        self.processors.extend(iter);
    }
}

impl FromIterator<Arc<dyn JsonProcessor>> for ProcessorChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn JsonProcessor>>>(iter: I) -> Self {
        Self {
            processors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.name()))
            .finish()
    }
}
