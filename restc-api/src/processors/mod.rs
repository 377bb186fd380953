//! Concrete JSON processors.

pub mod case;
pub mod date;

use std::sync::Arc;

use restc_core::config::ProcessorKind;

use crate::processor::JsonProcessor;

pub use case::{KeyCase, KeyCaseProcessor};
pub use date::{DateConventionProcessor, DateFormat};

/// Instantiate a processor named in the config file.
pub fn from_kind(kind: ProcessorKind) -> Arc<dyn JsonProcessor> {
    match kind {
        ProcessorKind::SnakeToCamel => Arc::new(KeyCaseProcessor::snake_to_camel()),
        ProcessorKind::CamelToSnake => Arc::new(KeyCaseProcessor::camel_to_snake()),
        ProcessorKind::SnakeToPascal => Arc::new(KeyCaseProcessor::snake_to_pascal()),
        ProcessorKind::PascalToSnake => Arc::new(KeyCaseProcessor::pascal_to_snake()),
        ProcessorKind::SnakeToKebab => Arc::new(KeyCaseProcessor::snake_to_kebab()),
        ProcessorKind::KebabToSnake => Arc::new(KeyCaseProcessor::kebab_to_snake()),
        ProcessorKind::Dates => Arc::new(DateConventionProcessor::default()),
    }
}
