// src/extractors/mod.rs
pub mod catalog;
pub mod document;
pub mod eps;
pub mod matcher;
pub mod ranker;
pub mod tables;
pub mod text;
pub mod value;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use catalog::{ExtractorConfig, Modifier, TermDescriptor};
#[allow(unused_imports)]
pub use eps::{
    EpsExtractor,
    Extraction,
    ExtractionStrategy,
};
pub use document::Filing;
#[allow(unused_imports)]
pub use tables::TableStrategy;
#[allow(unused_imports)]
pub use text::TextStrategy;
