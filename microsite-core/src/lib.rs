pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod html;
pub mod markdown;
pub mod orchestrator;
pub mod path;
pub mod scanner;
pub mod template;

// Re-export main types
pub use config::{ConfigError, IndexEntry, MarkdownConfig, PageIndex, ProjectConfig, RenderSettings};
pub use engine::{RenderEngine, RenderedSet};
pub use error::RenderError;
pub use events::{EventSink, MemorySink, RenderEvent, TracingSink};
pub use markdown::MarkdownEngine;
pub use orchestrator::{RenderOrchestrator, RenderReport};
pub use path::{RelativePath, SourceTree};
pub use scanner::PathScanner;
