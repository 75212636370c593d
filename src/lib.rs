pub mod analyzer;
pub mod collector;
pub mod http;
pub mod pipeline;
pub mod strategy;

pub use collector::{DataCollector, FetchConfig, FetchError};
pub use pipeline::{Pipeline, PipelineReport};
