pub mod app;
pub mod decode;
pub mod error;
pub mod index;
pub mod logging;
pub mod metrics;
pub mod schema;
pub mod skeleton;
pub mod xml;

pub use app::{AnalyzeConfig, RunSummary, analyze};
pub use error::Result;
