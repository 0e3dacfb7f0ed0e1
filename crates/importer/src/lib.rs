pub mod archive;
pub mod class;
pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod traits;
pub mod validate;

pub use class::GpClass;
pub use config::{Config, FetchConfig, SiteConfig};
pub use error::{ImporterError, Result};
pub use fetch::{FetchBatch, FetchError, Fetcher, Page, RateLimiter, RetryPolicy};
pub use pipeline::{ClassReport, ClassStage, Pipeline};
pub use traits::{ArchiveStore, RecordBatch, RecordSink, Records};
pub use validate::{Entity, Rejection};

pub use storage::dto::{NewEvent, NewRider};
