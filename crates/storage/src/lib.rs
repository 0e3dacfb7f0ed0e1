pub mod dto;
pub mod error;
pub mod models;
pub mod repository;

pub use error::{Result, StorageError};
pub use repository::{EVENTS_TABLE, EventRepository, RIDERS_TABLE, RiderRepository};
