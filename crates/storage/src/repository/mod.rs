mod event;
mod rider;

pub use event::{EVENTS_TABLE, EventRepository};
pub use rider::{RIDERS_TABLE, RiderRepository};

use crate::error::{Result, StorageError};

fn ensure_table(requested: &str, expected: &'static str) -> Result<()> {
    if requested == expected {
        Ok(())
    } else {
        Err(StorageError::UnknownTable(requested.to_string()))
    }
}
