pub mod event;
pub mod rider;

pub use event::NewEvent;
pub use rider::NewRider;
