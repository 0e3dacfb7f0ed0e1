mod event;
mod rider;

pub use event::Event;
pub use rider::Rider;
