pub mod pulselive;

pub use pulselive::PulseliveClient;
