//! The public MotoGP results API, as an alternative to scraping the site.

mod client;
mod models;

pub use client::PulseliveClient;
pub use models::*;
