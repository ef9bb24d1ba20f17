pub mod client;
pub mod error;
pub mod types;

pub use client::{OmdbClient, PlotLength};
pub use error::OmdbError;
