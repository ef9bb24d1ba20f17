//! Movie metadata lookup: the OMDb backend, a response cache, and the
//! shared movie types used across the workspace.

pub mod cache;
pub mod client;
pub mod omdb;
pub mod sort;
pub mod traits;

pub use client::MetadataClient;
pub use traits::{
    present, DetailOutcome, MediaKind, MetadataService, MovieDetail, MovieSummary,
    SearchOptions, SearchOutcome, SearchQuery, SortDirection, SortField, NOT_AVAILABLE,
};
