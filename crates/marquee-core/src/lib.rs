pub mod collection;
pub mod config;
pub mod error;
pub mod storage;
pub mod url_state;
pub mod view;
