pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod limits;
pub mod logging;
pub mod metrics;
pub mod photos;
pub mod program;
pub mod tracker;
pub mod transfer;

pub use error::TrackerError;
pub use tracker::Tracker;
