pub mod cli;
pub mod config;
pub mod db;
pub mod detector;
pub mod frames;
mod metrics;
pub mod server;
pub mod service;

pub use config::Opts;
pub use db::{DetectionRecord, DetectionStore, StoreError};
pub use detector::{Detection, Detector};
pub use service::DetectionService;
