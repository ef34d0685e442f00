//! s3cli-core: Core library for the aws-s3 bucket client
//!
//! This crate provides the SDK-independent parts of the client:
//! - Error taxonomy
//! - Configuration file and settings resolution
//! - ObjectStore trait for bucket operations
//! - Listing pagination, lazy session construction and deadlines
//!
//! Nothing here depends on the AWS SDK, so command handlers can be tested
//! against an in-memory store.

pub mod config;
pub mod deadline;
pub mod error;
pub mod listing;
pub mod session;
pub mod settings;
pub mod traits;

pub use config::{Config, ConfigManager};
pub use deadline::Deadline;
pub use error::{Error, Result};
pub use listing::{ListPage, collect_keys};
pub use session::SessionCell;
pub use settings::{ClientConfig, FlagValues, Settings, StaticCredentials};
pub use traits::{ObjectBody, ObjectReader, ObjectStore, UploadOptions, UploadSource};
