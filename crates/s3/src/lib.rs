//! s3cli-s3: S3 SDK adapter for the aws-s3 bucket client
//!
//! This crate provides the implementation of the ObjectStore trait
//! using the aws-sdk-s3 crate and its transfer manager. It is the only
//! crate that directly depends on the AWS SDK.

pub mod client;

pub use client::S3Client;
