//! Object store adapter.
//!
//! This crate provides:
//! - A typed facade (`ObjectStore`) over an S3-compatible bucket: put/get/head/delete/list
//! - The key-layout contract every stage writes/reads through (`keys`)

pub mod client;
pub mod error;
pub mod keys;

pub use client::{
    ListQuery, ListResult, ObjectHead, ObjectStore, ObjectStoreConfig, ObjectSummary, PutOptions,
    StoredObject,
};
pub use error::{StorageError, StorageResult};
