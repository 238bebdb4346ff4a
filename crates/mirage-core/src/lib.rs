//! Mirage Core - Core types for the Mirage client
//!
//! This crate provides the foundational types used throughout the client:
//! - Asset identity (128-bit IDs and asset categories)
//! - Request tags for correlating asset deliveries with callers

pub mod asset;

pub use asset::{AssetId, AssetIdError, AssetType, RequestTag};
