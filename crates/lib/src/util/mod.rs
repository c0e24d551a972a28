//! Shared utilities.
//!
//! Common utilities used across the crate including hashing and document loading.

pub mod document;
pub mod hash;
