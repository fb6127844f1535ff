//! Shared test utilities for the static asset manager workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not each
//! rebuild their own library directories. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`tree`]: [`tree::LibraryTree`] builder for on-disk library directories

pub mod tree;
