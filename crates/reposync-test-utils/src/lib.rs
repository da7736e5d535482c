//! Shared test utilities for the reposync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: checkout and remote fixtures at three realism levels
//! - [`tree`]: [`CheckoutTree`] builder for directory trees full of checkouts
//! - [`client`]: [`RecordingClient`], an in-memory version-control client

pub mod client;
pub mod git;
pub mod tree;

pub use client::RecordingClient;
pub use tree::CheckoutTree;
