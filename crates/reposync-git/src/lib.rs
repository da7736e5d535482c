//! Git access for reposync
//!
//! Two halves: [`metadata`] reads identity and activity information from a
//! checkout on disk through libgit2, and [`client`] drives the external `git`
//! executable for the operations that must behave exactly like the user's own
//! git (recursive clone, local config, remote reachability).

pub mod client;
pub mod error;
pub mod metadata;

pub use client::{GitCli, VcsClient};
pub use error::{Error, Result};
pub use metadata::{CheckoutMetadata, has_checkout_marker, last_ref_update, read_metadata};
