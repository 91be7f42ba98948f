//! API token credentials
//!
//! The provider token lives in a single-line file owned by the invoking
//! user. This module reads it, bootstraps it, and inspects its ownership
//! and mode.
//!
//! - [`TokenFile`]: read / init / permission check
//! - [`PermissionWarning`]: advisory findings, never errors

pub mod token_file;

pub use token_file::{PermissionWarning, TokenFile};
