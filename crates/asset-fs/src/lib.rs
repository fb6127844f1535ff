//! Filesystem layer for the static asset manager
//!
//! Lists library directories the way they are published and computes the
//! signatures used as cache-busting URL segments.

pub mod checksum;
pub mod constants;
pub mod error;
pub mod ignore;
pub mod walk;

pub use checksum::{ContentHashSignature, MtimeSignature, SignatureKind, SignatureMethod};
pub use constants::{IGNORED_EXTENSIONS, VcsDir};
pub use error::{Error, Result};
pub use ignore::is_ignored;
pub use walk::list_directory;
