//! Session-keyed instance cache for incremental rebuilds.
//!
//! A build host invokes the per-file callback many times per rebuild and has
//! no place to keep state between calls. This crate maps
//! `(host, session key)` to a long-lived instance so those calls share one
//! compiler. Each host gets its own key space, and the component that owns a
//! host tears its entries down explicitly when the host goes away.

#![warn(missing_docs)]

pub mod host;
pub mod instance;
pub mod key;

pub use host::HostId;
pub use instance::InstanceCache;
pub use key::{cache_name, CACHE_NAME_PREFIX};
