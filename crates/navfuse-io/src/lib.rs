#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Text log parsing and callback dispatch.
pub mod txt;
