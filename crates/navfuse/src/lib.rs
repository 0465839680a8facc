#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use navfuse_core as common;

#[doc(inline)]
pub use navfuse_geodesy as geodesy;

#[doc(inline)]
pub use navfuse_io as io;

#[doc(inline)]
pub use navfuse_lie as lie;

#[doc(inline)]
pub use navfuse_linalg as linalg;
