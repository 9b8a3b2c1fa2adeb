#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Per-type document encoders compiled from [`Describe`] descriptors.
//!
//! The first time an entity type is encoded, its type graph is walked once:
//! every field is classified (scalar, enum, entity, list or map), every
//! distinct shape gets exactly one named routine, and every enum gets one
//! shared [`EnumCodec`]. The resulting [`CompiledEncoder`] is cached and
//! reused for every later value of that type.
//!
//! ```
//! use docshape::Describe;
//! use docshape_format::Bson;
//!
//! #[derive(Describe)]
//! struct Order {
//!     #[docshape(id)]
//!     id: i64,
//!     total: f64,
//!     items: Vec<Item>,
//! }
//!
//! #[derive(Describe)]
//! struct Item {
//!     sku: String,
//!     qty: i32,
//! }
//!
//! let order = Order {
//!     id: 7,
//!     total: 42.5,
//!     items: vec![Item { sku: "A1".into(), qty: 2 }],
//! };
//! let doc = docshape_encoder::to_document(&order).unwrap();
//! assert_eq!(doc.keys().collect::<Vec<_>>(), ["_id", "total", "items"]);
//! assert_eq!(doc.get("total"), Some(&Bson::Double(42.5)));
//! ```
//!
//! Schema problems surface as a [`BuildError`] when the encoder is built,
//! never while encoding.

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod compiler;
mod enum_codec;
mod error;
mod exec;
mod options;
mod registry;
mod signature;
mod unit;

pub use docshape_core::Describe;
pub use enum_codec::{CodecHandle, EnumCodec};
pub use error::{BuildError, EncodeError, EnumCodecError, Error};
pub use options::{DEFAULT_MAX_DEPTH, EncoderOptions};
pub use registry::{EncoderRegistry, EntityEncoder};
pub use signature::ShapeSignature;
pub use unit::{CompiledEncoder, Routine};

use docshape_format::Document;

/// Typed encoder for `T` from the process-wide registry.
pub fn encoder_for<T: Describe>() -> Result<EntityEncoder<T>, BuildError> {
    EncoderRegistry::global().encoder_for::<T>()
}

/// Encodes `value` into an in-memory [`Document`].
pub fn to_document<T: Describe>(value: &T) -> Result<Document, Error> {
    Ok(encoder_for::<T>()?.to_document(value)?)
}

/// Encodes `value` as binary BSON.
pub fn to_bson_vec<T: Describe>(value: &T) -> Result<Vec<u8>, Error> {
    Ok(encoder_for::<T>()?.to_bson_vec(value)?)
}
