#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Extended JSON output for docshape.
//!
//! [`JsonWriter`] is a [`DocumentWriter`](docshape_format::DocumentWriter)
//! rendering relaxed extended JSON. The `to_json_*` helpers encode an entity
//! with the process-wide encoder registry and render it in one go, which is
//! handy for logging documents in a readable form.
//!
//! ```
//! use docshape::Describe;
//!
//! #[derive(Describe)]
//! struct Item {
//!     #[docshape(id)]
//!     sku: String,
//!     qty: i32,
//! }
//!
//! let item = Item { sku: "A1".into(), qty: 2 };
//! assert_eq!(
//!     docshape_json::to_json_string(&item).unwrap(),
//!     r#"{"_id":"A1","qty":2}"#
//! );
//! ```

use std::io::Write;

use docshape_core::Describe;
use docshape_encoder::{EncodeError, Error, encoder_for};
use docshape_format::WriteError;

mod writer;
pub use writer::{JsonOptions, JsonWriter};

/// Encodes `value` as compact JSON.
pub fn to_json_string<T: Describe>(value: &T) -> Result<String, Error> {
    to_json_string_with_options(value, JsonOptions::default())
}

/// Encodes `value` as pretty-printed JSON.
pub fn to_json_string_pretty<T: Describe>(value: &T) -> Result<String, Error> {
    to_json_string_with_options(value, JsonOptions::default().pretty())
}

/// Encodes `value` as JSON with the given options.
pub fn to_json_string_with_options<T: Describe>(
    value: &T,
    options: JsonOptions,
) -> Result<String, Error> {
    let bytes = to_json_writer_with_options(Vec::new(), value, options)?;
    let json = String::from_utf8(bytes)
        .map_err(|err| EncodeError::Write(WriteError::custom(err)))?;
    Ok(json)
}

/// Encodes `value` as compact JSON into `out`, returning `out` once the
/// document is complete.
pub fn to_json_writer<W: Write, T: Describe>(out: W, value: &T) -> Result<W, Error> {
    to_json_writer_with_options(out, value, JsonOptions::default())
}

/// Encodes `value` as JSON into `out` with the given options.
pub fn to_json_writer_with_options<W: Write, T: Describe>(
    out: W,
    value: &T,
    options: JsonOptions,
) -> Result<W, Error> {
    let encoder = encoder_for::<T>()?;
    let mut writer = JsonWriter::with_options(out, options);
    encoder.encode(&mut writer, value)?;
    Ok(writer.finish()?)
}
