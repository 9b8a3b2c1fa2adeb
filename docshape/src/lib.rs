#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Describe Rust types for document encoders.
//!
//! ```
//! use docshape::{Def, Describe};
//!
//! /// A line on an order.
//! #[derive(Describe)]
//! struct Item {
//!     sku: String,
//!     #[docshape(rename = "qty")]
//!     quantity: i32,
//! }
//!
//! let Def::Struct(item) = Item::SHAPE.def else { unreachable!() };
//! let names: Vec<_> = item.fields.iter().map(|f| f.wire_name()).collect();
//! assert_eq!(names, ["sku", "qty"]);
//! assert_eq!(Item::SHAPE.doc, [" A line on an order."]);
//! ```
//!
//! Encoding lives in `docshape-encoder`; writers in `docshape-format` and
//! `docshape-json`.

pub use docshape_core::*;

pub use docshape_macros::Describe;
