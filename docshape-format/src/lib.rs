#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Document writers for docshape.
//!
//! [`DocumentWriter`] is the sink compiled encoders write into. This crate
//! provides two implementations: [`DocumentBuilder`], which builds an
//! in-memory [`Document`], and [`BsonWriter`], which produces binary BSON.
//! The extended-JSON writer lives in `docshape-json`.
//!
//! All writers track their position with a [`WriterState`] and reject calls
//! that would produce a malformed document.

mod error;
pub use error::*;

mod writer;
pub use writer::*;

mod state;
pub use state::*;

mod bson;
pub use bson::*;

mod builder;
pub use builder::*;

mod binary;
pub use binary::*;
