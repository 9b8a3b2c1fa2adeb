#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
//! Type descriptors for docshape.
//!
//! Every type that can take part in a document implements [`Describe`], which
//! hands out a `'static` [`Shape`]: a name, a stable type identity and a
//! [`Def`] saying whether the type is a scalar, an entity (struct), an enum,
//! or a container of other shapes. Encoders walk shapes once and keep the
//! result; values are reached through the type-erased accessors stored in the
//! descriptors.
//!
//! Most users derive [`Describe`] through the `docshape` facade crate rather
//! than writing descriptors by hand.

mod bitflags;

mod typeid;
pub use typeid::*;

mod shape;
pub use shape::*;

mod def;
pub use def::*;

mod field;
pub use field::*;

mod scalar;
pub use scalar::*;

mod object_id;
pub use object_id::*;

// Descriptors for primitive and `std` types
mod impls_std;

// Descriptors for jiff date/time types
mod impls_jiff;

#[cfg(feature = "indexmap")]
mod impls_indexmap;
