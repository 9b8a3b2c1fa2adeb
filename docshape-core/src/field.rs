use core::any::Any;

use crate::{Shape, WrongShape};

/// Wire name every identifier field is written under.
pub const ID_WIRE_NAME: &str = "_id";

crate::bitflags! {
    /// Bit flags for field-level attributes.
    pub struct FieldFlags: u8 {
        /// The entity's identifier, written as [`ID_WIRE_NAME`].
        /// Set by `#[docshape(id)]`.
        const IDENTIFIER = 1 << 0;
    }
}

/// Reaches a field's value from its owning struct.
pub type FieldGetFn = for<'a> fn(owner: &'a dyn Any) -> Result<&'a dyn Any, WrongShape>;

/// Describes a named field in a struct.
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// Rust name of the field.
    pub name: &'static str,

    /// Wire name set by `#[docshape(rename = "..")]` or a container-level
    /// `rename_all`.
    pub rename: Option<&'static str>,

    /// shape of the field's type
    ///
    /// the layer of indirection allows for cyclic type definitions
    pub shape: fn() -> &'static Shape,

    /// attribute flags
    pub flags: FieldFlags,

    /// Reaches the field's value.
    pub get: FieldGetFn,

    /// doc comments
    pub doc: &'static [&'static str],
}

impl Field {
    /// A field with no rename, no flags and no docs.
    pub const fn new(name: &'static str, shape: fn() -> &'static Shape, get: FieldGetFn) -> Self {
        Self {
            name,
            rename: None,
            shape,
            flags: FieldFlags::empty(),
            get,
            doc: &[],
        }
    }

    /// Sets the wire name.
    pub const fn rename(mut self, rename: &'static str) -> Self {
        self.rename = Some(rename);
        self
    }

    /// Sets the attribute flags.
    pub const fn flags(mut self, flags: FieldFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the doc comments.
    pub const fn doc(mut self, doc: &'static [&'static str]) -> Self {
        self.doc = doc;
        self
    }

    /// Returns the shape of the field's type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Returns true for the field marked `#[docshape(id)]`.
    #[inline]
    pub fn is_identifier(&self) -> bool {
        self.flags.contains(FieldFlags::IDENTIFIER)
    }

    /// Name this field is written under.
    ///
    /// The identifier always maps to [`ID_WIRE_NAME`], whatever its rename;
    /// other fields use their rename, or their Rust name.
    #[inline]
    pub fn wire_name(&self) -> &'static str {
        if self.is_identifier() {
            ID_WIRE_NAME
        } else {
            self.rename.unwrap_or(self.name)
        }
    }
}
