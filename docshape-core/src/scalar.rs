//! Scalar type identification for shapes.

/// All scalar types a document encoder writes directly.
///
/// Integer types up to 32 bits (and `u16`/`u8`) are written as 32-bit
/// integers; `u32` and `i64` as 64-bit integers; both float types as doubles.
///
/// ```
/// use docshape_core::{Describe, ScalarType};
///
/// assert_eq!(i32::SHAPE.scalar_type(), Some(ScalarType::I32));
/// assert_eq!(String::SHAPE.scalar_type(), Some(ScalarType::String));
/// assert_eq!(u64::SHAPE.scalar_type(), None);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ScalarType {
    /// `alloc::string::String`.
    String,
    /// `&'static str`.
    Str,
    /// Primitive type `bool`.
    Bool,
    /// Primitive type `i8`.
    I8,
    /// Primitive type `i16`.
    I16,
    /// Primitive type `i32`.
    I32,
    /// Primitive type `u8`.
    U8,
    /// Primitive type `u16`.
    U16,
    /// Primitive type `u32`.
    U32,
    /// Primitive type `i64`.
    I64,
    /// Primitive type `f32`.
    F32,
    /// Primitive type `f64`.
    F64,
    /// `jiff::civil::Date`, a calendar date without a time zone.
    Date,
    /// `jiff::civil::DateTime`, a wall-clock time without a time zone.
    DateTime,
    /// `jiff::Timestamp`, an instant in UTC.
    Timestamp,
    /// `jiff::Zoned`, an instant with its time zone.
    Zoned,
    /// [`ObjectId`](crate::ObjectId), the opaque document identifier.
    ObjectId,
}

impl ScalarType {
    /// Returns true for the civil date/time kinds, which need a time zone to
    /// become an instant.
    pub const fn is_civil(self) -> bool {
        matches!(self, ScalarType::Date | ScalarType::DateTime)
    }

    /// Returns true for string kinds.
    pub const fn is_string(self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Str)
    }
}
