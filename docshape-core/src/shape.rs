use core::any::Any;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::{ConstTypeId, Def, ScalarType};

/// A type that can describe itself to a document encoder.
///
/// Implemented for scalars, `std` containers and jiff date/time types by this
/// crate; user entities and enums get an implementation from
/// `#[derive(Describe)]`.
pub trait Describe: 'static {
    /// The descriptor for this type.
    const SHAPE: &'static Shape;
}

/// Writes a type name, including generic arguments, into a formatter.
pub type TypeNameFn = fn(f: &mut fmt::Formatter<'_>) -> fmt::Result;

/// Schema for one type: its identity, its name and what it is made of.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Unique type identifier. Use this for type equality checks and hash map keys.
    pub id: ConstTypeId,

    /// Type name without generic parameters (e.g. `Vec`, not `Vec<String>`).
    pub type_identifier: &'static str,

    /// Full type name with generic arguments, when it differs from
    /// `type_identifier`.
    pub type_name: Option<TypeNameFn>,

    /// What kind of type this is and how to reach its parts.
    pub def: Def,

    /// Doc comments from the original type definition.
    pub doc: &'static [&'static str],
}

impl Shape {
    /// Start building a shape for `T`.
    pub const fn builder<T: 'static>(type_identifier: &'static str) -> ShapeBuilder {
        ShapeBuilder {
            id: ConstTypeId::of::<T>(),
            type_identifier,
            type_name: None,
            def: Def::Opaque,
            doc: &[],
        }
    }

    /// Returns true if this shape describes `T`.
    #[inline]
    pub fn is_type<T: 'static>(&self) -> bool {
        self.id == ConstTypeId::of::<T>()
    }

    /// Returns the scalar kind if this shape is a scalar.
    #[inline]
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self.def {
            Def::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Writes the full type name (with generic arguments).
    pub fn write_type_name(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name {
            Some(type_name) => type_name(f),
            None => f.write_str(self.type_identifier),
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_type_name(f)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type", &format_args!("{self}"))
            .field("def", &self.def)
            .finish()
    }
}

/// Const builder for [`Shape`].
#[derive(Clone, Copy)]
pub struct ShapeBuilder {
    id: ConstTypeId,
    type_identifier: &'static str,
    type_name: Option<TypeNameFn>,
    def: Def,
    doc: &'static [&'static str],
}

impl ShapeBuilder {
    /// Sets the definition.
    pub const fn def(mut self, def: Def) -> Self {
        self.def = def;
        self
    }

    /// Sets the function writing the full type name.
    pub const fn type_name(mut self, type_name: TypeNameFn) -> Self {
        self.type_name = Some(type_name);
        self
    }

    /// Sets the doc comments.
    pub const fn doc(mut self, doc: &'static [&'static str]) -> Self {
        self.doc = doc;
        self
    }

    /// Builds the shape.
    pub const fn build(self) -> Shape {
        Shape {
            id: self.id,
            type_identifier: self.type_identifier,
            type_name: self.type_name,
            def: self.def,
            doc: self.doc,
        }
    }
}

/// A value reached through a descriptor was not of the type the descriptor
/// promised.
///
/// This only happens with hand-written descriptors whose accessors disagree
/// with their shapes, or when a caller hands a value of the wrong type to an
/// accessor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrongShape {
    /// The shape the accessor expected.
    pub expected: &'static Shape,
}

impl WrongShape {
    /// Error for an accessor expecting `T`.
    pub fn of<T: Describe>() -> Self {
        Self { expected: T::SHAPE }
    }
}

impl fmt::Display for WrongShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected a value of type {}", self.expected)
    }
}

impl core::error::Error for WrongShape {}

/// Downcasts a type-erased value to `T`, reporting the expected shape on failure.
///
/// This is the building block for every accessor stored in descriptors.
#[inline]
pub fn peek<T: Describe>(value: &dyn Any) -> Result<&T, WrongShape> {
    value.downcast_ref::<T>().ok_or_else(WrongShape::of::<T>)
}
