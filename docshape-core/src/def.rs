use core::any::Any;
use core::fmt;

use crate::{Field, ScalarType, Shape, WrongShape};

/// The semantic definition of a shape: is it more like a scalar, an entity, a list?
#[derive(Clone, Copy)]
pub enum Def {
    /// Not describable for documents (e.g. `u64`, `char`, `()`).
    ///
    /// Such types can appear in descriptors, but encoders reject them.
    Opaque,

    /// A value written directly by the primitive writer.
    Scalar(ScalarType),

    /// A struct with named fields, written as a nested document.
    Struct(StructDef),

    /// A fieldless enum, written through its wire codes.
    Enum(EnumDef),

    /// `Option<T>`: absent values are written as an explicit null.
    Option(OptionDef),

    /// Ordered list of homogeneous values, e.g. `Vec<T>`.
    List(ListDef),

    /// Map from keys to homogeneous values, e.g. `BTreeMap<String, T>`.
    Map(MapDef),

    /// Unique set of homogeneous values, e.g. `HashSet<T>`.
    Set(SetDef),

    /// Owning pointer to a single value, e.g. `Box<T>` or `Arc<T>`.
    Pointer(PointerDef),
}

impl fmt::Debug for Def {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Def::Opaque => write!(f, "Opaque"),
            Def::Scalar(scalar) => write!(f, "Scalar({scalar:?})"),
            Def::Struct(struct_def) => write!(f, "Struct({} fields)", struct_def.fields.len()),
            Def::Enum(enum_def) => write!(f, "Enum({} variants)", enum_def.variants.len()),
            Def::Option(option_def) => write!(f, "Option<{}>", option_def.t),
            Def::List(list_def) => write!(f, "List<{}>", list_def.t),
            Def::Map(map_def) => write!(f, "Map<{}, {}>", map_def.k, map_def.v),
            Def::Set(set_def) => write!(f, "Set<{}>", set_def.t),
            Def::Pointer(pointer_def) => write!(f, "Pointer<{}>", pointer_def.pointee),
        }
    }
}

/// Fields of a struct, in declaration order.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// All fields, in declaration order. Encoders write them in this order.
    pub fields: &'static [Field],
}

impl StructDef {
    /// Construct a `StructDef` from its fields.
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }
}

/// Returns the index (in [`EnumDef::variants`]) of the active variant.
pub type VariantIndexFn = fn(value: &dyn Any) -> Result<usize, WrongShape>;

/// Variants of a fieldless enum.
#[derive(Clone, Copy, Debug)]
pub struct EnumDef {
    /// All variants, in declaration order.
    pub variants: &'static [Variant],

    /// Finds which variant a value is.
    pub variant_index: VariantIndexFn,
}

impl EnumDef {
    /// Construct an `EnumDef` from its variants and index function.
    pub const fn new(variants: &'static [Variant], variant_index: VariantIndexFn) -> Self {
        Self {
            variants,
            variant_index,
        }
    }
}

/// Describes a variant of a fieldless enum.
#[derive(Clone, Copy, Debug)]
pub struct Variant {
    /// Name of the variant, e.g. `Foo` for `enum FooBar { Foo, Bar }`
    pub name: &'static str,

    /// Wire code set by `#[docshape(rename = "..")]` or a container-level
    /// `rename_all`.
    pub rename: Option<&'static str>,

    /// Doc comment for the variant
    pub doc: &'static [&'static str],
}

impl Variant {
    /// A variant with no rename and no docs.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            rename: None,
            doc: &[],
        }
    }

    /// Sets the wire code.
    pub const fn rename(mut self, rename: &'static str) -> Self {
        self.rename = Some(rename);
        self
    }

    /// Sets the doc comments.
    pub const fn doc(mut self, doc: &'static [&'static str]) -> Self {
        self.doc = doc;
        self
    }

    /// The code this variant is written as: `rename` if set, otherwise the name.
    #[inline]
    pub fn wire_code(&self) -> &'static str {
        self.rename.unwrap_or(self.name)
    }
}

/// Returns the inner value of an option, or `None`.
pub type OptionGetFn = for<'a> fn(value: &'a dyn Any) -> Result<Option<&'a dyn Any>, WrongShape>;

/// Describes an `Option<T>`.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// shape of the inner type
    pub t: &'static Shape,

    /// Reaches the inner value.
    pub get: OptionGetFn,
}

impl OptionDef {
    /// Construct an `OptionDef`.
    pub const fn new(t: &'static Shape, get: OptionGetFn) -> Self {
        Self { t, get }
    }
}

/// Iterator over the items of a list.
pub type ListIter<'a> = Box<dyn Iterator<Item = &'a dyn Any> + 'a>;

/// Creates an iterator over the items of a list.
pub type ListIterFn = for<'a> fn(value: &'a dyn Any) -> Result<ListIter<'a>, WrongShape>;

/// Returns the number of items in a collection.
pub type LenFn = fn(value: &dyn Any) -> Result<usize, WrongShape>;

/// Describes an ordered list, e.g. `Vec<T>`.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// shape of the items in the list
    pub t: &'static Shape,

    /// Iterates the items in order.
    pub iter: ListIterFn,

    /// Number of items.
    pub len: LenFn,
}

impl ListDef {
    /// Construct a `ListDef`.
    pub const fn new(t: &'static Shape, iter: ListIterFn, len: LenFn) -> Self {
        Self { t, iter, len }
    }
}

/// Iterator over the entries of a map.
pub type MapIter<'a> = Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>;

/// Creates an iterator over the entries of a map.
pub type MapIterFn = for<'a> fn(value: &'a dyn Any) -> Result<MapIter<'a>, WrongShape>;

/// Describes a map, e.g. `HashMap<K, V>`.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// shape of the keys in the map
    pub k: &'static Shape,

    /// shape of the values in the map
    pub v: &'static Shape,

    /// Iterates the entries, in the map's own order.
    pub iter: MapIterFn,

    /// Number of entries.
    pub len: LenFn,
}

impl MapDef {
    /// Construct a `MapDef`.
    pub const fn new(k: &'static Shape, v: &'static Shape, iter: MapIterFn, len: LenFn) -> Self {
        Self { k, v, iter, len }
    }
}

/// Describes a set, e.g. `BTreeSet<T>`.
#[derive(Clone, Copy, Debug)]
pub struct SetDef {
    /// shape of the items in the set
    pub t: &'static Shape,
}

impl SetDef {
    /// Construct a `SetDef`.
    pub const fn new(t: &'static Shape) -> Self {
        Self { t }
    }
}

/// Returns the value behind a pointer.
pub type DerefFn = for<'a> fn(value: &'a dyn Any) -> Result<&'a dyn Any, WrongShape>;

/// Describes an owning pointer, e.g. `Box<T>`.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// shape of the pointee
    pub pointee: &'static Shape,

    /// Reaches the pointee.
    pub deref: DerefFn,
}

impl PointerDef {
    /// Construct a `PointerDef`.
    pub const fn new(pointee: &'static Shape, deref: DerefFn) -> Self {
        Self { pointee, deref }
    }
}
