use core::fmt;

use docshape_core::Shape;

/// Identifies one compilable routine within a unit.
///
/// Signatures compare and hash by the identity of the shapes they embed. A
/// list or map signature is keyed by its element (or value) shape, which
/// includes that shape's nullability: `Vec<Item>` and `Vec<Option<Item>>`
/// get distinct routines, while a `Vec<Item>` field and an
/// `Option<Vec<Item>>` field share one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ShapeSignature {
    /// A struct written as a document.
    Entity(&'static Shape),
    /// An array of elements of the given shape.
    ListOf(&'static Shape),
    /// A string-keyed document whose values have the given shape.
    MapOf(&'static Shape),
}

impl ShapeSignature {
    /// The entity, element or value shape.
    pub fn shape(&self) -> &'static Shape {
        match *self {
            ShapeSignature::Entity(shape)
            | ShapeSignature::ListOf(shape)
            | ShapeSignature::MapOf(shape) => shape,
        }
    }

    /// Prefix of routine names generated for this signature.
    pub(crate) fn routine_prefix(&self) -> String {
        let name = snake_type_name(self.shape());
        match self {
            ShapeSignature::Entity(_) => format!("encode_{name}"),
            ShapeSignature::ListOf(_) => format!("encode_list_{name}"),
            ShapeSignature::MapOf(_) => format!("encode_map_{name}"),
        }
    }
}

impl fmt::Display for ShapeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeSignature::Entity(shape) => write!(f, "Entity({shape})"),
            ShapeSignature::ListOf(shape) => write!(f, "ListOf({shape})"),
            ShapeSignature::MapOf(shape) => write!(f, "MapOf(String, {shape})"),
        }
    }
}

/// Renders a shape's full type name as a snake_case identifier fragment,
/// e.g. `LineItem` as `line_item` and `Option<Vec<Item>>` as
/// `option_vec_item`.
pub(crate) fn snake_type_name(shape: &Shape) -> String {
    let full = shape.to_string();
    let mut out = String::with_capacity(full.len() + 4);
    let mut previous: Option<char> = None;
    for c in full.chars() {
        if c.is_alphanumeric() {
            let boundary = c.is_uppercase()
                && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit());
            if boundary || (previous.is_none() && !out.is_empty()) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
            previous = Some(c);
        } else {
            previous = None;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use docshape_core::Describe;

    use super::*;

    #[test]
    fn snake_names_flatten_generics() {
        assert_eq!(snake_type_name(String::SHAPE), "string");
        assert_eq!(snake_type_name(Option::<Vec<i32>>::SHAPE), "option_vec_i32");
        assert_eq!(
            snake_type_name(BTreeMap::<String, f64>::SHAPE),
            "btree_map_string_f64"
        );
        assert_eq!(snake_type_name(<&'static str>::SHAPE), "str");
    }

    #[test]
    fn signatures_compare_by_shape_identity() {
        assert_eq!(
            ShapeSignature::ListOf(i32::SHAPE),
            ShapeSignature::ListOf(i32::SHAPE)
        );
        assert_ne!(
            ShapeSignature::ListOf(i32::SHAPE),
            ShapeSignature::MapOf(i32::SHAPE)
        );
        assert_ne!(
            ShapeSignature::ListOf(i32::SHAPE),
            ShapeSignature::ListOf(Option::<i32>::SHAPE)
        );
        assert_eq!(
            ShapeSignature::MapOf(i32::SHAPE).to_string(),
            "MapOf(String, i32)"
        );
    }
}
