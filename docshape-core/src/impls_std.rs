use core::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

use crate::{
    Def, Describe, ListDef, ListIter, MapDef, MapIter, ObjectId, OptionDef, PointerDef,
    ScalarType, SetDef, Shape, peek,
};

macro_rules! impl_scalar {
    ($($ty:ty => $ident:literal, $scalar:ident;)*) => {
        $(
            impl Describe for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape::builder::<Self>($ident)
                        .def(Def::Scalar(ScalarType::$scalar))
                        .build()
                };
            }
        )*
    };
}

impl_scalar! {
    String => "String", String;
    &'static str => "&str", Str;
    bool => "bool", Bool;
    i8 => "i8", I8;
    i16 => "i16", I16;
    i32 => "i32", I32;
    u8 => "u8", U8;
    u16 => "u16", U16;
    u32 => "u32", U32;
    i64 => "i64", I64;
    f32 => "f32", F32;
    f64 => "f64", F64;
    ObjectId => "ObjectId", ObjectId;
}

macro_rules! impl_opaque {
    ($($ty:ty => $ident:literal;)*) => {
        $(
            impl Describe for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape::builder::<Self>($ident).def(Def::Opaque).build()
                };
            }
        )*
    };
}

// No lossless document representation.
impl_opaque! {
    u64 => "u64";
    u128 => "u128";
    i128 => "i128";
    usize => "usize";
    isize => "isize";
    char => "char";
    () => "()";
}

impl<T: Describe> Describe for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("Option")
            .def(Def::Option(OptionDef::new(T::SHAPE, |value| {
                Ok(peek::<Self>(value)?.as_ref().map(|inner| inner as &dyn Any))
            })))
            .type_name(|f| {
                f.write_str("Option<")?;
                T::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<T: Describe> Describe for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("Vec")
            .def(Def::List(ListDef::new(
                T::SHAPE,
                |value| {
                    let iter: ListIter<'_> =
                        Box::new(peek::<Self>(value)?.iter().map(|item| item as &dyn Any));
                    Ok(iter)
                },
                |value| Ok(peek::<Self>(value)?.len()),
            )))
            .type_name(|f| {
                f.write_str("Vec<")?;
                T::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<T: Describe> Describe for VecDeque<T> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("VecDeque")
            .def(Def::List(ListDef::new(
                T::SHAPE,
                |value| {
                    let iter: ListIter<'_> =
                        Box::new(peek::<Self>(value)?.iter().map(|item| item as &dyn Any));
                    Ok(iter)
                },
                |value| Ok(peek::<Self>(value)?.len()),
            )))
            .type_name(|f| {
                f.write_str("VecDeque<")?;
                T::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("HashMap")
            .def(Def::Map(MapDef::new(
                K::SHAPE,
                V::SHAPE,
                |value| {
                    let iter: MapIter<'_> = Box::new(
                        peek::<Self>(value)?
                            .iter()
                            .map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
                    );
                    Ok(iter)
                },
                |value| Ok(peek::<Self>(value)?.len()),
            )))
            .type_name(|f| {
                f.write_str("HashMap<")?;
                K::SHAPE.write_type_name(f)?;
                f.write_str(", ")?;
                V::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("BTreeMap")
            .def(Def::Map(MapDef::new(
                K::SHAPE,
                V::SHAPE,
                |value| {
                    let iter: MapIter<'_> = Box::new(
                        peek::<Self>(value)?
                            .iter()
                            .map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
                    );
                    Ok(iter)
                },
                |value| Ok(peek::<Self>(value)?.len()),
            )))
            .type_name(|f| {
                f.write_str("BTreeMap<")?;
                K::SHAPE.write_type_name(f)?;
                f.write_str(", ")?;
                V::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<T: Describe, S: 'static> Describe for HashSet<T, S> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("HashSet")
            .def(Def::Set(SetDef::new(T::SHAPE)))
            .type_name(|f| {
                f.write_str("HashSet<")?;
                T::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

impl<T: Describe> Describe for BTreeSet<T> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("BTreeSet")
            .def(Def::Set(SetDef::new(T::SHAPE)))
            .type_name(|f| {
                f.write_str("BTreeSet<")?;
                T::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

macro_rules! impl_pointer {
    ($($ptr:ident => $ident:literal;)*) => {
        $(
            impl<T: Describe> Describe for $ptr<T> {
                const SHAPE: &'static Shape = &const {
                    Shape::builder::<Self>($ident)
                        .def(Def::Pointer(PointerDef::new(T::SHAPE, |value| {
                            let pointee: &T = peek::<Self>(value)?;
                            Ok(pointee as &dyn Any)
                        })))
                        .type_name(|f| {
                            f.write_str(concat!($ident, "<"))?;
                            T::SHAPE.write_type_name(f)?;
                            f.write_str(">")
                        })
                        .build()
                };
            }
        )*
    };
}

impl_pointer! {
    Box => "Box";
    Rc => "Rc";
    Arc => "Arc";
}
