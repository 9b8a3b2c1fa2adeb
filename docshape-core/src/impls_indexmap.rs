use core::any::Any;

use indexmap::IndexMap;

use crate::{Def, Describe, MapDef, MapIter, Shape, peek};

impl<K: Describe, V: Describe, S: 'static> Describe for IndexMap<K, V, S> {
    const SHAPE: &'static Shape = &const {
        Shape::builder::<Self>("IndexMap")
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
                f.write_str("IndexMap<")?;
                K::SHAPE.write_type_name(f)?;
                f.write_str(", ")?;
                V::SHAPE.write_type_name(f)?;
                f.write_str(">")
            })
            .build()
    };
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::{Def, Describe};

    #[test]
    fn entries_keep_insertion_order() {
        let Def::Map(map_def) = IndexMap::<String, i32>::SHAPE.def else {
            panic!("IndexMap should be a map");
        };
        let mut map = IndexMap::new();
        map.insert(String::from("z"), 1);
        map.insert(String::from("a"), 2);

        let keys: Vec<&str> = (map_def.iter)(&map)
            .unwrap()
            .map(|(k, _)| k.downcast_ref::<String>().unwrap().as_str())
            .collect();
        assert_eq!(keys, ["z", "a"]);
        assert_eq!((map_def.len)(&map).unwrap(), 2);
    }
}
