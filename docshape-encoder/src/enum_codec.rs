use core::any::Any;
use std::collections::HashMap;

use docshape_core::{ConstTypeId, Def, Shape, VariantIndexFn};

use crate::{EncodeError, EnumCodecError};

/// Maps the variants of one fieldless enum to their wire codes and back.
///
/// A variant's code is its `#[docshape(rename = "..")]` or, without one, its
/// name. Every variant gets a code when the codec is constructed; a codec
/// never discovers a missing or clashing code while encoding.
#[derive(Debug, Clone)]
pub struct EnumCodec {
    shape: &'static Shape,
    variant_index: VariantIndexFn,
    variants: Vec<&'static str>,
    codes: Vec<&'static str>,
}

impl EnumCodec {
    /// Builds the codec for an enum shape.
    pub fn new(shape: &'static Shape) -> Result<Self, EnumCodecError> {
        let Def::Enum(enum_def) = shape.def else {
            return Err(EnumCodecError::NotAnEnum { shape });
        };
        if enum_def.variants.is_empty() {
            return Err(EnumCodecError::EmptyEnum { shape });
        }

        let mut seen: HashMap<&'static str, &'static str> = HashMap::new();
        for variant in enum_def.variants {
            let code = variant.wire_code();
            if code.is_empty() {
                return Err(EnumCodecError::EmptyWireCode {
                    shape,
                    variant: variant.name,
                });
            }
            if let Some(first) = seen.insert(code, variant.name) {
                return Err(EnumCodecError::DuplicateWireCode {
                    shape,
                    code,
                    first,
                    second: variant.name,
                });
            }
        }

        Ok(Self {
            shape,
            variant_index: enum_def.variant_index,
            variants: enum_def.variants.iter().map(|v| v.name).collect(),
            codes: enum_def.variants.iter().map(|v| v.wire_code()).collect(),
        })
    }

    /// The enum this codec encodes.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// Wire codes, in variant declaration order.
    pub fn codes(&self) -> &[&'static str] {
        &self.codes
    }

    /// Wire code of the variant `value` holds.
    pub fn encode(&self, value: &dyn Any) -> Result<&'static str, EncodeError> {
        let index = (self.variant_index)(value)?;
        self.codes
            .get(index)
            .copied()
            .ok_or_else(|| EncodeError::InvalidValue {
                shape: self.shape,
                reason: format!("variant index {index} is out of range"),
            })
    }

    /// Variant index (in declaration order) for a wire code.
    pub fn decode(&self, code: &str) -> Option<usize> {
        self.codes.iter().position(|c| *c == code)
    }

    /// Rust name of the variant with the given wire code.
    pub fn variant_name(&self, code: &str) -> Option<&'static str> {
        self.decode(code).map(|index| self.variants[index])
    }

    /// `Variant => "code"` pairs, for listings.
    pub(crate) fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.variants.iter().copied().zip(self.codes.iter().copied())
    }
}

/// Identifies a codec handle within a unit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CodecId(pub(crate) usize);

/// A codec shared by every routine of a unit that writes its enum.
#[derive(Debug, Clone)]
pub struct CodecHandle {
    name: String,
    codec: EnumCodec,
}

impl CodecHandle {
    /// Handle name, e.g. `enum_codec_status_3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The codec.
    pub fn codec(&self) -> &EnumCodec {
        &self.codec
    }
}

/// One codec per enum type for the unit being built.
#[derive(Debug, Default)]
pub(crate) struct EnumCodecRegistry {
    by_type: HashMap<ConstTypeId, CodecId>,
    handles: Vec<CodecHandle>,
}

impl EnumCodecRegistry {
    /// Returns the handle for `shape`, constructing the codec on first use.
    /// `next_name` allocates the handle name.
    pub(crate) fn codec_for(
        &mut self,
        shape: &'static Shape,
        next_name: impl FnOnce(&str) -> String,
    ) -> Result<CodecId, EnumCodecError> {
        if let Some(id) = self.by_type.get(&shape.id) {
            return Ok(*id);
        }
        let codec = EnumCodec::new(shape)?;
        let id = CodecId(self.handles.len());
        let name = next_name("enum_codec");
        trace!(codec = %name, enum_type = %shape, "registered enum codec");
        self.handles.push(CodecHandle { name, codec });
        self.by_type.insert(shape.id, id);
        Ok(id)
    }

    pub(crate) fn into_handles(self) -> Vec<CodecHandle> {
        self.handles
    }
}

#[cfg(test)]
mod tests {
    use docshape_core::{Describe, EnumDef, Shape, Variant, WrongShape, peek};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Level {
        Low,
        High,
    }

    fn level_index(value: &dyn Any) -> Result<usize, WrongShape> {
        Ok(match peek::<Level>(value)? {
            Level::Low => 0,
            Level::High => 1,
        })
    }

    // Descriptors written by hand so that broken variants can be expressed.
    impl Describe for Level {
        const SHAPE: &'static Shape = &const {
            Shape::builder::<Self>("Level")
                .def(Def::Enum(EnumDef::new(
                    &const { [Variant::new("Low").rename("lo"), Variant::new("High")] },
                    level_index,
                )))
                .build()
        };
    }

    #[allow(dead_code)]
    struct Clashing;

    impl Describe for Clashing {
        const SHAPE: &'static Shape = &const {
            Shape::builder::<Self>("Clashing")
                .def(Def::Enum(EnumDef::new(
                    &const { [Variant::new("A").rename("x"), Variant::new("B").rename("x")] },
                    |_| Ok(0),
                )))
                .build()
        };
    }

    #[allow(dead_code)]
    struct Blank;

    impl Describe for Blank {
        const SHAPE: &'static Shape = &const {
            Shape::builder::<Self>("Blank")
                .def(Def::Enum(EnumDef::new(
                    &const { [Variant::new("A").rename("")] },
                    |_| Ok(0),
                )))
                .build()
        };
    }

    #[test]
    fn codes_default_to_variant_names() {
        let codec = EnumCodec::new(Level::SHAPE).unwrap();
        assert_eq!(codec.codes(), ["lo", "High"]);
        assert_eq!(codec.encode(&Level::Low).unwrap(), "lo");
        assert_eq!(codec.encode(&Level::High).unwrap(), "High");
        assert_eq!(codec.decode("High"), Some(1));
        assert_eq!(codec.variant_name("lo"), Some("Low"));
        assert_eq!(codec.decode("Low"), None);
    }

    #[test]
    fn broken_codes_fail_at_construction() {
        assert_eq!(
            EnumCodec::new(Clashing::SHAPE).unwrap_err(),
            EnumCodecError::DuplicateWireCode {
                shape: Clashing::SHAPE,
                code: "x",
                first: "A",
                second: "B",
            }
        );
        assert_eq!(
            EnumCodec::new(Blank::SHAPE).unwrap_err(),
            EnumCodecError::EmptyWireCode {
                shape: Blank::SHAPE,
                variant: "A",
            }
        );
        assert!(matches!(
            EnumCodec::new(String::SHAPE),
            Err(EnumCodecError::NotAnEnum { .. })
        ));
    }

    #[test]
    fn registry_hands_out_one_codec_per_enum() {
        let mut registry = EnumCodecRegistry::default();
        let mut allocated = 0;
        let mut next_name = |prefix: &str| {
            allocated += 1;
            format!("{prefix}_level_{allocated}")
        };
        let first = registry.codec_for(Level::SHAPE, &mut next_name).unwrap();
        let second = registry.codec_for(Level::SHAPE, &mut next_name).unwrap();
        assert_eq!(first, second);

        let handles = registry.into_handles();
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].name(), "enum_codec_level_1");
    }

    #[test]
    fn foreign_values_are_rejected() {
        let codec = EnumCodec::new(Level::SHAPE).unwrap();
        assert!(matches!(
            codec.encode(&3_i32),
            Err(EncodeError::WrongShape(_))
        ));
    }
}
