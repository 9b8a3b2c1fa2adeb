use core::any::Any;
use core::fmt::{self, Write as _};

use docshape_core::{
    DerefFn, FieldGetFn, ListIterFn, MapIterFn, OptionGetFn, ScalarType, Shape,
};
use docshape_format::DocumentWriter;

use crate::enum_codec::{CodecHandle, CodecId};
use crate::{EncodeError, EncoderOptions, ShapeSignature};

/// Index of a routine within its unit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct RoutineId(pub(crate) usize);

/// What to do with one value, decided once when the unit is built.
#[derive(Debug, Clone)]
pub(crate) enum Step {
    /// Hand the value to the writer as a primitive.
    Scalar {
        shape: &'static Shape,
        kind: ScalarType,
    },
    /// Write the variant's code through a shared codec.
    Enum(CodecId),
    /// Call an entity routine.
    Entity(RoutineId),
    /// Iterate the value and call a list routine with its items.
    List { iter: ListIterFn, routine: RoutineId },
    /// Iterate the value and call a map routine with its entries.
    Map {
        iter: MapIterFn,
        key: ScalarType,
        routine: RoutineId,
    },
    /// Write null for `None`, otherwise apply `inner` to the content.
    Nullable { get: OptionGetFn, inner: Box<Step> },
    /// Apply `inner` to the pointee.
    Deref { deref: DerefFn, inner: Box<Step> },
}

/// One field of an entity routine.
#[derive(Debug, Clone)]
pub(crate) struct FieldStep {
    pub(crate) wire_name: &'static str,
    pub(crate) get: FieldGetFn,
    pub(crate) step: Step,
}

#[derive(Debug, Clone)]
pub(crate) enum RoutineBody {
    /// Open a document, write every field in declaration order, close it.
    Entity { fields: Vec<FieldStep> },
    /// Open an array, apply `element` to each item, close it.
    List { element: Step },
    /// Open a document, name each entry by its key, apply `value` to it.
    Map { value: Step },
}

/// A named encode routine for one [`ShapeSignature`].
#[derive(Debug, Clone)]
pub struct Routine {
    pub(crate) name: String,
    pub(crate) signature: ShapeSignature,
    pub(crate) body: RoutineBody,
}

impl Routine {
    /// Name assigned when the routine was registered, e.g. `encode_order_0`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape this routine encodes.
    pub fn signature(&self) -> ShapeSignature {
        self.signature
    }
}

/// The encoder built for one root entity type.
///
/// Holds one routine per [`ShapeSignature`] reachable from the root and one
/// codec per enum type. A unit never changes after it is built and can be
/// shared between threads; each call to [`encode`](Self::encode) keeps its
/// state on the stack.
#[derive(Debug)]
pub struct CompiledEncoder {
    root: &'static Shape,
    entry: RoutineId,
    routines: Vec<Routine>,
    codecs: Vec<CodecHandle>,
    options: EncoderOptions,
}

impl CompiledEncoder {
    pub(crate) fn new(
        root: &'static Shape,
        entry: RoutineId,
        routines: Vec<Routine>,
        codecs: Vec<CodecHandle>,
        options: EncoderOptions,
    ) -> Self {
        Self {
            root,
            entry,
            routines,
            codecs,
            options,
        }
    }

    /// Writes `instance` as one document.
    ///
    /// Fails with [`EncodeError::TypeMismatch`] if `instance` is not of the
    /// root type. Writer errors are returned as they are; the writer is left
    /// in whatever state the failed call reached.
    pub fn encode(
        &self,
        writer: &mut dyn DocumentWriter,
        instance: &dyn Any,
    ) -> Result<(), EncodeError> {
        if instance.type_id() != self.root.id.get() {
            return Err(EncodeError::TypeMismatch {
                expected: self.root,
            });
        }
        crate::exec::run(self, writer, instance)
    }

    /// The root entity type.
    pub fn shape(&self) -> &'static Shape {
        self.root
    }

    /// Name of the routine `encode` starts with.
    pub fn entry_name(&self) -> &str {
        &self.routine_at(self.entry).name
    }

    /// Number of routines in the unit.
    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }

    /// All routines, in registration order.
    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    /// Looks a routine up by name.
    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.iter().find(|routine| routine.name == name)
    }

    /// Looks a routine up by the shape it encodes.
    pub fn routine_for(&self, signature: ShapeSignature) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|routine| routine.signature == signature)
    }

    /// The enum codecs shared by the routines.
    pub fn codecs(&self) -> &[CodecHandle] {
        &self.codecs
    }

    /// Options the unit was built with.
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub(crate) fn entry(&self) -> RoutineId {
        self.entry
    }

    pub(crate) fn routine_at(&self, id: RoutineId) -> &Routine {
        &self.routines[id.0]
    }

    pub(crate) fn codec_at(&self, id: CodecId) -> &CodecHandle {
        &self.codecs[id.0]
    }

    /// Renders every routine and codec as text, one instruction per line.
    ///
    /// ```text
    /// routine encode_order_0 (Entity(Order))
    ///   _id: object_id
    ///   items: list encode_list_item_1
    /// ```
    pub fn listing(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_listing(&mut out);
        out
    }

    fn write_listing(&self, out: &mut String) -> fmt::Result {
        for routine in &self.routines {
            writeln!(out, "routine {} ({})", routine.name, routine.signature)?;
            match &routine.body {
                RoutineBody::Entity { fields } => {
                    for field in fields {
                        write!(out, "  {}: ", field.wire_name)?;
                        self.write_step(out, &field.step)?;
                        out.push('\n');
                    }
                }
                RoutineBody::List { element } => {
                    out.push_str("  []: ");
                    self.write_step(out, element)?;
                    out.push('\n');
                }
                RoutineBody::Map { value } => {
                    out.push_str("  {}: ");
                    self.write_step(out, value)?;
                    out.push('\n');
                }
            }
        }
        for handle in &self.codecs {
            writeln!(out, "codec {} ({})", handle.name(), handle.codec().shape())?;
            for (variant, code) in handle.codec().pairs() {
                writeln!(out, "  {variant} => {code:?}")?;
            }
        }
        Ok(())
    }

    fn write_step(&self, out: &mut String, step: &Step) -> fmt::Result {
        match step {
            Step::Scalar { kind, .. } => out.push_str(wire_kind(*kind)),
            Step::Enum(codec) => write!(out, "enum {}", self.codec_at(*codec).name())?,
            Step::Entity(routine) => write!(out, "call {}", self.routine_at(*routine).name)?,
            Step::List { routine, .. } => {
                write!(out, "list {}", self.routine_at(*routine).name)?
            }
            Step::Map { routine, .. } => write!(out, "map {}", self.routine_at(*routine).name)?,
            Step::Nullable { inner, .. } => {
                out.push_str("null or ");
                self.write_step(out, inner)?;
            }
            Step::Deref { inner, .. } => {
                out.push_str("deref ");
                self.write_step(out, inner)?;
            }
        }
        Ok(())
    }
}

/// Document type a scalar is written as.
pub(crate) fn wire_kind(kind: ScalarType) -> &'static str {
    match kind {
        ScalarType::String | ScalarType::Str => "string",
        ScalarType::Bool => "boolean",
        ScalarType::I8 | ScalarType::I16 | ScalarType::I32 | ScalarType::U8 | ScalarType::U16 => {
            "int32"
        }
        ScalarType::U32 | ScalarType::I64 => "int64",
        ScalarType::F32 | ScalarType::F64 => "double",
        ScalarType::Date | ScalarType::DateTime | ScalarType::Timestamp | ScalarType::Zoned => {
            "date_time"
        }
        ScalarType::ObjectId => "object_id",
    }
}
