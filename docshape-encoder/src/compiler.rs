//! Turns a root entity's type graph into a [`CompiledEncoder`].
//!
//! Every shape signature is registered under a fresh routine name *before*
//! its body is compiled. A type that reaches itself again (directly, or
//! through lists, maps, options and pointers) finds its own registration
//! and refers to the routine by id instead of compiling it a second time.

use std::collections::{HashMap, HashSet};

use docshape_core::{Def, Field, ID_WIRE_NAME, Shape};

use crate::enum_codec::{CodecId, EnumCodecRegistry};
use crate::signature::snake_type_name;
use crate::unit::{FieldStep, Routine, RoutineBody, RoutineId, Step};
use crate::{BuildError, CompiledEncoder, EncoderOptions, ShapeSignature};

/// Builds the unit for `root`.
pub(crate) fn build(
    root: &'static Shape,
    options: EncoderOptions,
) -> Result<CompiledEncoder, BuildError> {
    let Def::Struct(struct_def) = root.def else {
        return Err(BuildError::NotAnEntity { shape: root });
    };
    if !struct_def.fields.iter().any(Field::is_identifier) {
        return Err(BuildError::MissingIdentifier { entity: root });
    }

    let mut compiler = Compiler::default();
    let entry = compiler.compile_entity(root)?;
    compiler.assemble(root, entry, options)
}

/// Where a value sits, which decides whether it may be null.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Position {
    /// A field of an entity: any type may be optional.
    Field,
    /// A list element or map value: only entities, lists and maps may be
    /// optional.
    Element,
}

/// A registered routine whose body may still be under construction.
#[derive(Debug)]
struct RoutineRecord {
    signature: ShapeSignature,
    name: String,
    body: Option<RoutineBody>,
}

enum Registration {
    New(RoutineId),
    Existing(RoutineId),
}

#[derive(Debug, Default)]
struct Compiler {
    registry: HashMap<ShapeSignature, RoutineId>,
    records: Vec<RoutineRecord>,
    codecs: EnumCodecRegistry,
    /// Numbers routines and codecs alike, in allocation order.
    counter: usize,
}

impl Compiler {
    /// Looks `signature` up, or registers it with an empty body the caller
    /// must [`finish`](Self::finish).
    fn register(&mut self, signature: ShapeSignature) -> Registration {
        if let Some(&id) = self.registry.get(&signature) {
            trace!(%signature, routine = %self.records[id.0].name, "memo hit");
            return Registration::Existing(id);
        }
        let id = RoutineId(self.records.len());
        let name = format!("{}_{}", signature.routine_prefix(), self.next_number());
        trace!(%signature, routine = %name, "registered routine");
        self.records.push(RoutineRecord {
            signature,
            name,
            body: None,
        });
        self.registry.insert(signature, id);
        Registration::New(id)
    }

    fn finish(&mut self, id: RoutineId, body: RoutineBody) {
        self.records[id.0].body = Some(body);
    }

    fn next_number(&mut self) -> usize {
        let n = self.counter;
        self.counter += 1;
        n
    }

    fn compile_entity(&mut self, shape: &'static Shape) -> Result<RoutineId, BuildError> {
        let Def::Struct(struct_def) = shape.def else {
            return Err(BuildError::NotAnEntity { shape });
        };
        let id = match self.register(ShapeSignature::Entity(shape)) {
            Registration::New(id) => id,
            Registration::Existing(id) => return Ok(id),
        };

        check_wire_names(shape, struct_def.fields)?;

        let mut fields = Vec::with_capacity(struct_def.fields.len());
        for field in struct_def.fields {
            let path = format!("{shape}.{}", field.name);
            let step = self.classify(field.shape(), &path, Position::Field)?;
            fields.push(FieldStep {
                wire_name: field.wire_name(),
                get: field.get,
                step,
            });
        }

        self.finish(id, RoutineBody::Entity { fields });
        Ok(id)
    }

    fn compile_list(
        &mut self,
        element: &'static Shape,
        path: &str,
    ) -> Result<RoutineId, BuildError> {
        let id = match self.register(ShapeSignature::ListOf(element)) {
            Registration::New(id) => id,
            Registration::Existing(id) => return Ok(id),
        };
        let element = self.classify(element, &format!("{path}[]"), Position::Element)?;
        self.finish(id, RoutineBody::List { element });
        Ok(id)
    }

    fn compile_map(&mut self, value: &'static Shape, path: &str) -> Result<RoutineId, BuildError> {
        let id = match self.register(ShapeSignature::MapOf(value)) {
            Registration::New(id) => id,
            Registration::Existing(id) => return Ok(id),
        };
        let value = self.classify(value, &format!("{path}{{}}"), Position::Element)?;
        self.finish(id, RoutineBody::Map { value });
        Ok(id)
    }

    fn codec_for(&mut self, shape: &'static Shape) -> Result<CodecId, BuildError> {
        let counter = &mut self.counter;
        let id = self.codecs.codec_for(shape, |prefix| {
            let n = *counter;
            *counter += 1;
            format!("{prefix}_{}_{n}", snake_type_name(shape))
        })?;
        Ok(id)
    }

    /// Decides how a value of type `shape` is written, compiling any
    /// routine it needs.
    fn classify(
        &mut self,
        shape: &'static Shape,
        path: &str,
        position: Position,
    ) -> Result<Step, BuildError> {
        match shape.def {
            Def::Scalar(kind) => Ok(Step::Scalar { shape, kind }),
            Def::Enum(_) => Ok(Step::Enum(self.codec_for(shape)?)),
            Def::Struct(_) => Ok(Step::Entity(self.compile_entity(shape)?)),
            Def::List(list_def) => {
                let routine = self.compile_list(list_def.t, path)?;
                Ok(Step::List {
                    iter: list_def.iter,
                    routine,
                })
            }
            Def::Map(map_def) => {
                let key = match map_def.k.scalar_type() {
                    Some(key) if key.is_string() => key,
                    _ => {
                        return Err(BuildError::NonStringMapKey {
                            path: path.to_owned(),
                            key: map_def.k,
                        });
                    }
                };
                let routine = self.compile_map(map_def.v, path)?;
                Ok(Step::Map {
                    iter: map_def.iter,
                    key,
                    routine,
                })
            }
            Def::Option(option_def) => {
                let inner = peel_pointers(option_def.t);
                if matches!(inner.def, Def::Option(_)) {
                    return Err(BuildError::NestedOption {
                        path: path.to_owned(),
                        shape,
                    });
                }
                if position == Position::Element
                    && !matches!(inner.def, Def::Struct(_) | Def::List(_) | Def::Map(_))
                {
                    return Err(BuildError::NullableElement {
                        path: path.to_owned(),
                        element: shape,
                    });
                }
                let inner = self.classify(option_def.t, path, position)?;
                Ok(Step::Nullable {
                    get: option_def.get,
                    inner: Box::new(inner),
                })
            }
            Def::Pointer(pointer_def) => {
                let inner = self.classify(pointer_def.pointee, path, position)?;
                Ok(Step::Deref {
                    deref: pointer_def.deref,
                    inner: Box::new(inner),
                })
            }
            Def::Set(_) => Err(BuildError::UnsupportedType {
                path: path.to_owned(),
                shape,
                reason: "sets have no document representation, use a list",
            }),
            Def::Opaque => Err(BuildError::UnsupportedType {
                path: path.to_owned(),
                shape,
                reason: "the type has no document representation",
            }),
        }
    }

    fn assemble(
        self,
        root: &'static Shape,
        entry: RoutineId,
        options: EncoderOptions,
    ) -> Result<CompiledEncoder, BuildError> {
        let routines = self
            .records
            .into_iter()
            .map(|record| match record.body {
                Some(body) => Ok(Routine {
                    name: record.name,
                    signature: record.signature,
                    body,
                }),
                None => Err(BuildError::UnfinishedRoutine {
                    signature: record.signature,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledEncoder::new(
            root,
            entry,
            routines,
            self.codecs.into_handles(),
            options,
        ))
    }
}

/// Rejects empty, reserved and clashing wire names, and more than one
/// identifier.
fn check_wire_names(entity: &'static Shape, fields: &'static [Field]) -> Result<(), BuildError> {
    let mut identifier: Option<&'static str> = None;
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if field.is_identifier() {
            if let Some(first) = identifier {
                return Err(BuildError::MultipleIdentifiers {
                    entity,
                    first,
                    second: field.name,
                });
            }
            identifier = Some(field.name);
        }

        let wire_name = field.wire_name();
        if wire_name.is_empty() {
            return Err(BuildError::EmptyWireName {
                entity,
                field: field.name,
            });
        }
        if wire_name == ID_WIRE_NAME && !field.is_identifier() {
            return Err(BuildError::ReservedWireName {
                entity,
                field: field.name,
            });
        }
        if !seen.insert(wire_name) {
            return Err(BuildError::DuplicateWireName { entity, wire_name });
        }
    }
    Ok(())
}

fn peel_pointers(mut shape: &'static Shape) -> &'static Shape {
    while let Def::Pointer(pointer_def) = shape.def {
        shape = pointer_def.pointee;
    }
    shape
}
