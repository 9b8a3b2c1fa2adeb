use core::any::Any;

use docshape_core::{ListIter, MapIter, ObjectId, ScalarType, Shape, peek};
use docshape_format::DocumentWriter;
use jiff::civil::{Date, DateTime};
use jiff::{Timestamp, Zoned};

use crate::unit::{RoutineBody, RoutineId, Step};
use crate::{CompiledEncoder, EncodeError};

/// Encodes `instance`, already checked to be of the unit's root type.
pub(crate) fn run(
    unit: &CompiledEncoder,
    writer: &mut dyn DocumentWriter,
    instance: &dyn Any,
) -> Result<(), EncodeError> {
    let mut run = Run { unit, writer };
    run.call(unit.entry(), Input::Entity(instance), 0)
}

/// What a routine is called with.
enum Input<'v> {
    Entity(&'v dyn Any),
    Items(ListIter<'v>),
    Entries {
        entries: MapIter<'v>,
        key: ScalarType,
    },
}

struct Run<'u, 'w> {
    unit: &'u CompiledEncoder,
    writer: &'w mut dyn DocumentWriter,
}

impl Run<'_, '_> {
    /// Runs a routine nested `depth` levels below the root document.
    fn call(&mut self, id: RoutineId, input: Input<'_>, depth: usize) -> Result<(), EncodeError> {
        let limit = self.unit.options().max_depth;
        if depth > limit {
            return Err(EncodeError::DepthLimitExceeded { limit });
        }
        grow(|| self.run_routine(id, input, depth))
    }

    fn run_routine(
        &mut self,
        id: RoutineId,
        input: Input<'_>,
        depth: usize,
    ) -> Result<(), EncodeError> {
        let unit = self.unit;
        let routine = unit.routine_at(id);
        match (&routine.body, input) {
            (RoutineBody::Entity { fields }, Input::Entity(value)) => {
                self.writer.write_start_document()?;
                for field in fields {
                    self.writer.write_name(field.wire_name)?;
                    self.step(&field.step, (field.get)(value)?, depth)?;
                }
                self.writer.write_end_document()?;
            }
            (RoutineBody::List { element }, Input::Items(items)) => {
                self.writer.write_start_array()?;
                for item in items {
                    self.step(element, item, depth)?;
                }
                self.writer.write_end_array()?;
            }
            (RoutineBody::Map { value: step }, Input::Entries { entries, key }) => {
                self.writer.write_start_document()?;
                for (k, v) in entries {
                    self.writer.write_name(map_key(k, key)?)?;
                    self.step(step, v, depth)?;
                }
                self.writer.write_end_document()?;
            }
            _ => {
                return Err(EncodeError::InvalidValue {
                    shape: routine.signature.shape(),
                    reason: format!("routine {} was called with the wrong input", routine.name),
                });
            }
        }
        Ok(())
    }

    /// Applies `step` to a value found inside a routine at `depth`.
    fn step(&mut self, step: &Step, value: &dyn Any, depth: usize) -> Result<(), EncodeError> {
        match step {
            Step::Scalar { shape, kind } => self.scalar(shape, *kind, value),
            Step::Enum(codec) => {
                let code = self.unit.codec_at(*codec).codec().encode(value)?;
                self.writer.write_string(code)?;
                Ok(())
            }
            Step::Entity(routine) => self.call(*routine, Input::Entity(value), depth + 1),
            Step::List { iter, routine } => {
                self.call(*routine, Input::Items(iter(value)?), depth + 1)
            }
            Step::Map { iter, key, routine } => self.call(
                *routine,
                Input::Entries {
                    entries: iter(value)?,
                    key: *key,
                },
                depth + 1,
            ),
            Step::Nullable { get, inner } => match get(value)? {
                Some(inner_value) => self.step(inner, inner_value, depth),
                None => {
                    self.writer.write_null()?;
                    Ok(())
                }
            },
            Step::Deref { deref, inner } => self.step(inner, deref(value)?, depth),
        }
    }

    fn scalar(
        &mut self,
        shape: &'static Shape,
        kind: ScalarType,
        value: &dyn Any,
    ) -> Result<(), EncodeError> {
        let w = &mut *self.writer;
        match kind {
            ScalarType::String => w.write_string(peek::<String>(value)?)?,
            ScalarType::Str => w.write_string(peek::<&'static str>(value)?)?,
            ScalarType::Bool => w.write_boolean(*peek::<bool>(value)?)?,
            ScalarType::I8 => w.write_int32(i32::from(*peek::<i8>(value)?))?,
            ScalarType::I16 => w.write_int32(i32::from(*peek::<i16>(value)?))?,
            ScalarType::I32 => w.write_int32(*peek::<i32>(value)?)?,
            ScalarType::U8 => w.write_int32(i32::from(*peek::<u8>(value)?))?,
            ScalarType::U16 => w.write_int32(i32::from(*peek::<u16>(value)?))?,
            ScalarType::U32 => w.write_int64(i64::from(*peek::<u32>(value)?))?,
            ScalarType::I64 => w.write_int64(*peek::<i64>(value)?)?,
            ScalarType::F32 => w.write_double(f64::from(*peek::<f32>(value)?))?,
            ScalarType::F64 => w.write_double(*peek::<f64>(value)?)?,
            ScalarType::Date => {
                let zoned = peek::<Date>(value)?.to_zoned(self.unit.options().time_zone.clone());
                w.write_date_time(civil_millis(shape, zoned)?)?
            }
            ScalarType::DateTime => {
                let zoned =
                    peek::<DateTime>(value)?.to_zoned(self.unit.options().time_zone.clone());
                w.write_date_time(civil_millis(shape, zoned)?)?
            }
            ScalarType::Timestamp => w.write_date_time(peek::<Timestamp>(value)?.as_millisecond())?,
            ScalarType::Zoned => {
                w.write_date_time(peek::<Zoned>(value)?.timestamp().as_millisecond())?
            }
            ScalarType::ObjectId => w.write_object_id(*peek::<ObjectId>(value)?)?,
        }
        Ok(())
    }
}

fn civil_millis(shape: &'static Shape, zoned: Result<Zoned, jiff::Error>) -> Result<i64, EncodeError> {
    match zoned {
        Ok(zoned) => Ok(zoned.timestamp().as_millisecond()),
        Err(err) => Err(EncodeError::InvalidValue {
            shape,
            reason: err.to_string(),
        }),
    }
}

fn map_key(key: &dyn Any, kind: ScalarType) -> Result<&str, EncodeError> {
    match kind {
        ScalarType::Str => Ok(*peek::<&'static str>(key)?),
        _ => Ok(peek::<String>(key)?.as_str()),
    }
}

#[cfg(feature = "stacker")]
fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(64 * 1024, 1024 * 1024, f)
}

#[cfg(not(feature = "stacker"))]
fn grow<R>(f: impl FnOnce() -> R) -> R {
    f()
}
