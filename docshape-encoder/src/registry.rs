//! Per-type cache of compiled encoders.
//!
//! Units are looked up by the root type's [`ConstTypeId`]. Each type gets a
//! slot with its own build lock: the first caller builds while later callers
//! for the same type wait, then all of them share one [`Arc<CompiledEncoder>`].
//! Builds for different types do not wait on each other.

use core::fmt;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, OnceLock};

use docshape_core::{ConstTypeId, Describe, Shape};
use docshape_format::{BsonWriter, Document, DocumentBuilder, DocumentWriter};
use parking_lot::{Mutex, RwLock};

use crate::{BuildError, CompiledEncoder, EncodeError, EncoderOptions, compiler};

#[derive(Default)]
struct Slot {
    /// Held by the thread building this type's unit.
    build: Mutex<()>,
    unit: OnceLock<Arc<CompiledEncoder>>,
}

/// Builds encoder units on first use and keeps them for reuse.
pub struct EncoderRegistry {
    options: EncoderOptions,
    slots: RwLock<HashMap<ConstTypeId, Arc<Slot>>>,
    builds: AtomicUsize,
}

static GLOBAL: LazyLock<EncoderRegistry> = LazyLock::new(EncoderRegistry::new);

impl Default for EncoderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EncoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderRegistry")
            .field("options", &self.options)
            .field("types", &self.slots.read().len())
            .field("builds", &self.builds())
            .finish()
    }
}

impl EncoderRegistry {
    /// An empty registry with default options.
    pub fn new() -> Self {
        Self::with_options(EncoderOptions::default())
    }

    /// An empty registry whose units are built with `options`.
    pub fn with_options(options: EncoderOptions) -> Self {
        Self {
            options,
            slots: RwLock::new(HashMap::new()),
            builds: AtomicUsize::new(0),
        }
    }

    /// The process-wide registry, with default options.
    pub fn global() -> &'static EncoderRegistry {
        &GLOBAL
    }

    /// Options units are built with.
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Number of units built so far. Failed builds are not counted.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Acquire)
    }

    /// Returns the unit for `shape`, building it if this registry has none.
    ///
    /// A failed build leaves nothing behind; the next call tries again and
    /// fails the same way.
    pub fn get_or_build(&self, shape: &'static Shape) -> Result<Arc<CompiledEncoder>, BuildError> {
        let slot = self.slot(shape);
        if let Some(unit) = slot.unit.get() {
            return Ok(Arc::clone(unit));
        }

        let _building = slot.build.lock();
        // another thread may have finished while we waited
        if let Some(unit) = slot.unit.get() {
            return Ok(Arc::clone(unit));
        }

        #[cfg(feature = "tracing")]
        let started = std::time::Instant::now();
        let unit = Arc::new(compiler::build(shape, self.options.clone())?);
        debug!(
            root = %shape,
            routines = unit.routine_count(),
            codecs = unit.codecs().len(),
            elapsed = ?started.elapsed(),
            "published encoder unit"
        );
        self.builds.fetch_add(1, Ordering::AcqRel);
        let unit = slot.unit.get_or_init(|| unit);
        Ok(Arc::clone(unit))
    }

    /// Typed handle for `T`'s unit.
    pub fn encoder_for<T: Describe>(&self) -> Result<EntityEncoder<T>, BuildError> {
        Ok(EntityEncoder {
            unit: self.get_or_build(T::SHAPE)?,
            _marker: PhantomData,
        })
    }

    fn slot(&self, shape: &'static Shape) -> Arc<Slot> {
        if let Some(slot) = self.slots.read().get(&shape.id) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(shape.id).or_default())
    }
}

/// A unit bound to its root type, so no type mismatch can occur.
pub struct EntityEncoder<T> {
    unit: Arc<CompiledEncoder>,
    _marker: PhantomData<fn(&T)>,
}

impl<T> Clone for EntityEncoder<T> {
    fn clone(&self) -> Self {
        Self {
            unit: Arc::clone(&self.unit),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for EntityEncoder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityEncoder")
            .field(&format_args!("{}", self.unit.shape()))
            .finish()
    }
}

impl<T: Describe> EntityEncoder<T> {
    /// Writes `value` as one document.
    pub fn encode(&self, writer: &mut dyn DocumentWriter, value: &T) -> Result<(), EncodeError> {
        self.unit.encode(writer, value)
    }

    /// Encodes `value` into an in-memory [`Document`].
    pub fn to_document(&self, value: &T) -> Result<Document, EncodeError> {
        let mut builder = DocumentBuilder::new();
        self.encode(&mut builder, value)?;
        Ok(builder.finish()?)
    }

    /// Encodes `value` as binary BSON.
    pub fn to_bson_vec(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let mut writer = BsonWriter::new();
        self.encode(&mut writer, value)?;
        Ok(writer.into_bytes()?)
    }

    /// The shared unit.
    pub fn unit(&self) -> &Arc<CompiledEncoder> {
        &self.unit
    }
}
