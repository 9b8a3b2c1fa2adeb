use core::fmt;

use docshape_core::{ID_WIRE_NAME, Shape, WrongShape};
use docshape_format::WriteError;

use crate::ShapeSignature;

/// A type graph that cannot be compiled into an encoder.
///
/// Raised while a unit is built, never while encoding. Nothing is cached for
/// a type whose build failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The root type is not a struct with named fields.
    NotAnEntity {
        /// the rejected type
        shape: &'static Shape,
    },

    /// A field's type has no document representation.
    UnsupportedType {
        /// where the type appears, e.g. `Order.items[]`
        path: String,
        /// the rejected type
        shape: &'static Shape,
        /// why it is rejected
        reason: &'static str,
    },

    /// A map's keys are not strings.
    NonStringMapKey {
        /// the map field, e.g. `Order.index`
        path: String,
        /// the key type
        key: &'static Shape,
    },

    /// A list element or map value is optional but is not a reference type
    /// (entity, list or map).
    NullableElement {
        /// the list or map, e.g. `Order.scores[]`
        path: String,
        /// the optional element type
        element: &'static Shape,
    },

    /// An `Option` directly inside another `Option`, where `None` and
    /// `Some(None)` would both be written as null.
    NestedOption {
        /// where the type appears
        path: String,
        /// the outer option type
        shape: &'static Shape,
    },

    /// A field's wire name is empty.
    EmptyWireName {
        /// the entity declaring the field
        entity: &'static Shape,
        /// the Rust field name
        field: &'static str,
    },

    /// Two fields of one entity are written under the same name.
    DuplicateWireName {
        /// the entity declaring the fields
        entity: &'static Shape,
        /// the shared wire name
        wire_name: &'static str,
    },

    /// A field that is not the identifier is written under the identifier's
    /// reserved name.
    ReservedWireName {
        /// the entity declaring the field
        entity: &'static Shape,
        /// the Rust field name
        field: &'static str,
    },

    /// The root entity declares no identifier field.
    MissingIdentifier {
        /// the root entity
        entity: &'static Shape,
    },

    /// An entity declares more than one identifier field.
    MultipleIdentifiers {
        /// the entity
        entity: &'static Shape,
        /// the first identifier field
        first: &'static str,
        /// the second identifier field
        second: &'static str,
    },

    /// An enum cannot get a codec.
    EnumCodec(EnumCodecError),

    /// A routine was registered but never given a body.
    UnfinishedRoutine {
        /// the routine's shape
        signature: ShapeSignature,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::NotAnEntity { shape } => write!(
                f,
                "`{shape}` is not an entity: only structs with named fields are encoded as documents"
            ),
            BuildError::UnsupportedType {
                path,
                shape,
                reason,
            } => write!(f, "unsupported type `{shape}` at `{path}`: {reason}"),
            BuildError::NonStringMapKey { path, key } => write!(
                f,
                "map at `{path}` has keys of type `{key}`, but map keys must be strings"
            ),
            BuildError::NullableElement { path, element } => write!(
                f,
                "`{path}` holds `{element}`; only entity, list and map elements can be null"
            ),
            BuildError::NestedOption { path, shape } => {
                write!(f, "`{path}` nests an option inside an option (`{shape}`)")
            }
            BuildError::EmptyWireName { entity, field } => {
                write!(f, "field `{entity}.{field}` has an empty wire name")
            }
            BuildError::DuplicateWireName { entity, wire_name } => write!(
                f,
                "`{entity}` writes more than one field under the name `{wire_name}`"
            ),
            BuildError::ReservedWireName { entity, field } => write!(
                f,
                "field `{entity}.{field}` is written as `{ID_WIRE_NAME}`, which is reserved for the identifier; mark it with #[docshape(id)] instead"
            ),
            BuildError::MissingIdentifier { entity } => write!(
                f,
                "root entity `{entity}` has no identifier field; mark one with #[docshape(id)]"
            ),
            BuildError::MultipleIdentifiers {
                entity,
                first,
                second,
            } => write!(
                f,
                "`{entity}` marks both `{first}` and `{second}` as identifier"
            ),
            BuildError::EnumCodec(err) => fmt::Display::fmt(err, f),
            BuildError::UnfinishedRoutine { signature } => {
                write!(f, "the routine for {signature} was never completed")
            }
        }
    }
}

impl core::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            BuildError::EnumCodec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EnumCodecError> for BuildError {
    fn from(err: EnumCodecError) -> Self {
        BuildError::EnumCodec(err)
    }
}

/// An enum whose variants cannot be mapped to distinct wire codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumCodecError {
    /// The shape is not a fieldless enum.
    NotAnEnum {
        /// the rejected type
        shape: &'static Shape,
    },

    /// The enum has no variants, so no value can ever be encoded.
    EmptyEnum {
        /// the enum
        shape: &'static Shape,
    },

    /// A variant is renamed to the empty string.
    EmptyWireCode {
        /// the enum
        shape: &'static Shape,
        /// the variant
        variant: &'static str,
    },

    /// Two variants share a wire code.
    DuplicateWireCode {
        /// the enum
        shape: &'static Shape,
        /// the shared code
        code: &'static str,
        /// the first variant with that code
        first: &'static str,
        /// the second variant with that code
        second: &'static str,
    },
}

impl fmt::Display for EnumCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumCodecError::NotAnEnum { shape } => {
                write!(f, "`{shape}` is not a fieldless enum")
            }
            EnumCodecError::EmptyEnum { shape } => {
                write!(f, "enum `{shape}` has no variants to encode")
            }
            EnumCodecError::EmptyWireCode { shape, variant } => {
                write!(f, "variant `{shape}::{variant}` has an empty wire code")
            }
            EnumCodecError::DuplicateWireCode {
                shape,
                code,
                first,
                second,
            } => write!(
                f,
                "variants `{shape}::{first}` and `{shape}::{second}` share the wire code {code:?}"
            ),
        }
    }
}

impl core::error::Error for EnumCodecError {}

/// A failure while encoding one value with a built unit.
#[derive(Debug)]
pub enum EncodeError {
    /// The document writer failed; its error is passed through untouched.
    Write(WriteError),

    /// The instance is not of the type the unit was built for.
    TypeMismatch {
        /// the unit's root type
        expected: &'static Shape,
    },

    /// A descriptor accessor was handed a value of another type.
    WrongShape(WrongShape),

    /// Routine calls nested deeper than the configured limit.
    DepthLimitExceeded {
        /// the configured limit
        limit: usize,
    },

    /// A value cannot be represented in a document.
    InvalidValue {
        /// the value's type
        shape: &'static Shape,
        /// why it cannot be written
        reason: String,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::Write(err) => write!(f, "document writer failed: {err}"),
            EncodeError::TypeMismatch { expected } => write!(
                f,
                "type mismatch: this encoder only accepts values of type `{expected}`"
            ),
            EncodeError::WrongShape(err) => fmt::Display::fmt(err, f),
            EncodeError::DepthLimitExceeded { limit } => {
                write!(f, "value nests deeper than the limit of {limit} levels")
            }
            EncodeError::InvalidValue { shape, reason } => {
                write!(f, "cannot encode `{shape}` value: {reason}")
            }
        }
    }
}

impl core::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            EncodeError::Write(err) => Some(err),
            EncodeError::WrongShape(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WriteError> for EncodeError {
    fn from(err: WriteError) -> Self {
        EncodeError::Write(err)
    }
}

impl From<WrongShape> for EncodeError {
    fn from(err: WrongShape) -> Self {
        EncodeError::WrongShape(err)
    }
}

/// Either failure of the one-shot helpers, which build (or fetch) an
/// encoder and use it right away.
#[derive(Debug)]
pub enum Error {
    /// Building the encoder failed.
    Build(BuildError),
    /// Encoding the value failed.
    Encode(EncodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Build(err) => fmt::Display::fmt(err, f),
            Error::Encode(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Build(err) => Some(err),
            Error::Encode(err) => Some(err),
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Build(err)
    }
}

impl From<EncodeError> for Error {
    fn from(err: EncodeError) -> Self {
        Error::Encode(err)
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        Error::Encode(EncodeError::Write(err))
    }
}
