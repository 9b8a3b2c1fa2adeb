use docshape_core::ObjectId;

use crate::WriteError;

/// Receives a document as a stream of calls.
///
/// A document is written as `write_start_document`, then for each entry a
/// `write_name` followed by exactly one value (a scalar, `write_null`, a
/// nested document or an array), then `write_end_document`. Array elements
/// are values without names.
///
/// `write_null` is a value in its own right: a field written as null is
/// present in the output, unlike a field that is never written.
///
/// The trait is object safe; encoders drive `&mut dyn DocumentWriter`.
pub trait DocumentWriter {
    /// Opens a document: the root, a field value or an array element.
    fn write_start_document(&mut self) -> Result<(), WriteError>;

    /// Closes the innermost open document.
    fn write_end_document(&mut self) -> Result<(), WriteError>;

    /// Opens an array as a field value or an array element.
    fn write_start_array(&mut self) -> Result<(), WriteError>;

    /// Closes the innermost open array.
    fn write_end_array(&mut self) -> Result<(), WriteError>;

    /// Names the next value of the innermost open document.
    fn write_name(&mut self, name: &str) -> Result<(), WriteError>;

    /// Writes an explicit null.
    fn write_null(&mut self) -> Result<(), WriteError>;

    /// Writes a UTF-8 string.
    fn write_string(&mut self, value: &str) -> Result<(), WriteError>;

    /// Writes a 32-bit integer.
    fn write_int32(&mut self, value: i32) -> Result<(), WriteError>;

    /// Writes a 64-bit integer.
    fn write_int64(&mut self, value: i64) -> Result<(), WriteError>;

    /// Writes a double.
    fn write_double(&mut self, value: f64) -> Result<(), WriteError>;

    /// Writes a boolean.
    fn write_boolean(&mut self, value: bool) -> Result<(), WriteError>;

    /// Writes an instant as milliseconds since the Unix epoch.
    fn write_date_time(&mut self, millis: i64) -> Result<(), WriteError>;

    /// Writes an object identifier.
    fn write_object_id(&mut self, value: ObjectId) -> Result<(), WriteError>;
}

impl<W: DocumentWriter + ?Sized> DocumentWriter for &mut W {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        (**self).write_start_document()
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        (**self).write_end_document()
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        (**self).write_start_array()
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        (**self).write_end_array()
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        (**self).write_name(name)
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        (**self).write_null()
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        (**self).write_string(value)
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        (**self).write_int32(value)
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        (**self).write_int64(value)
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        (**self).write_double(value)
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), WriteError> {
        (**self).write_boolean(value)
    }

    fn write_date_time(&mut self, millis: i64) -> Result<(), WriteError> {
        (**self).write_date_time(millis)
    }

    fn write_object_id(&mut self, value: ObjectId) -> Result<(), WriteError> {
        (**self).write_object_id(value)
    }
}
