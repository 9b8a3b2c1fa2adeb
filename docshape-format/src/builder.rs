use docshape_core::ObjectId;

use crate::{Bson, Document, DocumentWriter, Slot, WriteError, WriterState};

#[derive(Debug)]
enum Open {
    Document(Slot, Document),
    Array(Slot, Vec<Bson>),
}

/// A [`DocumentWriter`] that builds an in-memory [`Document`].
///
/// ```
/// use docshape_format::{Bson, DocumentBuilder, DocumentWriter};
///
/// let mut builder = DocumentBuilder::new();
/// builder.write_start_document()?;
/// builder.write_name("sku")?;
/// builder.write_string("A1")?;
/// builder.write_name("parent")?;
/// builder.write_null()?;
/// builder.write_end_document()?;
///
/// let doc = builder.finish()?;
/// assert_eq!(doc.get("sku"), Some(&Bson::String("A1".into())));
/// assert_eq!(doc.get("parent"), Some(&Bson::Null));
/// # Ok::<(), docshape_format::WriteError>(())
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    state: WriterState,
    open: Vec<Open>,
    root: Option<Document>,
}

impl DocumentBuilder {
    /// A builder expecting the root document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished root document.
    pub fn finish(self) -> Result<Document, WriteError> {
        self.root.ok_or(WriteError::invalid_state(
            "finish the document",
            "the root document is not closed",
        ))
    }

    fn place(&mut self, slot: Slot, value: Bson) -> Result<(), WriteError> {
        match (slot, self.open.last_mut()) {
            (Slot::Root, _) => match value {
                Bson::Document(doc) => {
                    self.root = Some(doc);
                    Ok(())
                }
                _ => Err(WriteError::invalid_state(
                    "write a value",
                    "the root must be a document",
                )),
            },
            (Slot::Field { name, .. }, Some(Open::Document(_, doc))) => {
                doc.insert(name, value);
                Ok(())
            }
            (Slot::Element { .. }, Some(Open::Array(_, items))) => {
                items.push(value);
                Ok(())
            }
            _ => Err(WriteError::invalid_state(
                "write a value",
                "the value does not fit the open container",
            )),
        }
    }

    fn scalar(&mut self, value: Bson) -> Result<(), WriteError> {
        let slot = self.state.value()?;
        self.place(slot, value)
    }
}

impl DocumentWriter for DocumentBuilder {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_document()?;
        self.open.push(Open::Document(slot, Document::new()));
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        self.state.end_document()?;
        match self.open.pop() {
            Some(Open::Document(slot, doc)) => self.place(slot, Bson::Document(doc)),
            _ => Err(WriteError::invalid_state(
                "end a document",
                "no document is open",
            )),
        }
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_array()?;
        self.open.push(Open::Array(slot, Vec::new()));
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        self.state.end_array()?;
        match self.open.pop() {
            Some(Open::Array(slot, items)) => self.place(slot, Bson::Array(items)),
            _ => Err(WriteError::invalid_state("end an array", "no array is open")),
        }
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.state.name(name)
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        self.scalar(Bson::Null)
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        self.scalar(Bson::String(value.to_string()))
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.scalar(Bson::Int32(value))
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.scalar(Bson::Int64(value))
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        self.scalar(Bson::Double(value))
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), WriteError> {
        self.scalar(Bson::Boolean(value))
    }

    fn write_date_time(&mut self, millis: i64) -> Result<(), WriteError> {
        self.scalar(Bson::DateTime(millis))
    }

    fn write_object_id(&mut self, value: ObjectId) -> Result<(), WriteError> {
        self.scalar(Bson::ObjectId(value))
    }
}

/// Writes a [`Document`] to any [`DocumentWriter`].
///
/// Used to re-emit a built document through another writer, e.g. to render
/// it as JSON or binary.
pub fn write_document(doc: &Document, writer: &mut dyn DocumentWriter) -> Result<(), WriteError> {
    writer.write_start_document()?;
    for (name, value) in doc.iter() {
        writer.write_name(name)?;
        write_value(value, writer)?;
    }
    writer.write_end_document()
}

fn write_value(value: &Bson, writer: &mut dyn DocumentWriter) -> Result<(), WriteError> {
    match value {
        Bson::Double(v) => writer.write_double(*v),
        Bson::String(v) => writer.write_string(v),
        Bson::Document(doc) => write_document(doc, writer),
        Bson::Array(items) => {
            writer.write_start_array()?;
            for item in items {
                write_value(item, writer)?;
            }
            writer.write_end_array()
        }
        Bson::ObjectId(v) => writer.write_object_id(*v),
        Bson::Boolean(v) => writer.write_boolean(*v),
        Bson::DateTime(v) => writer.write_date_time(*v),
        Bson::Null => writer.write_null(),
        Bson::Int32(v) => writer.write_int32(*v),
        Bson::Int64(v) => writer.write_int64(*v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_containers() {
        let mut b = DocumentBuilder::new();
        b.write_start_document().unwrap();
        b.write_name("items").unwrap();
        b.write_start_array().unwrap();
        b.write_start_document().unwrap();
        b.write_name("qty").unwrap();
        b.write_int32(2).unwrap();
        b.write_end_document().unwrap();
        b.write_null().unwrap();
        b.write_end_array().unwrap();
        b.write_end_document().unwrap();

        let doc = b.finish().unwrap();
        let items = doc.get("items").and_then(Bson::as_array).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_document().and_then(|d| d.get("qty")),
            Some(&Bson::Int32(2))
        );
        assert!(items[1].is_null());
    }

    #[test]
    fn unfinished_documents_are_rejected() {
        let mut b = DocumentBuilder::new();
        b.write_start_document().unwrap();
        assert!(matches!(
            b.finish(),
            Err(WriteError::InvalidState { .. })
        ));
    }

    #[test]
    fn rewriting_a_document_copies_it() {
        let doc: Document = [("a", Bson::Int64(1)), ("b", Bson::Array(vec![Bson::Null]))]
            .into_iter()
            .collect();
        let mut b = DocumentBuilder::new();
        write_document(&doc, &mut b).unwrap();
        assert_eq!(b.finish().unwrap(), doc);
    }
}
