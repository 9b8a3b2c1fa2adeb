//! Binary BSON output and input.

use core::fmt;

use docshape_core::ObjectId;

use crate::{Bson, Document, DocumentWriter, Slot, WriteError, WriterState};

mod tag {
    pub(super) const DOUBLE: u8 = 0x01;
    pub(super) const STRING: u8 = 0x02;
    pub(super) const DOCUMENT: u8 = 0x03;
    pub(super) const ARRAY: u8 = 0x04;
    pub(super) const OBJECT_ID: u8 = 0x07;
    pub(super) const BOOLEAN: u8 = 0x08;
    pub(super) const DATE_TIME: u8 = 0x09;
    pub(super) const NULL: u8 = 0x0A;
    pub(super) const INT32: u8 = 0x10;
    pub(super) const INT64: u8 = 0x12;
}

/// A [`DocumentWriter`] producing binary BSON.
///
/// Documents and arrays are length-prefixed; lengths are filled in when the
/// container closes.
///
/// ```
/// use docshape_format::{BsonWriter, DocumentWriter};
///
/// let mut w = BsonWriter::new();
/// w.write_start_document()?;
/// w.write_name("a")?;
/// w.write_int32(1)?;
/// w.write_end_document()?;
/// assert_eq!(
///     w.into_bytes()?,
///     [0x0c, 0, 0, 0, 0x10, b'a', 0, 1, 0, 0, 0, 0]
/// );
/// # Ok::<(), docshape_format::WriteError>(())
/// ```
#[derive(Debug, Default)]
pub struct BsonWriter {
    buf: Vec<u8>,
    state: WriterState,
    starts: Vec<usize>,
}

impl BsonWriter {
    /// A writer expecting the root document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes of the finished root document.
    pub fn into_bytes(self) -> Result<Vec<u8>, WriteError> {
        if self.state.is_finished() {
            Ok(self.buf)
        } else {
            Err(WriteError::invalid_state(
                "finish the document",
                "the root document is not closed",
            ))
        }
    }

    fn write_cstring(&mut self, s: &str) -> Result<(), WriteError> {
        if s.as_bytes().contains(&0) {
            return Err(WriteError::custom(format_args!(
                "element name {s:?} contains a NUL byte"
            )));
        }
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    fn element_header(&mut self, slot: Slot, tag: u8) -> Result<(), WriteError> {
        match slot {
            Slot::Root => Ok(()),
            Slot::Field { name, .. } => {
                self.buf.push(tag);
                self.write_cstring(&name)
            }
            Slot::Element { index } => {
                self.buf.push(tag);
                self.write_cstring(&index.to_string())
            }
        }
    }

    fn scalar(&mut self, tag: u8, payload: &[u8]) -> Result<(), WriteError> {
        let slot = self.state.value()?;
        self.element_header(slot, tag)?;
        self.buf.extend_from_slice(payload);
        Ok(())
    }

    fn open(&mut self, slot: Slot, tag: u8) -> Result<(), WriteError> {
        self.element_header(slot, tag)?;
        self.starts.push(self.buf.len());
        self.buf.extend_from_slice(&[0; 4]);
        Ok(())
    }

    fn close(&mut self) -> Result<(), WriteError> {
        self.buf.push(0);
        let start = self.starts.pop().ok_or(WriteError::invalid_state(
            "close a container",
            "no container is open",
        ))?;
        let len = i32::try_from(self.buf.len() - start)
            .map_err(|_| WriteError::custom("document exceeds the maximum BSON size"))?;
        self.buf[start..start + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }
}

impl DocumentWriter for BsonWriter {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_document()?;
        self.open(slot, tag::DOCUMENT)
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        self.state.end_document()?;
        self.close()
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_array()?;
        self.open(slot, tag::ARRAY)
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        self.state.end_array()?;
        self.close()
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.state.name(name)
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        self.scalar(tag::NULL, &[])
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        let len = i32::try_from(value.len() + 1)
            .map_err(|_| WriteError::custom("string exceeds the maximum BSON size"))?;
        let slot = self.state.value()?;
        self.element_header(slot, tag::STRING)?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0);
        Ok(())
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.scalar(tag::INT32, &value.to_le_bytes())
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.scalar(tag::INT64, &value.to_le_bytes())
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        self.scalar(tag::DOUBLE, &value.to_le_bytes())
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), WriteError> {
        self.scalar(tag::BOOLEAN, &[u8::from(value)])
    }

    fn write_date_time(&mut self, millis: i64) -> Result<(), WriteError> {
        self.scalar(tag::DATE_TIME, &millis.to_le_bytes())
    }

    fn write_object_id(&mut self, value: ObjectId) -> Result<(), WriteError> {
        self.scalar(tag::OBJECT_ID, &value.bytes())
    }
}

/// Error returned by [`decode_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// byte offset where decoding failed
    pub offset: usize,
    /// what was wrong there
    pub reason: &'static str,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid BSON at offset {}: {}", self.offset, self.reason)
    }
}

impl core::error::Error for DecodeError {}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn error(&self, reason: &'static str) -> DecodeError {
        DecodeError {
            offset: self.pos,
            reason,
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.error("unexpected end of input"))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let slice = self.take(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.array::<1>()?[0])
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn cstring(&mut self) -> Result<String, DecodeError> {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| self.error("unterminated element name"))?;
        let s = core::str::from_utf8(&rest[..len])
            .map_err(|_| self.error("element name is not UTF-8"))?
            .to_string();
        self.pos += len + 1;
        Ok(s)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let len = usize::try_from(self.i32()?)
            .ok()
            .filter(|len| *len >= 1)
            .ok_or_else(|| self.error("invalid string length"))?;
        let bytes = self.take(len)?;
        let (text, terminator) = bytes.split_at(len - 1);
        if terminator != [0] {
            return Err(self.error("string is not NUL-terminated"));
        }
        core::str::from_utf8(text)
            .map(str::to_string)
            .map_err(|_| self.error("string is not UTF-8"))
    }

    fn entries(&mut self) -> Result<Vec<(String, Bson)>, DecodeError> {
        let start = self.pos;
        let len = usize::try_from(self.i32()?)
            .ok()
            .filter(|len| *len >= 5)
            .ok_or_else(|| self.error("invalid document length"))?;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| self.error("document length exceeds input"))?;

        let mut entries = Vec::new();
        loop {
            let tag = self.u8()?;
            if tag == 0 {
                break;
            }
            let name = self.cstring()?;
            let value = match tag {
                tag::DOUBLE => Bson::Double(f64::from_le_bytes(self.array()?)),
                tag::STRING => Bson::String(self.string()?),
                tag::DOCUMENT => Bson::Document(Document::from_iter(self.entries()?)),
                tag::ARRAY => {
                    Bson::Array(self.entries()?.into_iter().map(|(_, v)| v).collect())
                }
                tag::OBJECT_ID => Bson::ObjectId(ObjectId::from_bytes(self.array()?)),
                tag::BOOLEAN => Bson::Boolean(self.u8()? != 0),
                tag::DATE_TIME => Bson::DateTime(self.i64()?),
                tag::NULL => Bson::Null,
                tag::INT32 => Bson::Int32(self.i32()?),
                tag::INT64 => Bson::Int64(self.i64()?),
                _ => return Err(self.error("unsupported element type")),
            };
            entries.push((name, value));
        }
        if self.pos != end {
            return Err(self.error("document length does not match its contents"));
        }
        Ok(entries)
    }
}

/// Decodes one binary BSON document.
///
/// Reads the element types [`BsonWriter`] produces; other types are
/// rejected.
pub fn decode_document(bytes: &[u8]) -> Result<Document, DecodeError> {
    let mut reader = Reader { bytes, pos: 0 };
    let doc = Document::from_iter(reader.entries()?);
    if reader.pos != bytes.len() {
        return Err(reader.error("trailing bytes after the document"));
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_use_index_keys() {
        let mut w = BsonWriter::new();
        w.write_start_document().unwrap();
        w.write_name("x").unwrap();
        w.write_start_array().unwrap();
        w.write_boolean(true).unwrap();
        w.write_null().unwrap();
        w.write_end_array().unwrap();
        w.write_end_document().unwrap();

        let bytes = w.into_bytes().unwrap();
        #[rustfmt::skip]
        let expected = [
            0x14, 0, 0, 0,
            0x04, b'x', 0,
                0x0c, 0, 0, 0,
                0x08, b'0', 0, 1,
                0x0a, b'1', 0,
                0,
            0,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn strings_are_length_prefixed() {
        let mut w = BsonWriter::new();
        w.write_start_document().unwrap();
        w.write_name("s").unwrap();
        w.write_string("hé").unwrap();
        w.write_end_document().unwrap();
        let bytes = w.into_bytes().unwrap();
        assert_eq!(&bytes[4..7], [0x02, b's', 0]);
        assert_eq!(&bytes[7..11], 4_i32.to_le_bytes());
        assert_eq!(&bytes[11..15], [b'h', 0xc3, 0xa9, 0]);
    }

    #[test]
    fn decodes_what_it_writes() {
        let mut w = BsonWriter::new();
        w.write_start_document().unwrap();
        w.write_name("when").unwrap();
        w.write_date_time(1_700_000_000_000).unwrap();
        w.write_name("nested").unwrap();
        w.write_start_document().unwrap();
        w.write_name("n").unwrap();
        w.write_int64(-3).unwrap();
        w.write_end_document().unwrap();
        w.write_end_document().unwrap();

        let doc = decode_document(&w.into_bytes().unwrap()).unwrap();
        assert_eq!(doc.get("when"), Some(&Bson::DateTime(1_700_000_000_000)));
        let nested = doc.get("nested").and_then(Bson::as_document).unwrap();
        assert_eq!(nested.get("n"), Some(&Bson::Int64(-3)));
    }

    #[test]
    fn rejects_truncated_input() {
        let err = decode_document(&[0x0c, 0, 0, 0, 0x10, b'a']).unwrap_err();
        assert_eq!(err.reason, "document length exceeds input");
    }

    #[test]
    fn names_with_nul_bytes_fail() {
        let mut w = BsonWriter::new();
        w.write_start_document().unwrap();
        w.write_name("a\0b").unwrap();
        assert!(matches!(w.write_int32(1), Err(WriteError::Custom(_))));
    }
}
