use std::io::{self, Write};

use docshape_core::ObjectId;
use docshape_format::{DocumentWriter, Slot, WriteError, WriterState};

/// Options for JSON output.
#[derive(Debug, Clone)]
pub struct JsonOptions {
    /// Whether to pretty-print with indentation (default: false)
    pub pretty: bool,

    /// Indentation string for pretty-printing (default: "  ")
    pub indent: &'static str,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ",
        }
    }
}

impl JsonOptions {
    /// Create new default options (compact output).
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable pretty-printing with default indentation.
    pub const fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Set a custom indentation string (implies pretty-printing).
    pub const fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self.pretty = true;
        self
    }
}

/// A [`DocumentWriter`] producing relaxed extended JSON.
///
/// Numbers, strings, booleans and null map to plain JSON. Types JSON has no
/// literal for are wrapped:
///
/// - object ids as `{"$oid": "<24 hex digits>"}`
/// - date-times as `{"$date": <millis>}`
/// - non-finite doubles as `{"$numberDouble": "NaN"}` (or `"Infinity"`,
///   `"-Infinity"`)
///
/// Doubles always carry a fraction or exponent (`42.0`, not `42`) so they
/// stay distinguishable from integers.
pub struct JsonWriter<W: Write> {
    out: W,
    state: WriterState,
    options: JsonOptions,
}

impl<W: Write> JsonWriter<W> {
    /// A compact writer.
    pub fn new(out: W) -> Self {
        Self::with_options(out, JsonOptions::default())
    }

    /// A writer with the given options.
    pub fn with_options(out: W, options: JsonOptions) -> Self {
        Self {
            out,
            state: WriterState::new(),
            options,
        }
    }

    /// Returns the underlying sink once the root document is closed.
    pub fn finish(self) -> Result<W, WriteError> {
        if self.state.is_finished() {
            Ok(self.out)
        } else {
            Err(WriteError::InvalidState {
                operation: "finish the document",
                reason: "the root document is not closed",
            })
        }
    }

    fn write_indent(&mut self, depth: usize) -> io::Result<()> {
        if self.options.pretty {
            self.out.write_all(b"\n")?;
            for _ in 0..depth {
                self.out.write_all(self.options.indent.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Writes the separator, indentation and key in front of a value
    /// nested `depth` containers deep.
    fn before_value(&mut self, slot: &Slot, depth: usize) -> Result<(), WriteError> {
        if slot.index().is_some_and(|index| index > 0) {
            self.out.write_all(b",")?;
        }
        if slot.index().is_some() {
            self.write_indent(depth)?;
        }
        if let Slot::Field { name, .. } = slot {
            self.write_json_string(name)?;
            self.write_colon()?;
        }
        Ok(())
    }

    fn scalar(
        &mut self,
        render: impl FnOnce(&mut Self) -> io::Result<()>,
    ) -> Result<(), WriteError> {
        let slot = self.state.value()?;
        self.before_value(&slot, self.state.depth())?;
        render(self)?;
        Ok(())
    }

    /// Closes a container; `len` is its number of entries.
    fn after_container(&mut self, len: usize, close: &[u8]) -> Result<(), WriteError> {
        if len > 0 {
            self.write_indent(self.state.depth())?;
        }
        self.out.write_all(close)?;
        Ok(())
    }

    fn write_wrapped(
        &mut self,
        key: &str,
        value: impl FnOnce(&mut Self) -> io::Result<()>,
    ) -> io::Result<()> {
        self.out.write_all(b"{")?;
        self.write_json_string(key)?;
        self.write_colon()?;
        value(self)?;
        self.out.write_all(b"}")
    }

    fn write_colon(&mut self) -> io::Result<()> {
        let colon: &[u8] = if self.options.pretty { b": " } else { b":" };
        self.out.write_all(colon)
    }

    fn write_json_string(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(b"\"")?;
        let mut start = 0;
        for (i, c) in s.char_indices() {
            let escaped: Option<&[u8]> = match c {
                '"' => Some(b"\\\""),
                '\\' => Some(b"\\\\"),
                '\n' => Some(b"\\n"),
                '\r' => Some(b"\\r"),
                '\t' => Some(b"\\t"),
                '\u{08}' => Some(b"\\b"),
                '\u{0C}' => Some(b"\\f"),
                _ => None,
            };
            if escaped.is_none() && !c.is_ascii_control() {
                continue;
            }
            self.out.write_all(&s.as_bytes()[start..i])?;
            match escaped {
                Some(bytes) => self.out.write_all(bytes)?,
                None => write!(self.out, "\\u{:04x}", c as u32)?,
            }
            start = i + c.len_utf8();
        }
        self.out.write_all(&s.as_bytes()[start..])?;
        self.out.write_all(b"\"")
    }
}

impl<W: Write> DocumentWriter for JsonWriter<W> {
    fn write_start_document(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_document()?;
        // the new document is already on the stack
        self.before_value(&slot, self.state.depth() - 1)?;
        self.out.write_all(b"{")?;
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<(), WriteError> {
        let len = self.state.end_document()?;
        self.after_container(len, b"}")
    }

    fn write_start_array(&mut self) -> Result<(), WriteError> {
        let slot = self.state.start_array()?;
        self.before_value(&slot, self.state.depth() - 1)?;
        self.out.write_all(b"[")?;
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), WriteError> {
        let len = self.state.end_array()?;
        self.after_container(len, b"]")
    }

    fn write_name(&mut self, name: &str) -> Result<(), WriteError> {
        self.state.name(name)
    }

    fn write_null(&mut self) -> Result<(), WriteError> {
        self.scalar(|w| w.out.write_all(b"null"))
    }

    fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        self.scalar(|w| w.write_json_string(value))
    }

    fn write_int32(&mut self, value: i32) -> Result<(), WriteError> {
        self.scalar(|w| write!(w.out, "{value}"))
    }

    fn write_int64(&mut self, value: i64) -> Result<(), WriteError> {
        self.scalar(|w| write!(w.out, "{value}"))
    }

    fn write_double(&mut self, value: f64) -> Result<(), WriteError> {
        self.scalar(|w| {
            if value.is_finite() {
                // Debug keeps the fraction on whole numbers
                write!(w.out, "{value:?}")
            } else {
                let text = if value.is_nan() {
                    "NaN"
                } else if value > 0.0 {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                w.write_wrapped("$numberDouble", |w| w.write_json_string(text))
            }
        })
    }

    fn write_boolean(&mut self, value: bool) -> Result<(), WriteError> {
        let literal: &[u8] = if value { b"true" } else { b"false" };
        self.scalar(|w| w.out.write_all(literal))
    }

    fn write_date_time(&mut self, millis: i64) -> Result<(), WriteError> {
        self.scalar(|w| w.write_wrapped("$date", |w| write!(w.out, "{millis}")))
    }

    fn write_object_id(&mut self, value: ObjectId) -> Result<(), WriteError> {
        self.scalar(|w| {
            w.write_wrapped("$oid", |w| w.write_json_string(&value.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(options: JsonOptions, f: impl FnOnce(&mut JsonWriter<Vec<u8>>)) -> String {
        let mut w = JsonWriter::with_options(Vec::new(), options);
        f(&mut w);
        String::from_utf8(w.finish().unwrap()).unwrap()
    }

    #[test]
    fn compact_output() {
        let json = render(JsonOptions::new(), |w| {
            w.write_start_document().unwrap();
            w.write_name("a").unwrap();
            w.write_int32(1).unwrap();
            w.write_name("b").unwrap();
            w.write_start_array().unwrap();
            w.write_double(2.0).unwrap();
            w.write_null().unwrap();
            w.write_end_array().unwrap();
            w.write_name("c").unwrap();
            w.write_start_document().unwrap();
            w.write_end_document().unwrap();
            w.write_end_document().unwrap();
        });
        assert_eq!(json, r#"{"a":1,"b":[2.0,null],"c":{}}"#);
    }

    #[test]
    fn pretty_output() {
        let json = render(JsonOptions::new().pretty(), |w| {
            w.write_start_document().unwrap();
            w.write_name("tags").unwrap();
            w.write_start_array().unwrap();
            w.write_string("x").unwrap();
            w.write_end_array().unwrap();
            w.write_name("empty").unwrap();
            w.write_start_array().unwrap();
            w.write_end_array().unwrap();
            w.write_end_document().unwrap();
        });
        insta::assert_snapshot!(json, @r#"
        {
          "tags": [
            "x"
          ],
          "empty": []
        }
        "#);
    }

    #[test]
    fn wraps_types_without_json_literals() {
        let id: ObjectId = "5627b47d54b92d03adb9e9cf".parse().unwrap();
        let json = render(JsonOptions::new(), |w| {
            w.write_start_document().unwrap();
            w.write_name("_id").unwrap();
            w.write_object_id(id).unwrap();
            w.write_name("at").unwrap();
            w.write_date_time(-1).unwrap();
            w.write_name("x").unwrap();
            w.write_double(f64::NEG_INFINITY).unwrap();
            w.write_end_document().unwrap();
        });
        assert_eq!(
            json,
            r#"{"_id":{"$oid":"5627b47d54b92d03adb9e9cf"},"at":{"$date":-1},"x":{"$numberDouble":"-Infinity"}}"#
        );
    }

    #[test]
    fn escapes_strings() {
        let json = render(JsonOptions::new(), |w| {
            w.write_start_document().unwrap();
            w.write_name("quote\"d").unwrap();
            w.write_string("tab\there\u{1}é").unwrap();
            w.write_end_document().unwrap();
        });
        assert_eq!(json, r#"{"quote\"d":"tab\there\u0001é"}"#);
    }

    #[test]
    fn io_failures_surface_as_io_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut w = JsonWriter::new(Broken);
        assert!(matches!(w.write_start_document(), Err(WriteError::Io(_))));
    }
}
