use crate::WriteError;

/// Where the next value lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The root document.
    Root,
    /// A named entry of a document; `index` counts earlier entries.
    Field {
        /// entry name
        name: String,
        /// position within the document
        index: usize,
    },
    /// An element of an array.
    Element {
        /// position within the array
        index: usize,
    },
}

impl Slot {
    /// Position within the enclosing container, `None` for the root.
    pub fn index(&self) -> Option<usize> {
        match self {
            Slot::Root => None,
            Slot::Field { index, .. } | Slot::Element { index } => Some(*index),
        }
    }
}

#[derive(Debug)]
enum Frame {
    Document { name: Option<String>, len: usize },
    Array { len: usize },
}

/// Tracks the nesting of a writer and validates the order of calls.
///
/// Every [`DocumentWriter`](crate::DocumentWriter) in this workspace keeps
/// one: each call asks the state where the value lands (or gets an
/// [`WriteError::InvalidState`]), then emits it.
///
/// The root must be a single document; nothing can be written after it is
/// closed.
#[derive(Debug, Default)]
pub struct WriterState {
    stack: Vec<Frame>,
    finished: bool,
}

impl WriterState {
    /// A state expecting the root document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open documents and arrays.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true once the root document is closed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Records the name of the next document entry.
    pub fn name(&mut self, name: &str) -> Result<(), WriteError> {
        const OP: &str = "write a name";
        match self.stack.last_mut() {
            Some(Frame::Document { name: pending, .. }) => {
                if pending.is_some() {
                    return Err(WriteError::invalid_state(OP, "the previous name has no value"));
                }
                *pending = Some(name.to_string());
                Ok(())
            }
            Some(Frame::Array { .. }) => Err(WriteError::invalid_state(
                OP,
                "array elements are not named",
            )),
            None => Err(WriteError::invalid_state(OP, "no document is open")),
        }
    }

    /// Claims the slot for a scalar (or null) value.
    pub fn value(&mut self) -> Result<Slot, WriteError> {
        self.claim("write a value")
    }

    /// Claims a slot and opens a document in it.
    pub fn start_document(&mut self) -> Result<Slot, WriteError> {
        let slot = if self.stack.is_empty() && !self.finished {
            Slot::Root
        } else {
            self.claim("start a document")?
        };
        self.stack.push(Frame::Document { name: None, len: 0 });
        Ok(slot)
    }

    /// Closes the innermost document, returning its number of entries.
    pub fn end_document(&mut self) -> Result<usize, WriteError> {
        const OP: &str = "end a document";
        match self.stack.last() {
            Some(Frame::Document { name: Some(_), .. }) => {
                Err(WriteError::invalid_state(OP, "the last name has no value"))
            }
            Some(Frame::Document { name: None, len }) => {
                let len = *len;
                self.stack.pop();
                if self.stack.is_empty() {
                    self.finished = true;
                }
                Ok(len)
            }
            Some(Frame::Array { .. }) => {
                Err(WriteError::invalid_state(OP, "the innermost container is an array"))
            }
            None => Err(WriteError::invalid_state(OP, "no document is open")),
        }
    }

    /// Claims a slot and opens an array in it.
    pub fn start_array(&mut self) -> Result<Slot, WriteError> {
        let slot = self.claim("start an array")?;
        self.stack.push(Frame::Array { len: 0 });
        Ok(slot)
    }

    /// Closes the innermost array, returning its number of elements.
    pub fn end_array(&mut self) -> Result<usize, WriteError> {
        const OP: &str = "end an array";
        match self.stack.last() {
            Some(Frame::Array { len }) => {
                let len = *len;
                self.stack.pop();
                Ok(len)
            }
            Some(Frame::Document { .. }) => Err(WriteError::invalid_state(
                OP,
                "the innermost container is a document",
            )),
            None => Err(WriteError::invalid_state(OP, "no array is open")),
        }
    }

    fn claim(&mut self, operation: &'static str) -> Result<Slot, WriteError> {
        match self.stack.last_mut() {
            Some(Frame::Document { name, len }) => match name.take() {
                Some(name) => {
                    let index = *len;
                    *len += 1;
                    Ok(Slot::Field { name, index })
                }
                None => Err(WriteError::invalid_state(
                    operation,
                    "document entries need a name first",
                )),
            },
            Some(Frame::Array { len }) => {
                let index = *len;
                *len += 1;
                Ok(Slot::Element { index })
            }
            None if self.finished => Err(WriteError::invalid_state(
                operation,
                "the root document is already closed",
            )),
            None => Err(WriteError::invalid_state(
                operation,
                "the root must be a document",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_nesting() {
        let mut state = WriterState::new();
        assert_eq!(state.start_document().unwrap(), Slot::Root);
        state.name("tags").unwrap();
        assert_eq!(
            state.start_array().unwrap(),
            Slot::Field {
                name: "tags".into(),
                index: 0
            }
        );
        assert_eq!(state.value().unwrap(), Slot::Element { index: 0 });
        assert_eq!(state.value().unwrap(), Slot::Element { index: 1 });
        assert_eq!(state.end_array().unwrap(), 2);
        assert_eq!(state.depth(), 1);
        assert_eq!(state.end_document().unwrap(), 1);
        assert!(state.is_finished());
    }

    #[test]
    fn rejects_out_of_order_calls() {
        let mut state = WriterState::new();
        assert!(state.value().is_err());
        assert!(state.start_array().is_err());

        state.start_document().unwrap();
        assert!(state.value().is_err());
        state.name("a").unwrap();
        assert!(state.name("b").is_err());
        assert!(state.end_document().is_err());
        state.value().unwrap();
        assert!(state.end_array().is_err());
        state.end_document().unwrap();

        let err = state.start_document().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot start a document: the root document is already closed"
        );
    }
}
