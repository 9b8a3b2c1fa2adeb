use docshape_core::ObjectId;

/// A document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Bson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Nested document
    Document(Document),
    /// Array of values
    Array(Vec<Bson>),
    /// Object identifier
    ObjectId(ObjectId),
    /// Boolean
    Boolean(bool),
    /// Milliseconds since the Unix epoch
    DateTime(i64),
    /// Explicit null, distinct from an absent entry
    Null,
    /// 32-bit integer
    Int32(i32),
    /// 64-bit integer
    Int64(i64),
}

impl Bson {
    /// The nested document, if this is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Bson::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Bson]> {
        match self {
            Bson::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Bson::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for [`Bson::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Bson::Null)
    }
}

impl From<Document> for Bson {
    fn from(doc: Document) -> Self {
        Bson::Document(doc)
    }
}

impl From<&str> for Bson {
    fn from(s: &str) -> Self {
        Bson::String(s.to_string())
    }
}

impl From<String> for Bson {
    fn from(s: String) -> Self {
        Bson::String(s)
    }
}

impl From<i32> for Bson {
    fn from(v: i32) -> Self {
        Bson::Int32(v)
    }
}

impl From<i64> for Bson {
    fn from(v: i64) -> Self {
        Bson::Int64(v)
    }
}

impl From<f64> for Bson {
    fn from(v: f64) -> Self {
        Bson::Double(v)
    }
}

impl From<bool> for Bson {
    fn from(v: bool) -> Self {
        Bson::Boolean(v)
    }
}

impl From<ObjectId> for Bson {
    fn from(v: ObjectId) -> Self {
        Bson::ObjectId(v)
    }
}

impl From<Vec<Bson>> for Bson {
    fn from(items: Vec<Bson>) -> Self {
        Bson::Array(items)
    }
}

/// An ordered document: entries keep the order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Bson)>,
}

impl Document {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    ///
    /// A new key is appended; an existing key keeps its position and gets the
    /// new value, which is returned in place of the old one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Bson>) -> Option<Bson> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// The value under `key`.
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns true if `key` is present, including when its value is null.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position() {
        let mut doc = Document::new();
        doc.insert("b", 1);
        doc.insert("a", 2);
        assert_eq!(doc.insert("b", "again"), Some(Bson::Int32(1)));
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(doc.get("b").and_then(Bson::as_str), Some("again"));
    }

    #[test]
    fn null_entries_are_present() {
        let doc: Document = [("parent", Bson::Null)].into_iter().collect();
        assert!(doc.contains_key("parent"));
        assert!(doc.get("parent").is_some_and(Bson::is_null));
        assert!(!doc.contains_key("child"));
    }
}
