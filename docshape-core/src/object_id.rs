use core::fmt;
use core::str::FromStr;

/// A 12-byte opaque document identifier.
///
/// The first four bytes hold the creation time in seconds since the Unix
/// epoch (big-endian); the remaining eight are opaque. The textual form is 24
/// lowercase hex digits.
///
/// ```
/// use docshape_core::ObjectId;
///
/// let id: ObjectId = "5627b47d54b92d03adb9e9cf".parse().unwrap();
/// assert_eq!(id.to_string(), "5627b47d54b92d03adb9e9cf");
/// assert_eq!(id.timestamp_seconds(), 0x5627b47d);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Wraps raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Builds an identifier from a creation time and eight opaque bytes.
    pub const fn from_parts(seconds: u32, rest: [u8; 8]) -> Self {
        let time = seconds.to_be_bytes();
        Self([
            time[0], time[1], time[2], time[3], rest[0], rest[1], rest[2], rest[3], rest[4],
            rest[5], rest[6], rest[7],
        ])
    }

    /// The raw identifier bytes.
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Creation time, in seconds since the Unix epoch.
    pub const fn timestamp_seconds(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{self}\")")
    }
}

/// Error returned when parsing an [`ObjectId`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectIdError {
    /// The input was not 24 characters long.
    InvalidLength {
        /// length of the rejected input
        len: usize,
    },
    /// The input contained a non-hex character.
    InvalidCharacter {
        /// the offending character
        c: char,
        /// its byte offset in the input
        index: usize,
    },
}

impl fmt::Display for ObjectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectIdError::InvalidLength { len } => {
                write!(f, "object id must be 24 hex digits, got {len} characters")
            }
            ObjectIdError::InvalidCharacter { c, index } => {
                write!(f, "invalid character {c:?} at offset {index} in object id")
            }
        }
    }
}

impl core::error::Error for ObjectIdError {}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 {
            return Err(ObjectIdError::InvalidLength {
                len: s.chars().count(),
            });
        }
        let mut bytes = [0u8; 12];
        for (index, c) in s.char_indices() {
            let nibble = c
                .to_digit(16)
                .ok_or(ObjectIdError::InvalidCharacter { c, index })? as u8;
            bytes[index / 2] |= if index % 2 == 0 { nibble << 4 } else { nibble };
        }
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip_through_text() {
        let id: ObjectId = "5627B47D54b92d03adb9e9cf".parse().unwrap();
        assert_eq!(id.to_string(), "5627b47d54b92d03adb9e9cf");
        assert_eq!(format!("{id:?}"), "ObjectId(\"5627b47d54b92d03adb9e9cf\")");
    }

    #[test]
    fn from_parts_puts_time_first() {
        let id = ObjectId::from_parts(7, [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(id.to_string(), "000000070000000000000001");
        assert_eq!(id.timestamp_seconds(), 7);
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            "abc".parse::<ObjectId>(),
            Err(ObjectIdError::InvalidLength { len: 3 })
        );
        assert_eq!(
            "5627b47d54b92d03adb9e9cz".parse::<ObjectId>(),
            Err(ObjectIdError::InvalidCharacter { c: 'z', index: 23 })
        );
    }
}
