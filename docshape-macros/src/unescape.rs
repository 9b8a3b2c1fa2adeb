//! Escape processing for string literal contents.

/// Why a literal could not be unescaped, with the byte index of the offending
/// backslash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnescapeError {
    IllegalEscape { index: usize, found: char },
    TrailingBackslash { index: usize },
    InvalidHex { index: usize },
    InvalidUnicode { index: usize },
}

impl core::fmt::Display for UnescapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UnescapeError::IllegalEscape { index, found } => {
                write!(f, "unknown escape `\\{found}` at index {index}")
            }
            UnescapeError::TrailingBackslash { index } => {
                write!(f, "string ends after the backslash at index {index}")
            }
            UnescapeError::InvalidHex { index } => {
                write!(f, "invalid `\\x` escape at index {index}")
            }
            UnescapeError::InvalidUnicode { index } => {
                write!(f, "invalid `\\u{{..}}` escape at index {index}")
            }
        }
    }
}

type Chars<'a> = core::iter::Peekable<core::str::CharIndices<'a>>;

fn hex_escape(chars: &mut Chars<'_>, index: usize) -> Result<char, UnescapeError> {
    let mut value = 0u32;
    for _ in 0..2 {
        let digit = chars
            .next()
            .and_then(|(_, c)| c.to_digit(16))
            .ok_or(UnescapeError::InvalidHex { index })?;
        value = value * 16 + digit;
    }
    // only ASCII is allowed in string literals
    if value > 0x7f {
        return Err(UnescapeError::InvalidHex { index });
    }
    char::from_u32(value).ok_or(UnescapeError::InvalidHex { index })
}

fn unicode_escape(chars: &mut Chars<'_>, index: usize) -> Result<char, UnescapeError> {
    let invalid = UnescapeError::InvalidUnicode { index };
    if chars.next().map(|(_, c)| c) != Some('{') {
        return Err(invalid);
    }
    let mut value = 0u32;
    let mut digits = 0;
    loop {
        match chars.next() {
            Some((_, '}')) if digits > 0 => break,
            Some((_, '_')) => {}
            Some((_, c)) if digits < 6 => {
                value = value * 16 + c.to_digit(16).ok_or(invalid)?;
                digits += 1;
            }
            _ => return Err(invalid),
        }
    }
    char::from_u32(value).ok_or(invalid)
}

/// Resolves the escapes of a (non-raw) string literal body.
pub(crate) fn unescape(body: &str) -> Result<String, UnescapeError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '\\')) => out.push('\\'),
            Some((_, '"')) => out.push('"'),
            Some((_, '\'')) => out.push('\''),
            Some((_, 'n')) => out.push('\n'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, 't')) => out.push('\t'),
            Some((_, '0')) => out.push('\0'),
            Some((_, 'x')) => out.push(hex_escape(&mut chars, index)?),
            Some((_, 'u')) => out.push(unicode_escape(&mut chars, index)?),
            Some((_, '\n')) => {
                // line continuation skips the leading whitespace of the next line
                while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            }
            Some((_, found)) => return Err(UnescapeError::IllegalEscape { index, found }),
            None => return Err(UnescapeError::TrailingBackslash { index }),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_common_escapes() {
        assert_eq!(unescape(r#"a\"b\\c\n"#).unwrap(), "a\"b\\c\n");
        assert_eq!(unescape(r"\x41\u{e9}\u{1F600}").unwrap(), "Aé😀");
        assert_eq!(unescape("one \\\n      two").unwrap(), "one two");
    }

    #[test]
    fn reports_bad_escapes() {
        assert_eq!(
            unescape(r"ab\q"),
            Err(UnescapeError::IllegalEscape {
                index: 2,
                found: 'q'
            })
        );
        assert_eq!(unescape(r"\xff"), Err(UnescapeError::InvalidHex { index: 0 }));
        assert_eq!(unescape(r"\u{}"), Err(UnescapeError::InvalidUnicode { index: 0 }));
        assert_eq!(unescape("x\\"), Err(UnescapeError::TrailingBackslash { index: 1 }));
    }
}
