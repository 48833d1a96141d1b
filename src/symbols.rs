//! Reserved characters of the wire format. For internal use only.
//!
//! Two disjoint sets open every token: sigils start a typed leaf token,
//! delimiters open and close composites. Any character from either set,
//! plus the backslash and the NUL separator, terminates a leaf token body,
//! so string literals must escape them.

/// Opens a constant token (`:n`, `:t`, `:f`, `:inf`, `:ninf`, `:nan`).
pub const CONSTANT: char = ':';
/// Opens a dictionary back-reference (`$n`).
pub const REFERENCE: char = '$';
/// Opens a string literal.
pub const STRING: char = '&';
/// Opens a finite-number literal.
pub const NUMBER: char = '#';
/// Opens a big-integer literal.
pub const BIG_INT: char = '%';

pub const ARRAY_OPEN: char = '[';
pub const ARRAY_CLOSE: char = ']';
pub const OBJECT_OPEN: char = '{';
pub const OBJECT_CLOSE: char = '}';

pub const ESCAPE: char = '\\';
/// Separates the dictionary prefix from the content. Emitted at most once.
pub const SEPARATOR: char = '\0';

pub fn is_sigil(c: char) -> bool {
    matches!(c, ':' | '$' | '&' | '#' | '%')
}

pub fn is_delimiter(c: char) -> bool {
    matches!(c, '[' | ']' | '{' | '}')
}

/// Characters that end a leaf token body. All are ASCII, so the decoder can
/// scan bytes without splitting a multi-byte character.
pub fn is_reserved(b: u8) -> bool {
    matches!(
        b,
        b':' | b'$' | b'&' | b'#' | b'%' | b'[' | b']' | b'{' | b'}' | b'\\' | 0
    )
}

/// Characters that must be backslash-escaped inside a string literal body.
/// A superset of the reserved set: tab, line feed, and carriage return do not
/// terminate a token but are escaped anyway.
pub fn must_escape(c: char) -> bool {
    is_sigil(c) || is_delimiter(c) || matches!(c, '\\' | '\0' | '\t' | '\n' | '\r')
}
