//! Library error types.

use std::fmt;

use serde::{de, ser};

/// A tsion Result, normally returning a tsion [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Longest token excerpt quoted in an error message.
const ELIDE_LEN: usize = 12;

/// Truncate a token body for use in an error message.
pub(crate) fn elide(token: &str) -> String {
    if token.chars().count() <= ELIDE_LEN {
        token.to_string()
    } else {
        let mut out: String = token.chars().take(ELIDE_LEN).collect();
        out.push('…');
        out
    }
}

/// A tsion error. Encompasses any issue that can happen while decoding a
/// payload or while converting to and from [`Value`](crate::Value) through
/// serde.
///
/// Decode errors quote the offending token, truncated to a short excerpt.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The top-level payload shape is wrong: empty input, a separator with
    /// nothing after it, or more than one token where a single value was
    /// expected.
    BadInput(String),
    /// A token started with a character that opens no token kind.
    UnexpectedCharacter(String),
    /// A `:` token named none of the six known constants.
    UnknownConstant(String),
    /// A `#` token body did not match the decimal number grammar.
    BadNumber(String),
    /// A `%` token body did not match the decimal integer grammar.
    BadBigInt(String),
    /// A backslash was followed by a character outside the escaping set.
    BadEscape(String),
    /// A backslash was the last character of the input.
    TruncatedEscape,
    /// An array token ran out of input before its `]`.
    UnclosedArray,
    /// An object token ran out of input before its `}`.
    UnclosedObject,
    /// The first token of an object was neither a string nor an array of at
    /// least two strings.
    InvalidKey(String),
    /// An object held a different number of values than keys.
    ValueCountMismatch {
        /// Number of keys declared by the key token
        keys: usize,
        /// Number of value tokens actually present
        values: usize,
    },
    /// A `$` token body was not a decimal index.
    BadReference(String),
    /// A `$` token referenced a dictionary entry that does not exist yet.
    UnknownReference(String),
    /// Input continued after the final content value.
    TrailingInput(String),
    /// Composite nesting exceeded [`MAX_DEPTH`](crate::MAX_DEPTH).
    DepthLimit,
    /// Occurs when serde serialization or deserialization fails.
    Serde(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadInput(ref msg) => write!(f, "Bad input: {}", msg),
            Error::UnexpectedCharacter(ref tok) => {
                write!(f, "Unexpected character at \"{}\"", tok)
            }
            Error::UnknownConstant(ref tok) => write!(f, "Unknown constant \":{}\"", tok),
            Error::BadNumber(ref tok) => write!(f, "Invalid number \"#{}\"", tok),
            Error::BadBigInt(ref tok) => write!(f, "Invalid big integer \"%{}\"", tok),
            Error::BadEscape(ref tok) => write!(f, "Invalid escape character \"{}\"", tok),
            Error::TruncatedEscape => write!(f, "Truncated escape at end of input"),
            Error::UnclosedArray => write!(f, "Array is missing its closing \"]\""),
            Error::UnclosedObject => write!(f, "Object is missing its closing \"}}\""),
            Error::InvalidKey(ref tok) => {
                write!(f, "Invalid key or list of keys \"{}\"", tok)
            }
            Error::ValueCountMismatch { keys, values } => write!(
                f,
                "Unexpected number of values: {} keys but {} values",
                keys, values
            ),
            Error::BadReference(ref tok) => write!(f, "Invalid back-reference \"${}\"", tok),
            Error::UnknownReference(ref tok) => {
                write!(f, "Unknown back-reference \"${}\"", tok)
            }
            Error::TrailingInput(ref tok) => {
                write!(f, "Unexpected input after content value: \"{}\"", tok)
            }
            Error::DepthLimit => write!(f, "Depth limit exceeded"),
            Error::Serde(ref msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Serde(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Serde(msg.to_string())
    }
}
