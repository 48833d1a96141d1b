//! Tsion is a textual serialization format with automatic structural
//! deduplication. Encoding a [`Value`] tree yields a single payload in which
//! every repeated literal and every repeated substructure appears exactly
//! once, lifted into a dictionary prefix and referenced by compact `$n`
//! tokens:
//!
//! ```text
//! [dictionary NUL]? content
//! ```
//!
//! The dictionary is a flat run of self-terminating tokens; the decoder
//! numbers them `$0`, `$1`, … as it reads, so every entry only ever refers
//! backwards. When nothing repeats, the payload is the bare content with no
//! NUL and no references.
//!
//! ```
//! use tsion::{decode, encode, Value};
//!
//! let v = Value::Array(vec![Value::from("a"), Value::from("a")]);
//! let payload = encode(&v);
//! assert_eq!(payload, "&a\0[$0$0]");
//! assert_eq!(decode(&payload).unwrap(), v);
//! ```
//!
//! Arbitrary Rust types pass through serde on their way in and out:
//! [`to_value`] converts anything serializable into a [`Value`] tree and
//! [`from_value`] converts back.

mod symbols;

pub mod value;
pub use value::Value;

mod error;
pub use error::{Error, Result};

mod encode;
pub use encode::encode;

mod decode;
pub use decode::decode;

mod ser;
pub use ser::to_value;

mod de;
pub use de::from_value;

/// Maximum composite nesting the decoder accepts before failing with
/// [`Error::DepthLimit`].
pub const MAX_DEPTH: usize = 100;
