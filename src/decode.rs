//! Decoding: textual payload to value tree.
//!
//! The decoder scans left to right with a byte cursor. Every top-level token
//! before the NUL separator is appended to a growing dictionary, keyed by its
//! position; `$n` tokens resolve against that dictionary. The NUL flips the
//! scan into final-value mode: exactly one more token, then end of input.
//! Without a NUL the whole input must be a single token.

use indexmap::IndexMap;
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{elide, Error, Result};
use crate::symbols;
use crate::value::Value;
use crate::MAX_DEPTH;

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?(0|[1-9][0-9]*))?$")
        .expect("number pattern")
});

static BIG_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").expect("big integer pattern"));

/// Decode a textual payload into a value tree.
///
/// Fails with a descriptive [`Error`] on malformed input; no partial result
/// is returned.
pub fn decode(text: &str) -> Result<Value> {
    Decoder::new(text).run()
}

struct Decoder<'a> {
    source: &'a str,
    index: usize,
    dictionary: Vec<Value>,
}

impl<'a> Decoder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: 0,
            dictionary: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Value> {
        let mut separated = false;
        while let Some(b) = self.peek() {
            if b as char == symbols::SEPARATOR {
                self.index += 1;
                separated = true;
                break;
            }
            let value = self.read_token(0)?;
            self.dictionary.push(value);
        }

        if separated {
            if self.at_end() {
                return Err(Error::BadInput("no content after separator".to_string()));
            }
            let value = self.read_token(0)?;
            if !self.at_end() {
                return Err(Error::TrailingInput(elide(self.remainder())));
            }
            Ok(value)
        } else if self.dictionary.len() == 1 {
            Ok(self.dictionary.remove(0))
        } else {
            Err(Error::BadInput(format!(
                "expected a single value, found {} tokens",
                self.dictionary.len()
            )))
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.index).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.index..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    fn remainder(&self) -> &str {
        &self.source[self.index..]
    }

    /// Read one complete token. The first character fixes the kind.
    fn read_token(&mut self, depth: usize) -> Result<Value> {
        if depth >= MAX_DEPTH {
            return Err(Error::DepthLimit);
        }
        let first = match self.peek() {
            Some(b) => b,
            None => return Err(Error::BadInput("unexpected end of input".to_string())),
        };
        match first as char {
            symbols::REFERENCE => self.read_reference(),
            symbols::CONSTANT => self.read_constant(),
            symbols::STRING => self.read_string(),
            symbols::NUMBER => self.read_number(),
            symbols::BIG_INT => self.read_big_int(),
            symbols::ARRAY_OPEN => self.read_array(depth),
            symbols::OBJECT_OPEN => self.read_object(depth),
            _ => Err(Error::UnexpectedCharacter(elide(self.remainder()))),
        }
    }

    /// Consume token characters up to the next reserved byte or end of
    /// input. Reserved bytes are ASCII, so the slice ends on a character
    /// boundary.
    fn scan_body(&mut self) -> &'a str {
        let start = self.index;
        while let Some(b) = self.peek() {
            if symbols::is_reserved(b) {
                break;
            }
            self.index += 1;
        }
        &self.source[start..self.index]
    }

    fn read_constant(&mut self) -> Result<Value> {
        self.index += 1;
        let body = self.scan_body();
        match body {
            "n" => Ok(Value::Null),
            "t" => Ok(Value::Bool(true)),
            "f" => Ok(Value::Bool(false)),
            "inf" => Ok(Value::Number(f64::INFINITY)),
            "ninf" => Ok(Value::Number(f64::NEG_INFINITY)),
            "nan" => Ok(Value::Number(f64::NAN)),
            _ => Err(Error::UnknownConstant(elide(body))),
        }
    }

    fn read_number(&mut self) -> Result<Value> {
        self.index += 1;
        let body = self.scan_body();
        if !NUMBER.is_match(body) {
            return Err(Error::BadNumber(elide(body)));
        }
        let n: f64 = body.parse().map_err(|_| Error::BadNumber(elide(body)))?;
        Ok(Value::Number(n))
    }

    fn read_big_int(&mut self) -> Result<Value> {
        self.index += 1;
        let body = self.scan_body();
        if !BIG_INT.is_match(body) {
            return Err(Error::BadBigInt(elide(body)));
        }
        let n: BigInt = body.parse().map_err(|_| Error::BadBigInt(elide(body)))?;
        Ok(Value::BigInt(n))
    }

    fn read_string(&mut self) -> Result<Value> {
        self.index += 1;
        let mut out = String::new();
        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.index += 1;
                let c = match self.peek_char() {
                    Some(c) => c,
                    None => return Err(Error::TruncatedEscape),
                };
                if !symbols::must_escape(c) {
                    return Err(Error::BadEscape(c.to_string()));
                }
                out.push(c);
                self.index += c.len_utf8();
            } else if symbols::is_reserved(b) {
                break;
            } else {
                match self.peek_char() {
                    Some(c) => {
                        out.push(c);
                        self.index += c.len_utf8();
                    }
                    None => break,
                }
            }
        }
        Ok(Value::String(out))
    }

    fn read_reference(&mut self) -> Result<Value> {
        self.index += 1;
        let body = self.scan_body();
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::BadReference(elide(body)));
        }
        let id: usize = body
            .parse()
            .map_err(|_| Error::UnknownReference(elide(body)))?;
        match self.dictionary.get(id) {
            Some(value) => Ok(value.clone()),
            None => Err(Error::UnknownReference(elide(body))),
        }
    }

    fn read_array(&mut self, depth: usize) -> Result<Value> {
        self.index += 1;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return Err(Error::UnclosedArray),
                Some(b']') => {
                    self.index += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => items.push(self.read_token(depth + 1)?),
            }
        }
    }

    /// The first token of a non-empty object declares its keys: a string for
    /// a single-entry object, or an array of at least two strings.
    fn read_object(&mut self, depth: usize) -> Result<Value> {
        self.index += 1;
        if self.peek() == Some(b'}') {
            self.index += 1;
            return Ok(Value::Object(IndexMap::new()));
        }

        let key_start = self.index;
        let key_token = self.read_token(depth + 1)?;
        let key_text = &self.source[key_start..self.index];
        let keys: Vec<String> = match key_token {
            Value::String(s) => vec![s],
            Value::Array(items) if items.len() >= 2 => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => keys.push(s),
                        _ => return Err(Error::InvalidKey(elide(key_text))),
                    }
                }
                keys
            }
            _ => return Err(Error::InvalidKey(elide(key_text))),
        };

        let mut values = Vec::with_capacity(keys.len());
        loop {
            match self.peek() {
                None => return Err(Error::UnclosedObject),
                Some(b'}') => {
                    self.index += 1;
                    break;
                }
                Some(_) => values.push(self.read_token(depth + 1)?),
            }
        }
        if values.len() != keys.len() {
            return Err(Error::ValueCountMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }
        Ok(Value::Object(keys.into_iter().zip(values).collect()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::encode;

    fn obj(entries: Vec<(&str, Value)>) -> Value {
        Value::Object(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    mod constants {
        use super::*;

        #[test]
        fn all_six() {
            assert_eq!(decode(":n").unwrap(), Value::Null);
            assert_eq!(decode(":t").unwrap(), Value::Bool(true));
            assert_eq!(decode(":f").unwrap(), Value::Bool(false));
            assert_eq!(decode(":inf").unwrap(), Value::Number(f64::INFINITY));
            assert_eq!(decode(":ninf").unwrap(), Value::Number(f64::NEG_INFINITY));
            assert!(matches!(decode(":nan").unwrap(), Value::Number(n) if n.is_nan()));
        }

        #[test]
        fn unknown_name() {
            assert_eq!(
                decode(":foo").unwrap_err(),
                Error::UnknownConstant("foo".to_string())
            );
            assert!(decode(":").is_err());
        }
    }

    mod strings {
        use super::*;

        #[test]
        fn plain() {
            assert_eq!(decode("&hello").unwrap(), Value::from("hello"));
            assert_eq!(decode("&").unwrap(), Value::from(""));
            assert_eq!(decode("&héllo wörld").unwrap(), Value::from("héllo wörld"));
        }

        #[test]
        fn escapes() {
            assert_eq!(decode("&a\\[b").unwrap(), Value::from("a[b"));
            assert_eq!(decode("&\\\\").unwrap(), Value::from("\\"));
            assert_eq!(decode("&x\\\ty").unwrap(), Value::from("x\ty"));
        }

        #[test]
        fn every_escaping_set_character_round_trips() {
            let s = ":$&#%[]{}\\\0\t\n\r";
            let payload = encode(&Value::from(s));
            assert_eq!(decode(&payload).unwrap(), Value::from(s));
        }

        #[test]
        fn invalid_escape() {
            assert_eq!(
                decode("&abc\\q").unwrap_err(),
                Error::BadEscape("q".to_string())
            );
        }

        #[test]
        fn truncated_escape() {
            assert_eq!(decode("&abc\\").unwrap_err(), Error::TruncatedEscape);
        }
    }

    mod numbers {
        use super::*;

        #[test]
        fn valid() {
            assert_eq!(decode("#42").unwrap(), Value::Number(42.0));
            assert_eq!(decode("#0").unwrap(), Value::Number(0.0));
            assert_eq!(decode("#-0").unwrap(), Value::Number(-0.0));
            assert_eq!(decode("#3.25").unwrap(), Value::Number(3.25));
            assert_eq!(decode("#-1.5e3").unwrap(), Value::Number(-1500.0));
            assert_eq!(decode("#2E+10").unwrap(), Value::Number(2e10));
            assert_eq!(decode("#7e-2").unwrap(), Value::Number(0.07));
        }

        #[test]
        fn invalid() {
            for bad in ["#01", "#", "#-", "#1.", "#.5", "#1e", "#1e01", "#--1", "#1.2.3"] {
                assert!(
                    matches!(decode(bad), Err(Error::BadNumber(_))),
                    "{:?} should be an invalid number",
                    bad
                );
            }
        }
    }

    mod big_ints {
        use super::*;
        use num_bigint::BigInt;

        #[test]
        fn valid() {
            assert_eq!(decode("%0").unwrap(), Value::BigInt(BigInt::from(0)));
            assert_eq!(decode("%-42").unwrap(), Value::BigInt(BigInt::from(-42)));
            let huge = "123456789012345678901234567890";
            assert_eq!(
                decode(&format!("%{}", huge)).unwrap(),
                Value::BigInt(huge.parse().unwrap())
            );
        }

        #[test]
        fn invalid() {
            for bad in ["%", "%007", "%1.5", "%--1", "%1e5"] {
                assert!(
                    matches!(decode(bad), Err(Error::BadBigInt(_))),
                    "{:?} should be an invalid big integer",
                    bad
                );
            }
        }
    }

    mod composites {
        use super::*;

        #[test]
        fn arrays() {
            assert_eq!(decode("[]").unwrap(), Value::Array(vec![]));
            assert_eq!(
                decode("[&a#1:t]").unwrap(),
                Value::Array(vec![Value::from("a"), Value::Number(1.0), Value::Bool(true)])
            );
            assert_eq!(
                decode("[[#1][#2]]").unwrap(),
                Value::Array(vec![
                    Value::Array(vec![Value::Number(1.0)]),
                    Value::Array(vec![Value::Number(2.0)]),
                ])
            );
        }

        #[test]
        fn missing_array_closer() {
            assert_eq!(decode("[&hello").unwrap_err(), Error::UnclosedArray);
        }

        #[test]
        fn objects() {
            assert_eq!(decode("{}").unwrap(), obj(vec![]));
            assert_eq!(
                decode("{&k#1}").unwrap(),
                obj(vec![("k", Value::Number(1.0))])
            );
            assert_eq!(
                decode("{[&x&y]#1#2}").unwrap(),
                obj(vec![("x", Value::Number(1.0)), ("y", Value::Number(2.0))])
            );
        }

        #[test]
        fn key_order_is_preserved() {
            let decoded = decode("{[&z&a&m]#1#2#3}").unwrap();
            let keys: Vec<&str> = decoded
                .as_object()
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect();
            assert_eq!(keys, ["z", "a", "m"]);
        }

        #[test]
        fn object_with_key_but_no_value() {
            assert_eq!(
                decode("{&k}").unwrap_err(),
                Error::ValueCountMismatch { keys: 1, values: 0 }
            );
        }

        #[test]
        fn object_with_too_many_values() {
            assert_eq!(
                decode("{&k#1#2}").unwrap_err(),
                Error::ValueCountMismatch { keys: 1, values: 2 }
            );
        }

        #[test]
        fn invalid_key_tokens() {
            // a number is not a key
            assert!(matches!(decode("{#1&v}"), Err(Error::InvalidKey(_))));
            // a single-element array is not a key list
            assert!(matches!(decode("{[&a]&v}"), Err(Error::InvalidKey(_))));
            // a key list must hold only strings
            assert!(matches!(decode("{[&a#2]&v&w}"), Err(Error::InvalidKey(_))));
        }

        #[test]
        fn missing_object_closer() {
            assert_eq!(decode("{&k#1").unwrap_err(), Error::UnclosedObject);
        }

        #[test]
        fn depth_limit() {
            let mut deep = String::new();
            for _ in 0..(MAX_DEPTH + 8) {
                deep.push('[');
            }
            assert_eq!(decode(&deep).unwrap_err(), Error::DepthLimit);
        }
    }

    mod references {
        use super::*;

        #[test]
        fn dictionary_lookup() {
            assert_eq!(
                decode("&a\0[$0$0]").unwrap(),
                Value::Array(vec![Value::from("a"), Value::from("a")])
            );
        }

        #[test]
        fn sequential_numbering() {
            let decoded = decode("&k{$0#1}\0[$1$1]").unwrap();
            let entry = obj(vec![("k", Value::Number(1.0))]);
            assert_eq!(decoded, Value::Array(vec![entry.clone(), entry]));
        }

        #[test]
        fn reference_as_object_key() {
            assert_eq!(
                decode("&k\0{$0#1}").unwrap(),
                obj(vec![("k", Value::Number(1.0))])
            );
        }

        #[test]
        fn reference_as_key_list() {
            assert_eq!(
                decode("[&x&y]\0{$0#1#2}").unwrap(),
                obj(vec![("x", Value::Number(1.0)), ("y", Value::Number(2.0))])
            );
        }

        #[test]
        fn unknown_reference() {
            assert_eq!(
                decode("$5").unwrap_err(),
                Error::UnknownReference("5".to_string())
            );
            // forward references are unknown too
            assert!(matches!(
                decode("[$0]\0$0"),
                Err(Error::UnknownReference(_))
            ));
        }

        #[test]
        fn malformed_reference() {
            assert!(matches!(decode("$"), Err(Error::BadReference(_))));
            assert!(matches!(decode("$1x"), Err(Error::BadReference(_))));
        }
    }

    mod top_level {
        use super::*;

        #[test]
        fn empty_input() {
            assert!(matches!(decode(""), Err(Error::BadInput(_))));
        }

        #[test]
        fn two_tokens_without_separator() {
            assert!(matches!(decode("&a&b"), Err(Error::BadInput(_))));
        }

        #[test]
        fn lone_separator() {
            assert!(matches!(decode("\0"), Err(Error::BadInput(_))));
        }

        #[test]
        fn separator_without_content() {
            assert!(matches!(decode("&a\0"), Err(Error::BadInput(_))));
        }

        #[test]
        fn trailing_tokens_after_content() {
            assert!(matches!(decode("&a\0&b&c"), Err(Error::TrailingInput(_))));
        }

        #[test]
        fn unexpected_first_character() {
            assert!(matches!(decode("hello"), Err(Error::UnexpectedCharacter(_))));
            assert!(matches!(decode("]"), Err(Error::UnexpectedCharacter(_))));
        }
    }

    mod roundtrip {
        use super::*;
        use num_bigint::BigInt;
        use rand::prelude::*;

        #[test]
        fn scalars() {
            let cases = vec![
                Value::Null,
                Value::Bool(true),
                Value::Bool(false),
                Value::Number(0.0),
                Value::Number(-0.0),
                Value::Number(42.0),
                Value::Number(3.141592653589793),
                Value::Number(1e300),
                Value::Number(5e-324),
                Value::Number(f64::MAX),
                Value::Number(f64::INFINITY),
                Value::Number(f64::NEG_INFINITY),
                Value::Number(f64::NAN),
                Value::BigInt(BigInt::from(i64::MAX)),
                Value::BigInt(format!("-{}", "9".repeat(40)).parse().unwrap()),
                Value::from(""),
                Value::from("hello"),
                Value::from("κόσμε ✓"),
            ];
            for case in cases {
                let payload = encode(&case);
                assert_eq!(decode(&payload).unwrap(), case, "payload {:?}", payload);
            }
        }

        #[test]
        fn nested() {
            let v = Value::Array(vec![
                obj(vec![
                    ("name", Value::from("one")),
                    ("tags", Value::Array(vec![Value::from("x"), Value::from("y")])),
                ]),
                obj(vec![
                    ("name", Value::from("two")),
                    ("tags", Value::Array(vec![Value::from("x"), Value::from("y")])),
                ]),
                Value::Null,
            ]);
            let payload = encode(&v);
            assert_eq!(decode(&payload).unwrap(), v);
        }

        fn random_value(rng: &mut impl Rng, depth: usize) -> Value {
            let pick = if depth >= 4 { rng.gen_range(0..5) } else { rng.gen_range(0..7) };
            match pick {
                0 => Value::Null,
                1 => Value::Bool(rng.gen()),
                2 => Value::Number((rng.gen_range(-1_000_000i64..1_000_000) as f64) / 8.0),
                3 => Value::BigInt(BigInt::from(rng.gen::<i128>())),
                4 => {
                    let len = rng.gen_range(0..12);
                    let s: String = rand::distributions::Alphanumeric
                        .sample_iter(&mut *rng)
                        .take(len)
                        .map(char::from)
                        .collect();
                    Value::String(s)
                }
                5 => {
                    let len = rng.gen_range(0..5);
                    Value::Array((0..len).map(|_| random_value(rng, depth + 1)).collect())
                }
                _ => {
                    let len = rng.gen_range(0..5);
                    Value::Object(
                        (0..len)
                            .map(|i| (format!("k{}", i), random_value(rng, depth + 1)))
                            .collect(),
                    )
                }
            }
        }

        #[test]
        fn randomized() {
            let mut rng = thread_rng();
            for _ in 0..200 {
                let v = random_value(&mut rng, 0);
                let payload = encode(&v);
                assert_eq!(decode(&payload).unwrap(), v, "payload {:?}", payload);
            }
        }

        #[test]
        fn dictionary_references_always_resolve() {
            // With many repeated substructures every reference in the payload
            // must point at an earlier dictionary entry.
            let leaf = obj(vec![("a", Value::from("x")), ("b", Value::from("x"))]);
            let mid = Value::Array(vec![leaf.clone(), leaf.clone()]);
            let v = Value::Array(vec![mid.clone(), mid, leaf]);
            let payload = encode(&v);
            assert_eq!(decode(&payload).unwrap(), v);
        }
    }
}
