//! Encoding: value tree to textual payload.
//!
//! Encoding runs in two phases. A depth-first walk turns every leaf into an
//! interned literal form and every composite into an interned structure form,
//! leaving placeholder tokens (`?n` for literals, `+n` for structures) in the
//! structure bodies. A rewrite pass then counts placeholder occurrences
//! across the structure bodies, lifts anything seen twice or more into the
//! dictionary prefix as a `$m` back-reference, and inlines the rest. The
//! placeholder sigils never survive into the finished payload.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbols;
use crate::value::Value;

/// Matches one intermediate placeholder inside a structure body. Bodies
/// contain only delimiters, constants, and placeholders until they are
/// resolved, so this never matches inside literal text.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?+][0-9]+").expect("placeholder pattern"));

/// Encode a value tree into a single textual payload.
///
/// The output is `dictionary NUL content` when any substructure repeats, and
/// bare `content` otherwise. Total on all finite value trees; a Rust `Value`
/// is a tree by construction, so the cyclic-input hazard of reference-graph
/// hosts cannot arise here.
pub fn encode(value: &Value) -> String {
    let mut enc = Encoder::default();
    let content = enc.encode_value(value);
    enc.finish(content)
}

#[derive(Default)]
struct Encoder {
    /// Literal forms by id; `?n` resolves to `literals[n]`.
    literals: Vec<String>,
    literal_ids: HashMap<String, usize>,
    /// Structure bodies by id, in depth-first post-order; `+n` resolves to
    /// `structures[n]`, and every `+k` inside a body satisfies `k < n`.
    structures: Vec<String>,
    structure_ids: HashMap<String, usize>,
}

impl Encoder {
    fn intern_literal(&mut self, form: String) -> String {
        let id = match self.literal_ids.get(&form) {
            Some(&id) => id,
            None => {
                let id = self.literals.len();
                self.literals.push(form.clone());
                self.literal_ids.insert(form, id);
                id
            }
        };
        format!("?{}", id)
    }

    fn intern_structure(&mut self, body: String) -> String {
        let id = match self.structure_ids.get(&body) {
            Some(&id) => id,
            None => {
                let id = self.structures.len();
                self.structures.push(body.clone());
                self.structure_ids.insert(body, id);
                id
            }
        };
        format!("+{}", id)
    }

    /// Produce the token for one value: a constant emitted inline, or a
    /// placeholder for an interned literal or structure.
    fn encode_value(&mut self, value: &Value) -> String {
        match value {
            Value::Null => ":n".to_string(),
            Value::Bool(true) => ":t".to_string(),
            Value::Bool(false) => ":f".to_string(),
            Value::Number(n) => self.encode_number(*n),
            Value::BigInt(n) => self.intern_literal(format!("%{}", n)),
            Value::String(s) => {
                let form = string_form(s);
                self.intern_literal(form)
            }
            Value::Array(items) => {
                let mut body = String::from(symbols::ARRAY_OPEN);
                for item in items {
                    let tok = self.encode_value(item);
                    body.push_str(&tok);
                }
                body.push(symbols::ARRAY_CLOSE);
                self.intern_structure(body)
            }
            Value::Object(map) => self.encode_object(map),
        }
    }

    fn encode_number(&mut self, n: f64) -> String {
        if n.is_nan() {
            ":nan".to_string()
        } else if n == f64::INFINITY {
            ":inf".to_string()
        } else if n == f64::NEG_INFINITY {
            ":ninf".to_string()
        } else {
            // f64 Display is the shortest decimal that round-trips, and it
            // never uses exponent notation, so it stays inside the grammar.
            self.intern_literal(format!("#{}", n))
        }
    }

    /// Objects take one of three shapes by key count: `{}`, `{key val}`, or
    /// `{keyArr val…}` with the keys listed in an inner array token.
    fn encode_object(&mut self, map: &IndexMap<String, Value>) -> String {
        let mut body = String::from(symbols::OBJECT_OPEN);
        if map.len() == 1 {
            for (key, val) in map {
                let key_tok = {
                    let form = string_form(key);
                    self.intern_literal(form)
                };
                body.push_str(&key_tok);
                let val_tok = self.encode_value(val);
                body.push_str(&val_tok);
            }
        } else if map.len() >= 2 {
            let mut keys = String::from(symbols::ARRAY_OPEN);
            for key in map.keys() {
                let form = string_form(key);
                let tok = self.intern_literal(form);
                keys.push_str(&tok);
            }
            keys.push(symbols::ARRAY_CLOSE);
            let keys_tok = self.intern_structure(keys);
            body.push_str(&keys_tok);
            for val in map.values() {
                let tok = self.encode_value(val);
                body.push_str(&tok);
            }
        }
        body.push(symbols::OBJECT_CLOSE);
        self.intern_structure(body)
    }

    /// The rewrite pass. Duplicate literals are lifted first in literal-id
    /// order, then every structure body is resolved in insertion order, with
    /// duplicated structures lifted as they are reached. The order fixes the
    /// `$m` numbering the decoder will reproduce by reading the dictionary
    /// left to right.
    fn finish(mut self, content: String) -> String {
        // Occurrences are counted across structure bodies only; the root
        // content does not contribute.
        let mut counts: HashMap<String, usize> = HashMap::new();
        for body in &self.structures {
            for tag in PLACEHOLDER.find_iter(body) {
                *counts.entry(tag.as_str().to_string()).or_insert(0) += 1;
            }
        }
        let duplicated = |tag: &str| counts.get(tag).copied().unwrap_or(0) >= 2;

        let mut refs: HashMap<String, String> = HashMap::new();
        let mut dictionary = String::new();

        for (id, form) in self.literals.iter().enumerate() {
            let tag = format!("?{}", id);
            if duplicated(&tag) {
                refs.insert(tag, format!("${}", refs.len()));
                dictionary.push_str(form);
            }
        }

        for id in 0..self.structures.len() {
            let body = std::mem::take(&mut self.structures[id]);
            let resolved = resolve(&body, &refs, &self.literals, &self.structures);
            self.structures[id] = resolved;
            let tag = format!("+{}", id);
            if duplicated(&tag) {
                refs.insert(tag, format!("${}", refs.len()));
                dictionary.push_str(&self.structures[id]);
            }
        }

        let content = resolve(&content, &refs, &self.literals, &self.structures);
        if dictionary.is_empty() {
            content
        } else {
            format!("{}{}{}", dictionary, symbols::SEPARATOR, content)
        }
    }
}

/// Replace every placeholder in `body` with its `$m` reference, or inline its
/// resolved form. Single pass over the original body: substituted text is
/// never rescanned, so literal content that happens to look like a
/// placeholder stays untouched.
fn resolve(
    body: &str,
    refs: &HashMap<String, String>,
    literals: &[String],
    structures: &[String],
) -> String {
    PLACEHOLDER
        .replace_all(body, |caps: &regex::Captures| {
            let tag = &caps[0];
            if let Some(reference) = refs.get(tag) {
                return reference.clone();
            }
            let id: usize = tag[1..].parse().expect("interned placeholder id");
            if tag.starts_with('?') {
                literals[id].clone()
            } else {
                structures[id].clone()
            }
        })
        .into_owned()
}

/// A string literal form: the sigil, then the characters with every
/// escaping-set member preceded by a backslash.
fn string_form(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    out.push(symbols::STRING);
    for c in s.chars() {
        if symbols::must_escape(c) {
            out.push(symbols::ESCAPE);
        }
        out.push(c);
    }
    out
}
