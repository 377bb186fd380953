//! Deep key-case conversion.
//!
//! Rewrites every object key in a JSON tree, recursing through arrays and
//! nested objects. Values are never touched.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::processor::JsonProcessor;

lazy_static! {
    // A run of separators, plus the character that follows it (if any).
    static ref SEPARATORS: Regex = Regex::new(r"[\-_\s]+(.)?").unwrap();
}

/// Key naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCase {
    /// `userName`
    Camel,
    /// `UserName`
    Pascal,
    /// `user_name`
    Snake,
    /// `user-name`
    Kebab,
}

impl KeyCase {
    /// Convert a single key into this case.
    ///
    /// Keys that read as numbers are returned unchanged.
    pub fn convert<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if is_numerical(key) {
            return Cow::Borrowed(key);
        }
        match self {
            KeyCase::Camel => Cow::Owned(camelize(key)),
            KeyCase::Pascal => Cow::Owned(upper_first(&camelize(key))),
            KeyCase::Snake => Cow::Owned(decamelize(key, '_')),
            KeyCase::Kebab => Cow::Owned(decamelize(key, '-')),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            KeyCase::Camel => "camel",
            KeyCase::Pascal => "pascal",
            KeyCase::Snake => "snake",
            KeyCase::Kebab => "kebab",
        }
    }
}

/// Converts all object keys from one casing convention to another.
#[derive(Debug, Clone)]
pub struct KeyCaseProcessor {
    to: KeyCase,
    name: String,
}

impl KeyCaseProcessor {
    /// The source convention only names the processor; conversion is driven
    /// by the target, so mixed-case input is normalised too.
    pub fn new(from: KeyCase, to: KeyCase) -> Self {
        Self {
            to,
            name: format!("{}_to_{}", from.label(), to.label()),
        }
    }

    pub fn snake_to_camel() -> Self {
        Self::new(KeyCase::Snake, KeyCase::Camel)
    }

    pub fn camel_to_snake() -> Self {
        Self::new(KeyCase::Camel, KeyCase::Snake)
    }

    pub fn snake_to_pascal() -> Self {
        Self::new(KeyCase::Snake, KeyCase::Pascal)
    }

    pub fn pascal_to_snake() -> Self {
        Self::new(KeyCase::Pascal, KeyCase::Snake)
    }

    pub fn snake_to_kebab() -> Self {
        Self::new(KeyCase::Snake, KeyCase::Kebab)
    }

    pub fn kebab_to_snake() -> Self {
        Self::new(KeyCase::Kebab, KeyCase::Snake)
    }

    fn rewrite(&self, json: Value) -> Value {
        match json {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let key = self.to.convert(&key).into_owned();
                    out.insert(key, self.rewrite(value));
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|item| self.rewrite(item)).collect())
            }
            scalar => scalar,
        }
    }
}

impl JsonProcessor for KeyCaseProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_json(&self, json: Value) -> Value {
        self.rewrite(json)
    }
}

fn camelize(key: &str) -> String {
    let joined = SEPARATORS.replace_all(key, |caps: &Captures| {
        caps.get(1)
            .map(|m| m.as_str().to_uppercase())
            .unwrap_or_default()
    });
    lower_first(&joined)
}

/// Insert `separator` before every ASCII uppercase letter (except a leading
/// one) and lowercase the result.
///
/// A single separator between two alphanumerics is swapped for `separator`.
/// Leading, trailing and repeated separators are kept, so `_id` and `id`
/// stay distinct keys.
fn decamelize(key: &str, separator: char) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        let between_words = i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_alphanumeric()
            && chars[i + 1].is_alphanumeric();
        if between_words && is_separator(c) {
            out.push(separator);
            continue;
        }
        if i > 0 && c.is_ascii_uppercase() {
            out.push(separator);
        }
        out.push(c);
    }
    out.to_lowercase()
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c.is_whitespace()
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_numerical(key: &str) -> bool {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return true;
    }
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    if unsigned.starts_with(|c: char| c.is_ascii_alphabetic()) {
        // f64 parsing would accept "inf" and "nan"
        return unsigned == "Infinity";
    }
    trimmed.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camelize_keys() {
        assert_eq!(KeyCase::Camel.convert("user_name"), "userName");
        assert_eq!(KeyCase::Camel.convert("created-at"), "createdAt");
        assert_eq!(KeyCase::Camel.convert("first  name"), "firstName");
        assert_eq!(KeyCase::Camel.convert("UserName"), "userName");
        assert_eq!(KeyCase::Camel.convert("already"), "already");
        assert_eq!(KeyCase::Camel.convert("trailing_"), "trailing");
    }

    #[test]
    fn test_snake_keys() {
        assert_eq!(KeyCase::Snake.convert("userName"), "user_name");
        assert_eq!(KeyCase::Snake.convert("UserName"), "user_name");
        assert_eq!(KeyCase::Snake.convert("user-name"), "user_name");
        assert_eq!(KeyCase::Snake.convert("user_name"), "user_name");
    }

    #[test]
    fn test_snake_keeps_leading_and_repeated_separators() {
        assert_eq!(KeyCase::Snake.convert("_id"), "_id");
        assert_eq!(KeyCase::Snake.convert("__v"), "__v");
        assert_eq!(KeyCase::Snake.convert("_createdAt"), "_created_at");
        assert_eq!(KeyCase::Snake.convert("a__b"), "a__b");
        assert_eq!(KeyCase::Kebab.convert("_id"), "_id");
        assert_eq!(KeyCase::Kebab.convert("page_size"), "page-size");
    }

    #[test]
    fn test_decamelize_does_not_merge_keys() {
        let input = json!({"_id": 1, "id": 2, "__v": 0, "nested": [{"_id": "x", "id": "y"}]});
        let out = KeyCaseProcessor::camel_to_snake().process_json(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn test_pascal_and_kebab_keys() {
        assert_eq!(KeyCase::Pascal.convert("user_name"), "UserName");
        assert_eq!(KeyCase::Kebab.convert("user_name"), "user-name");
        assert_eq!(KeyCase::Kebab.convert("userName"), "user-name");
    }

    #[test]
    fn test_numeric_keys_unchanged() {
        assert_eq!(KeyCase::Camel.convert("42"), "42");
        assert_eq!(KeyCase::Snake.convert("1e5"), "1e5");
        assert_eq!(KeyCase::Camel.convert("nan_value"), "nanValue");
    }

    #[test]
    fn test_deep_rewrite() {
        let input = json!({
            "user_name": "a_b",
            "home_address": {"street_name": "x", "zip_code": 1},
            "phone_numbers": [{"country_code": "+1"}, "plain_string", 3]
        });
        let out = KeyCaseProcessor::snake_to_camel().process_json(input);
        assert_eq!(
            out,
            json!({
                "userName": "a_b",
                "homeAddress": {"streetName": "x", "zipCode": 1},
                "phoneNumbers": [{"countryCode": "+1"}, "plain_string", 3]
            })
        );
    }

    #[test]
    fn test_inverse_pair_round_trips() {
        let input = json!({"user_name": "a", "items": [{"item_id": 1}]});
        let there = KeyCaseProcessor::snake_to_camel().process_json(input.clone());
        let back = KeyCaseProcessor::camel_to_snake().process_json(there);
        assert_eq!(back, input);
    }

    #[test]
    fn test_scalars_pass_through() {
        let p = KeyCaseProcessor::camel_to_snake();
        assert_eq!(p.process_json(json!("someValue")), json!("someValue"));
        assert_eq!(p.process_json(Value::Null), Value::Null);
    }

    #[test]
    fn test_processor_name() {
        assert_eq!(KeyCaseProcessor::pascal_to_snake().name(), "pascal_to_snake");
    }
}
