//! Case-insensitive, order-preserving header storage.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::message::error::{MessageError, MessageResult};

static HEADER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9'-]+$").expect("static header name pattern"));

/// Conversion of scalar header input into a list of values.
pub trait IntoHeaderValues {
    fn into_header_values(self) -> Vec<String>;
}

impl IntoHeaderValues for &str {
    fn into_header_values(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoHeaderValues for String {
    fn into_header_values(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoHeaderValues for &String {
    fn into_header_values(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoHeaderValues for Vec<String> {
    fn into_header_values(self) -> Vec<String> {
        self
    }
}

impl IntoHeaderValues for Vec<&str> {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoHeaderValues for [&str; N] {
    fn into_header_values(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

macro_rules! numeric_header_values {
    ($($ty:ty),*) => {
        $(
            impl IntoHeaderValues for $ty {
                fn into_header_values(self) -> Vec<String> {
                    vec![self.to_string()]
                }
            }
        )*
    };
}

numeric_header_values!(u16, u32, u64, usize, i32, i64);

/// Header map keyed by lower-cased name.
///
/// Distinct names keep their insertion order for enumeration; lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, Vec<String>)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(name, value)` pairs, validating each and grouping repeated names.
    pub fn from_pairs<I, N, V>(pairs: I) -> MessageResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            let values = vec![value.into()];
            validate(name.as_ref(), &values)?;
            map.append_unchecked(name.as_ref(), values);
        }
        Ok(map)
    }

    /// Build from pairs a host has already parsed off the wire.
    ///
    /// Names are taken as received; values are still checked for line breaks.
    pub(crate) fn from_received<I, N, V>(pairs: I) -> MessageResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            let values = vec![value.into()];
            validate_values(name.as_ref(), &values)?;
            map.append_unchecked(name.as_ref(), values);
        }
        Ok(map)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All values stored under `name`, empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.position(name)
            .map(|idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    /// Values joined with `", "`, empty string when absent.
    pub fn line(&self, name: &str) -> String {
        self.get(name).join(", ")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy with `name` replaced by `values`.
    pub fn with(&self, name: &str, values: Vec<String>) -> MessageResult<Self> {
        validate(name, &values)?;
        let mut next = self.clone();
        next.set_unchecked(name, values);
        Ok(next)
    }

    /// Copy with `values` appended to `name`.
    pub fn with_added(&self, name: &str, values: Vec<String>) -> MessageResult<Self> {
        validate(name, &values)?;
        let mut next = self.clone();
        next.append_unchecked(name, values);
        Ok(next)
    }

    /// Copy without `name`.
    pub fn without(&self, name: &str) -> Self {
        let mut next = self.clone();
        if let Some(idx) = next.position(name) {
            next.entries.remove(idx);
        }
        next
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((name.to_ascii_lowercase(), values)),
        }
    }

    fn append_unchecked(&mut self, name: &str, values: Vec<String>) {
        match self.position(name) {
            Some(idx) => self.entries[idx].1.extend(values),
            None => self.entries.push((name.to_ascii_lowercase(), values)),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.to_ascii_lowercase();
        self.entries.iter().position(|(stored, _)| *stored == name)
    }
}

fn validate(name: &str, values: &[String]) -> MessageResult<()> {
    if !HEADER_NAME.is_match(name) {
        return Err(MessageError::Message(format!(
            "The HTTP header name {name} is invalid."
        )));
    }
    validate_values(name, values)
}

fn validate_values(name: &str, values: &[String]) -> MessageResult<()> {
    if values.iter().any(|v| v.contains(['\r', '\n'])) {
        return Err(MessageError::Message(format!(
            "The HTTP header {name} contains a line break."
        )));
    }
    Ok(())
}
