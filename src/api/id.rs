use juniper::{GraphQLScalar, InputValue, ScalarValue};
use std::fmt;

use crate::model::Key;


/// An opaque, unique identifier of a client or project.
///
/// It's the decimal representation of the record's key. The API accepts IDs
/// as strings or integers. Input that does not represent a valid key is not
/// rejected, but results in an ID that does not refer to anything. That way,
/// "invalid ID" and "no record with that ID" are indistinguishable for API
/// users and both just lead to `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, GraphQLScalar)]
#[graphql(
    name = "ID",
    description = "An opaque, unique identifier",
    parse_token(String, i32),
)]
pub(crate) struct Id {
    /// `None` for IDs that could not be parsed.
    key: Option<Key>,
}

impl Id {
    pub(crate) fn new(key: Key) -> Self {
        Self { key: Some(key) }
    }

    /// Returns the key this ID refers to or `None` if the ID is malformed.
    pub(crate) fn key(&self) -> Option<Key> {
        self.key
    }

    fn to_output<S: ScalarValue>(&self) -> juniper::Value<S> {
        juniper::Value::scalar(self.to_string())
    }

    fn from_input<S: ScalarValue>(input: &InputValue<S>) -> Result<Self, String> {
        if let Some(s) = input.as_string_value() {
            Ok(Self { key: s.parse().ok() })
        } else if let Some(n) = input.as_int_value() {
            Ok(Self { key: u64::try_from(n).ok().filter(|&n| n > 0).map(Key) })
        } else {
            Err(format!("expected ID (string or integer), found: {input}"))
        }
    }
}

impl From<Key> for Id {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key {
            Some(key) => key.fmt(f),
            None => f.write_str("<invalid>"),
        }
    }
}
