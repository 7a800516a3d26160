use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use uuid::Uuid;

/// Decimal amount as it travels on the wire.
///
/// Deserializes from a JSON string (`"10.50"`) or a JSON number (`10`,
/// `10.5`). Numbers keep the exact text of the request body, so
/// `90071992547409.93` reaches the server digit for digit and
/// `1.0000000000000001` is still seen with all its decimals. Always
/// serializes as a string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `arbitrary_precision` makes `Number` carry the literal as written.
        match Value::deserialize(deserializer)? {
            Value::String(raw) => Ok(Amount(raw)),
            Value::Number(number) => Ok(Amount(number.to_string())),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a decimal amount as string or number",
            )),
        }
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(flag) => de::Unexpected::Bool(*flag),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
        Value::String(raw) => de::Unexpected::Str(raw),
        Value::Number(_) => de::Unexpected::Other("number"),
    }
}

/// Status payload used by health checks and successful mutations.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub code: String,
    pub message: String,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            code: "01".to_string(),
            message: "OK".to_string(),
        }
    }
}

/// Error payload returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub error: String,
}

pub mod balance {
    use super::*;

    /// Body of `POST /user/balance/increase` and `POST /user/balance/reduce`.
    ///
    /// `user_guid` stays a string so a malformed id reaches the engine and is
    /// reported as a validation error rather than a JSON decoding failure.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceChange {
        pub user_guid: String,
        pub operation_ref: String,
        pub amount: Amount,
    }

    /// Result of a balance change.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceChanged {
        pub code: String,
        pub message: String,
        /// `false` when the operation reference had already been applied.
        pub applied: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserBalance {
        pub guid: Uuid,
        pub amount: Amount,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub guid: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserRegistered {
        pub guid: Uuid,
        pub created: bool,
    }
}
