//! Wire models exchanged with the bank REST API
//!
//! The backend formats money as display strings (`"50.00€"`) and timestamps
//! as `dd/MM/yyyy HH:mm:ss`; the deserializers below accept those as well as
//! plain integer cents and ISO timestamps.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::types::OperationKind;

/// Account snapshot as returned by `GET /accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique account identifier
    pub account_number: String,
    #[serde(default)]
    pub owner_name: String,
    /// Balance in cents, as reported by the backend
    #[serde(deserialize_with = "amount::deserialize")]
    pub current_balance: i64,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub created_at: Option<NaiveDateTime>,
}

/// Outgoing deposit/withdrawal payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub account_number: String,
    pub amount_in_cents: i64,
    pub description: String,
    /// Left empty by callers; the gateway fills it in
    pub operation: Option<OperationKind>,
}

impl OperationRequest {
    pub fn new(account_number: &str, amount_in_cents: i64, description: &str) -> Self {
        Self {
            account_number: account_number.to_string(),
            amount_in_cents,
            description: description.to_string(),
            operation: None,
        }
    }

    /// Copy of this request with `operation` set to `kind`
    pub fn with_operation(&self, kind: OperationKind) -> Self {
        Self {
            operation: Some(kind),
            ..self.clone()
        }
    }
}

/// Transaction record returned by the history endpoint and by submissions.
///
/// Submissions may also answer with an account-shaped body, so every field
/// is optional and `currentBalance` is accepted for `accountBalance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRecord {
    #[serde(default)]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub account_number: Option<String>,
    /// Amount of the operation in cents
    #[serde(default, alias = "amountInCents", deserialize_with = "amount::deserialize_opt")]
    pub amount: Option<i64>,
    /// Account balance after the operation, in cents
    #[serde(default, alias = "currentBalance", deserialize_with = "amount::deserialize_opt")]
    pub account_balance: Option<i64>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub transaction_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operation: Option<OperationKind>,
}

mod amount {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Cents(i64),
        Text(String),
    }

    impl RawAmount {
        fn into_cents<E: serde::de::Error>(self) -> Result<i64, E> {
            match self {
                RawAmount::Cents(cents) => Ok(cents),
                RawAmount::Text(text) => {
                    bankweb_utils::parse_cents(&text).map_err(E::custom)
                }
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        RawAmount::deserialize(deserializer)?.into_cents()
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        Option::<RawAmount>::deserialize(deserializer)?
            .map(RawAmount::into_cents::<D::Error>)
            .transpose()
    }
}

mod timestamp {
    use super::*;

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(text) if text.trim().is_empty() => Ok(None),
            Some(text) => bankweb_utils::parse_timestamp(&text)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", text))),
        }
    }
}
