use serde::{Deserialize, Serialize};

use ms_transaction::{Transaction, TransactionError};

/// A transaction as it appears inside a peer JSON message (spec §6): the
/// canonical wire `bytes`, hex-encoded, opaque to the framing layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionJson {
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

impl TransactionJson {
    pub fn from_transaction(tx: &Transaction) -> Self {
        TransactionJson {
            bytes: tx.bytes.clone(),
        }
    }

    pub fn into_transaction(self) -> Result<Transaction, TransactionError> {
        Transaction::parse(&self.bytes)
    }
}

/// Request: `{ "requestType": "getUnconfirmedTransactions" }` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUnconfirmedTransactionsRequest {
    #[serde(rename = "requestType")]
    pub request_type: RequestType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    #[serde(rename = "getUnconfirmedTransactions")]
    GetUnconfirmedTransactions,
}

impl Default for GetUnconfirmedTransactionsRequest {
    fn default() -> Self {
        GetUnconfirmedTransactionsRequest {
            request_type: RequestType::GetUnconfirmedTransactions,
        }
    }
}

/// Response: `{ "unconfirmedTransactions": [ <tx-json>, ... ] }` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnconfirmedTransactionsResponse {
    #[serde(rename = "unconfirmedTransactions")]
    pub unconfirmed_transactions: Vec<TransactionJson>,
}

/// Push: `{ "transactions": [ <tx-json>, ... ] }` (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsPush {
    pub transactions: Vec<TransactionJson>,
}
