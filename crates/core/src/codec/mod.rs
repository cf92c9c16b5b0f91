// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record codec: lock records to store items and back
//!
//! Items use the DynamoDB attribute vocabulary: string (`S`) and
//! string-encoded number (`N`) scalars keyed by attribute name.

mod condition;

pub use condition::{Condition, ConditionExpression, Operand};

use crate::clock::millis;
use crate::id::{KeySchema, LockKey};
use crate::record::LockRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const OWNER: &str = "owner";
pub const GUID: &str = "guid";
pub const FENCING_TOKEN: &str = "fencingToken";
pub const LEASE_DURATION_MS: &str = "leaseDurationMs";
pub const LOCK_ACQUIRED_TIME_UNIX_MS: &str = "lockAcquiredTimeUnixMs";

/// Attribute names a key schema may not claim
pub const RESERVED_ATTRIBUTES: [&str; 5] = [
    OWNER,
    GUID,
    FENCING_TOKEN,
    LEASE_DURATION_MS,
    LOCK_ACQUIRED_TIME_UNIX_MS,
];

/// A scalar attribute value
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
}

impl AttributeValue {
    pub fn number(n: u64) -> Self {
        AttributeValue::N(n.to_string())
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttributeValue::N(n) => n.parse().ok(),
            AttributeValue::S(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            AttributeValue::N(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::S(s) => write!(f, "{}", s),
            AttributeValue::N(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::N(n.to_string())
    }
}

impl From<u64> for AttributeValue {
    fn from(n: u64) -> Self {
        AttributeValue::number(n)
    }
}

/// A stored item: attribute name to value
pub type Item = BTreeMap<String, AttributeValue>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("missing attribute: {0}")]
    Missing(String),
    #[error("invalid value for {attribute}: {value}")]
    Invalid { attribute: String, value: String },
}

/// Maps lock records to items for one key schema
#[derive(Clone, Debug)]
pub struct RecordCodec {
    schema: KeySchema,
}

impl RecordCodec {
    pub fn new(schema: KeySchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }

    /// Key attributes only
    pub fn encode_key(&self, key: &LockKey) -> Item {
        let mut item = Item::new();
        item.insert(self.schema.partition_key.clone(), key.partition.clone());
        if let (Some(sort_key), Some(sort)) = (&self.schema.sort_key, &key.sort) {
            item.insert(sort_key.clone(), sort.clone());
        }
        item
    }

    pub fn encode(&self, record: &LockRecord) -> Item {
        let mut item = self.encode_key(&record.key);
        item.insert(OWNER.to_string(), AttributeValue::S(record.owner.clone()));
        item.insert(
            GUID.to_string(),
            AttributeValue::S(record.identity_token.clone()),
        );
        if let Some(fencing_token) = record.fencing_token {
            item.insert(
                FENCING_TOKEN.to_string(),
                AttributeValue::number(fencing_token),
            );
        }
        if let Some(lease) = record.lease_duration {
            item.insert(
                LEASE_DURATION_MS.to_string(),
                AttributeValue::number(millis(lease)),
            );
        }
        if let Some(acquired) = record.lock_acquired_time_unix_ms {
            item.insert(
                LOCK_ACQUIRED_TIME_UNIX_MS.to_string(),
                AttributeValue::number(acquired),
            );
        }
        item
    }

    pub fn decode(&self, item: &Item) -> Result<LockRecord, CodecError> {
        let partition = required(item, &self.schema.partition_key)?.clone();
        let sort = match &self.schema.sort_key {
            Some(sort_key) => Some(required(item, sort_key)?.clone()),
            None => None,
        };
        let owner = string(item, OWNER)?;
        let identity_token = string(item, GUID)?;

        Ok(LockRecord {
            key: LockKey { partition, sort },
            owner,
            identity_token,
            fencing_token: number(item, FENCING_TOKEN)?,
            lease_duration: number(item, LEASE_DURATION_MS)?.map(Duration::from_millis),
            lock_acquired_time_unix_ms: number(item, LOCK_ACQUIRED_TIME_UNIX_MS)?,
        })
    }
}

fn required<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue, CodecError> {
    item.get(name)
        .ok_or_else(|| CodecError::Missing(name.to_string()))
}

fn string(item: &Item, name: &str) -> Result<String, CodecError> {
    let value = required(item, name)?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CodecError::Invalid {
            attribute: name.to_string(),
            value: value.to_string(),
        })
}

fn number(item: &Item, name: &str) -> Result<Option<u64>, CodecError> {
    match item.get(name) {
        None => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| CodecError::Invalid {
            attribute: name.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
