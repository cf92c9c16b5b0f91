// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock identity: the caller-facing id, the resolved store key, and the
//! identity tokens that mark each write a holder makes

use crate::codec::AttributeValue;
use crate::error::LockError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of a lock as supplied by the caller
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LockId {
    /// Partition-only identity
    Simple(AttributeValue),
    /// Partition plus sort identity
    Composite {
        partition: AttributeValue,
        sort: AttributeValue,
    },
}

impl LockId {
    pub fn simple(partition: impl Into<AttributeValue>) -> Self {
        Self::Simple(partition.into())
    }

    pub fn composite(partition: impl Into<AttributeValue>, sort: impl Into<AttributeValue>) -> Self {
        Self::Composite {
            partition: partition.into(),
            sort: sort.into(),
        }
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockId::Simple(partition) => write!(f, "{}", partition),
            LockId::Composite { partition, sort } => write!(f, "{}/{}", partition, sort),
        }
    }
}

/// A lock identity resolved against the table's key schema
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub partition: AttributeValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<AttributeValue>,
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sort {
            Some(sort) => write!(f, "{}/{}", self.partition, sort),
            None => write!(f, "{}", self.partition),
        }
    }
}

/// Names of the key attributes of a lock table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    /// Resolve a caller-supplied id into a store key
    pub fn resolve(&self, id: LockId) -> Result<LockKey, LockError> {
        match (id, &self.sort_key) {
            (LockId::Simple(partition), None) => Ok(LockKey {
                partition,
                sort: None,
            }),
            (LockId::Composite { partition, sort }, Some(_)) => Ok(LockKey {
                partition,
                sort: Some(sort),
            }),
            (LockId::Simple(_), Some(_)) => Err(LockError::Validation(
                "lock id is missing required sort key value".to_string(),
            )),
            (LockId::Composite { .. }, None) => Err(LockError::Validation(
                "lock id has a sort key value but the table has no sort key".to_string(),
            )),
        }
    }
}

/// Source of identity tokens
///
/// Every write a holder makes carries a fresh token, and every conditional
/// write names the token it expects to replace.
pub trait TokenGen: Clone + Send + Sync + 'static {
    fn generate(&self) -> String;

    /// A token for the write that replaces `current`
    ///
    /// Never returns `current`: a renewal that reused its token would leave
    /// a stale copy of the handle able to match the record.
    fn rotate(&self, current: &str) -> String {
        loop {
            let token = self.generate();
            if token != current {
                return token;
            }
        }
    }
}

/// Random v4 UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidTokenGen;

impl TokenGen for UuidTokenGen {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// `<prefix>-1`, `<prefix>-2`, ... shared by every clone
#[derive(Clone, Debug)]
pub struct SequentialTokenGen {
    prefix: Arc<str>,
    issued: Arc<AtomicU64>,
}

impl SequentialTokenGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Arc::from(prefix.into()),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl Default for SequentialTokenGen {
    fn default() -> Self {
        Self::new("guid")
    }
}

impl TokenGen for SequentialTokenGen {
    fn generate(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
