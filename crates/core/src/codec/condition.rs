// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conditional-write expressions
//!
//! A [`Condition`] renders to the store's textual vocabulary
//! (`attribute_not_exists(#partitionKey) or (guid = :guid ...)`) and can be
//! evaluated directly against an item by local backends.

use super::{AttributeValue, Item, FENCING_TOKEN, GUID};
use crate::id::KeySchema;
use std::collections::BTreeMap;
use std::fmt;

const PARTITION_PLACEHOLDER: &str = "#partitionKey";
const SORT_PLACEHOLDER: &str = "#sortKey";

/// Left-hand side of a comparison
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// A key attribute, addressed through an expression attribute name
    Key {
        placeholder: &'static str,
        name: String,
    },
    /// A fixed record attribute
    Attribute(&'static str),
}

impl Operand {
    pub fn name(&self) -> &str {
        match self {
            Operand::Key { name, .. } => name,
            Operand::Attribute(name) => name,
        }
    }

    fn render(&self, names: &mut BTreeMap<String, String>) -> String {
        match self {
            Operand::Key { placeholder, name } => {
                names.insert((*placeholder).to_string(), name.clone());
                (*placeholder).to_string()
            }
            Operand::Attribute(name) => (*name).to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Exists(Operand),
    NotExists(Operand),
    Equals(Operand, AttributeValue),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

/// Rendered form of a condition
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ConditionExpression {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, AttributeValue>,
}

impl Condition {
    /// No record exists for the key
    pub fn key_absent(schema: &KeySchema) -> Self {
        Self::for_key(schema, Condition::NotExists)
    }

    /// A record exists for the key
    pub fn key_exists(schema: &KeySchema) -> Self {
        Self::for_key(schema, Condition::Exists)
    }

    /// No record, or the record is unchanged since it was read
    pub fn absent_or_matches(
        schema: &KeySchema,
        identity_token: &str,
        fencing_token: Option<u64>,
    ) -> Self {
        let mut matches = vec![Condition::Equals(
            Operand::Attribute(GUID),
            AttributeValue::S(identity_token.to_string()),
        )];
        if let Some(fencing_token) = fencing_token {
            matches.push(Condition::Equals(
                Operand::Attribute(FENCING_TOKEN),
                AttributeValue::number(fencing_token),
            ));
        }
        Condition::Or(vec![Self::key_absent(schema), Condition::And(matches)])
    }

    /// The record exists and was last written with `identity_token`
    pub fn exists_and_matches(schema: &KeySchema, identity_token: &str) -> Self {
        Condition::And(vec![
            Self::key_exists(schema),
            Condition::Equals(
                Operand::Attribute(GUID),
                AttributeValue::S(identity_token.to_string()),
            ),
        ])
    }

    fn for_key(schema: &KeySchema, test: fn(Operand) -> Condition) -> Self {
        let partition = test(Operand::Key {
            placeholder: PARTITION_PLACEHOLDER,
            name: schema.partition_key.clone(),
        });
        match &schema.sort_key {
            None => partition,
            Some(sort_key) => Condition::And(vec![
                partition,
                test(Operand::Key {
                    placeholder: SORT_PLACEHOLDER,
                    name: sort_key.clone(),
                }),
            ]),
        }
    }

    pub fn render(&self) -> ConditionExpression {
        let mut names = BTreeMap::new();
        let mut values = BTreeMap::new();
        let expression = self.render_into(&mut names, &mut values, false);
        ConditionExpression {
            expression,
            names,
            values,
        }
    }

    fn render_into(
        &self,
        names: &mut BTreeMap<String, String>,
        values: &mut BTreeMap<String, AttributeValue>,
        nested: bool,
    ) -> String {
        match self {
            Condition::Exists(op) => format!("attribute_exists({})", op.render(names)),
            Condition::NotExists(op) => format!("attribute_not_exists({})", op.render(names)),
            Condition::Equals(op, value) => {
                let placeholder = format!(":{}", op.name());
                values.insert(placeholder.clone(), value.clone());
                format!("{} = {}", op.render(names), placeholder)
            }
            Condition::And(parts) => render_joined(parts, " and ", names, values, nested),
            Condition::Or(parts) => render_joined(parts, " or ", names, values, nested),
        }
    }

    /// Evaluate against the current item for the key (`None` when absent)
    pub fn evaluate(&self, item: Option<&Item>) -> bool {
        match self {
            Condition::Exists(op) => item.is_some_and(|i| i.contains_key(op.name())),
            Condition::NotExists(op) => !item.is_some_and(|i| i.contains_key(op.name())),
            Condition::Equals(op, value) => item.and_then(|i| i.get(op.name())) == Some(value),
            Condition::And(parts) => parts.iter().all(|c| c.evaluate(item)),
            Condition::Or(parts) => parts.iter().any(|c| c.evaluate(item)),
        }
    }
}

fn render_joined(
    parts: &[Condition],
    separator: &str,
    names: &mut BTreeMap<String, String>,
    values: &mut BTreeMap<String, AttributeValue>,
    nested: bool,
) -> String {
    if let [single] = parts {
        return single.render_into(names, values, nested);
    }
    let joined = parts
        .iter()
        .map(|c| c.render_into(names, values, true))
        .collect::<Vec<_>>()
        .join(separator);
    if nested {
        format!("({})", joined)
    } else {
        joined
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render().expression)
    }
}
