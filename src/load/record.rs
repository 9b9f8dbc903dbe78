// src/load/record.rs

use serde::Serialize;
use std::{cmp::Ordering, fmt};

/// One row of an AS dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AsRecord {
    pub asn: String,
    pub organization: String,
    pub co2_intensity: f64,
}

/// One row of a link dataset. The org names are `None` for the plain
/// three-column layout, which carries no organization columns at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkRecord {
    pub as1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as1_org: Option<String>,
    pub as2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub as2_org: Option<String>,
    pub total_co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    As(AsRecord),
    Link(LinkRecord),
}

impl Record {
    /// The full-precision value the dataset is ordered by.
    pub fn key(&self) -> f64 {
        match self {
            Record::As(r) => r.co2_intensity,
            Record::Link(r) => r.total_co2,
        }
    }

    /// Display cells in column order.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Record::As(r) => vec![
                Value::Text(r.asn.clone()),
                Value::Text(r.organization.clone()),
                Value::Number(r.co2_intensity),
            ],
            Record::Link(r) => {
                let mut out = Vec::with_capacity(5);
                out.push(Value::Text(r.as1.clone()));
                if let Some(org) = &r.as1_org {
                    out.push(Value::Text(org.clone()));
                }
                out.push(Value::Text(r.as2.clone()));
                if let Some(org) = &r.as2_org {
                    out.push(Value::Text(org.clone()));
                }
                out.push(Value::Number(r.total_co2));
                out
            }
        }
    }
}

/// A single table cell. Numbers keep their full value for ordering and
/// only get rounded when displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Numbers order before text; numbers compare numerically.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // -0 shows as 0.00
            Value::Number(v) if *v == 0.0 => f.write_str("0.00"),
            Value::Number(v) => write!(f, "{:.2}", v),
        }
    }
}

/// Parse a numeric field, accepting only finite values.
pub(crate) fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
