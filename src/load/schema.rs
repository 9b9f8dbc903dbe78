// src/load/schema.rs

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::record::{parse_finite, AsRecord, LinkRecord, Record};

/// The dataset layouts the site knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// `ASnumber,AS_ID,AS_Organization,CO2_Intensity`
    AsIntensity,
    /// Older three-column export: `ASN,Organization,CO2 Emissions`
    AsEmissions,
    /// `AS1,AS2,Total_CO2`
    LinkPlain,
    /// Links joined with CAIDA org names, which may contain commas.
    LinkEnriched,
}

/// How a line is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Split on `,` with no quote handling; fields are taken by position.
    Simple,
    /// Quote-aware CSV; fields are taken by header name.
    Quoted,
}

/// Where a record field lives in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub index: usize,
}

const fn col(name: &'static str, index: usize) -> Column {
    Column { name, index }
}

const AS_INTENSITY: &[Column] = &[
    col("ASnumber", 0),
    col("AS_Organization", 2),
    col("CO2_Intensity", 3),
];
const AS_EMISSIONS: &[Column] = &[
    col("ASN", 0),
    col("Organization", 1),
    col("CO2 Emissions", 2),
];
const LINK_PLAIN: &[Column] = &[col("AS1", 0), col("AS2", 1), col("Total_CO2", 2)];
const LINK_ENRICHED: &[Column] = &[
    col("AS1", 0),
    col("AS1_org_name", 2),
    col("AS2", 3),
    col("AS2_org_name", 5),
    col("Total_CO2", 6),
];

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::AsIntensity,
        SchemaKind::AsEmissions,
        SchemaKind::LinkPlain,
        SchemaKind::LinkEnriched,
    ];

    /// Source columns in record-field order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            SchemaKind::AsIntensity => AS_INTENSITY,
            SchemaKind::AsEmissions => AS_EMISSIONS,
            SchemaKind::LinkPlain => LINK_PLAIN,
            SchemaKind::LinkEnriched => LINK_ENRICHED,
        }
    }

    /// Number of fields a line must have in simple mode.
    pub fn width(self) -> usize {
        match self {
            SchemaKind::AsIntensity => 4,
            SchemaKind::AsEmissions | SchemaKind::LinkPlain => 3,
            SchemaKind::LinkEnriched => 7,
        }
    }

    /// Column titles shown above the table.
    pub fn titles(self) -> &'static [&'static str] {
        match self {
            SchemaKind::AsIntensity | SchemaKind::AsEmissions => {
                &["ASN", "Organization", "CO₂ Emissions"]
            }
            SchemaKind::LinkPlain => &["AS1", "AS2", "Total CO₂"],
            SchemaKind::LinkEnriched => &[
                "AS1",
                "AS1 Organization",
                "AS2",
                "AS2 Organization",
                "Total CO₂",
            ],
        }
    }

    /// Index of the sort key among the display columns (always the last one).
    pub fn key_column(self) -> usize {
        self.titles().len() - 1
    }

    pub fn default_mode(self) -> ParseMode {
        match self {
            SchemaKind::LinkEnriched => ParseMode::Quoted,
            _ => ParseMode::Simple,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaKind::AsIntensity => "as_intensity",
            SchemaKind::AsEmissions => "as_emissions",
            SchemaKind::LinkPlain => "link_plain",
            SchemaKind::LinkEnriched => "link_enriched",
        }
    }

    /// Build a typed record from fields already resolved into
    /// `columns()` order. Returns `None` if the row must be dropped.
    pub(crate) fn build(self, fields: &[Option<&str>]) -> Option<Record> {
        let text = |i: usize| fields.get(i).copied().flatten().unwrap_or_default().to_string();
        let number = |i: usize| fields.get(i).copied().flatten().and_then(parse_finite);

        match self {
            SchemaKind::AsIntensity | SchemaKind::AsEmissions => Some(Record::As(AsRecord {
                co2_intensity: number(2)?,
                asn: text(0),
                organization: text(1),
            })),
            SchemaKind::LinkPlain => {
                let total_co2 = number(2).filter(|v| *v > 0.0)?;
                Some(Record::Link(LinkRecord {
                    as1: text(0),
                    as1_org: None,
                    as2: text(1),
                    as2_org: None,
                    total_co2,
                }))
            }
            SchemaKind::LinkEnriched => {
                let total_co2 = number(4).filter(|v| *v > 0.0)?;
                Some(Record::Link(LinkRecord {
                    as1: text(0),
                    as1_org: Some(text(1)),
                    as2: text(2),
                    as2_org: Some(text(3)),
                    total_co2,
                }))
            }
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        SchemaKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| anyhow!("unknown schema `{}`", s))
    }
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Simple => "simple",
            ParseMode::Quoted => "quoted",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(ParseMode::Simple),
            "quoted" => Ok(ParseMode::Quoted),
            _ => Err(anyhow!("unknown parse mode `{}`", s)),
        }
    }
}
