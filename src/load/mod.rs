// src/load/mod.rs
//
// CSV text → validated, ordered records.

pub mod record;
pub mod schema;

use csv::ReaderBuilder;
use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

pub use record::{AsRecord, LinkRecord, Record, Value};
pub use schema::{Column, ParseMode, SchemaKind};

/// Failures that make a whole input unusable. Bad rows never end up here.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("input is empty: no header line")]
    Empty,
    #[error("input is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
    #[error("failed to read CSV header: {0}")]
    Header(#[from] csv::Error),
}

/// The records of one load, in ascending key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    schema: SchemaKind,
    records: Vec<Record>,
    dropped: usize,
}

impl Dataset {
    pub fn schema(&self) -> SchemaKind {
        self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Data rows that were skipped because they failed validation.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.schema.titles()
    }

    /// Display cells, one `Vec` per record.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.records.iter().map(Record::values).collect()
    }

    /// Smallest and largest key, if there are any records.
    pub fn key_range(&self) -> Option<(f64, f64)> {
        Some((self.records.first()?.key(), self.records.last()?.key()))
    }
}

/// Decode `bytes` as UTF-8 and [`load`] them.
pub fn load_bytes(bytes: &[u8], schema: SchemaKind, mode: ParseMode) -> Result<Dataset, LoadError> {
    let text = std::str::from_utf8(bytes)?;
    load(text, schema, mode)
}

/// Parse `raw` (header line first) into a [`Dataset`] sorted ascending by the
/// schema's key. Rows with a missing or non-finite numeric field, or a link
/// total that is not positive, are dropped and counted.
#[instrument(level = "debug", skip(raw), fields(bytes = raw.len()))]
pub fn load(raw: &str, schema: SchemaKind, mode: ParseMode) -> Result<Dataset, LoadError> {
    let text = raw.trim_start_matches('\u{feff}').trim_start();
    if text.trim().is_empty() {
        return Err(LoadError::Empty);
    }

    let mut dropped = 0;
    let mut records = match mode {
        ParseMode::Simple => parse_simple(text, schema, &mut dropped),
        ParseMode::Quoted => parse_quoted(text, schema, &mut dropped)?,
    };

    // Keys are finite here, so the fallback never fires; the sort is stable.
    records.sort_by(|a, b| a.key().partial_cmp(&b.key()).unwrap_or(Ordering::Equal));

    debug!(kept = records.len(), dropped, "loaded dataset");
    Ok(Dataset {
        schema,
        records,
        dropped,
    })
}

fn parse_simple(text: &str, schema: SchemaKind, dropped: &mut usize) -> Vec<Record> {
    let columns = schema.columns();
    let mut out = Vec::new();

    // first line is the header
    for (line_no, line) in text.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != schema.width() {
            trace!(line_no, got = fields.len(), want = schema.width(), "wrong field count");
            *dropped += 1;
            continue;
        }
        let resolved: Vec<Option<&str>> = columns
            .iter()
            .map(|c| fields.get(c.index).copied())
            .collect();
        match schema.build(&resolved) {
            Some(record) => out.push(record),
            None => {
                trace!(line_no, line, "row failed validation");
                *dropped += 1;
            }
        }
    }
    out
}

fn parse_quoted(
    text: &str,
    schema: SchemaKind,
    dropped: &mut usize,
) -> Result<Vec<Record>, LoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let positions: Vec<Option<usize>> = schema
        .columns()
        .iter()
        .map(|c| {
            let pos = headers.iter().position(|h| h.trim() == c.name);
            if pos.is_none() {
                warn!(column = c.name, %schema, "header is missing a column");
            }
            pos
        })
        .collect();

    let mut out = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                trace!(record = idx, error = %e, "unreadable CSV record");
                *dropped += 1;
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let resolved: Vec<Option<&str>> = positions
            .iter()
            .map(|p| p.and_then(|i| record.get(i)))
            .collect();
        match schema.build(&resolved) {
            Some(r) => out.push(r),
            None => {
                trace!(record = idx, "row failed validation");
                *dropped += 1;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,carbontables::load=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn as_rows(ds: &Dataset) -> Vec<(String, String, f64)> {
        ds.records()
            .iter()
            .map(|r| match r {
                Record::As(a) => (a.asn.clone(), a.organization.clone(), a.co2_intensity),
                Record::Link(_) => panic!("expected AS record"),
            })
            .collect()
    }

    fn link(ds: &Dataset, i: usize) -> &LinkRecord {
        match &ds.records()[i] {
            Record::Link(l) => l,
            Record::As(_) => panic!("expected link record"),
        }
    }

    #[test]
    fn three_column_as_rows_are_filtered_and_sorted() -> Result<()> {
        init_test_logging();
        let raw = "asn,org,co2\n1,OrgA,5.2\n2,OrgB,1.1\n3,OrgC,notanumber\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;

        assert_eq!(
            as_rows(&ds),
            vec![
                ("2".to_string(), "OrgB".to_string(), 1.1),
                ("1".to_string(), "OrgA".to_string(), 5.2),
            ]
        );
        assert_eq!(ds.dropped(), 1);
        let rows = ds.rows();
        assert_eq!(rows[0][2].to_string(), "1.10");
        assert_eq!(rows[1][2].to_string(), "5.20");
        Ok(())
    }

    #[test]
    fn four_column_as_rows_use_positions_0_2_3() -> Result<()> {
        let raw = "ASnumber,AS_ID,AS_Organization,CO2_Intensity\n\
                   13335,CLOUD14-ARIN,Cloudflare,120.5\n\
                   15169,GOGL-ARIN,Google,98.25\n";
        let ds = load(raw, SchemaKind::AsIntensity, ParseMode::Simple)?;
        assert_eq!(
            as_rows(&ds),
            vec![
                ("15169".to_string(), "Google".to_string(), 98.25),
                ("13335".to_string(), "Cloudflare".to_string(), 120.5),
            ]
        );
        Ok(())
    }

    #[test]
    fn simple_mode_drops_rows_with_wrong_field_count() -> Result<()> {
        // The org contains a comma, so the line has 4 fields instead of 3.
        let raw = "ASN,Organization,CO2 Emissions\n1,Acme, Inc.,2.0\n2,Beta,3.0\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped(), 1);
        Ok(())
    }

    #[test]
    fn quoted_org_with_comma_is_kept_intact() -> Result<()> {
        let raw = "AS1,AS1_org_name,AS2,AS2_org_name,Total_CO2\n100,\"Acme, Inc.\",200,Beta,3.5\n";
        let ds = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;

        assert_eq!(ds.len(), 1);
        let l = link(&ds, 0);
        assert_eq!(l.as1, "100");
        assert_eq!(l.as1_org.as_deref(), Some("Acme, Inc."));
        assert_eq!(l.as2, "200");
        assert_eq!(l.as2_org.as_deref(), Some("Beta"));
        assert_eq!(l.total_co2, 3.5);
        Ok(())
    }

    #[test]
    fn quoted_mode_maps_by_name_regardless_of_column_order() -> Result<()> {
        let raw = "AS1,AS1_org_id,AS1_org_name,AS2,AS2_org_id,AS2_org_name,Total_CO2\n\
                   3356,LPL-141-ARIN,Level 3,174,COGC-ARIN,\"Cogent, Inc.\",12.75\n\
                   6939,HURRI-ARIN,Hurricane Electric,3356,LPL-141-ARIN,Level 3,4.5\n";
        let ds = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        assert_eq!(ds.len(), 2);
        assert_eq!(link(&ds, 0).as1, "6939");
        assert_eq!(link(&ds, 1).as2_org.as_deref(), Some("Cogent, Inc."));

        let reordered = "Total_CO2,AS2,AS1,AS2_org_name,AS1_org_name\n7.0,2,1,B,A\n";
        let ds = load(reordered, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        let l = link(&ds, 0);
        assert_eq!((l.as1.as_str(), l.as2.as_str(), l.total_co2), ("1", "2", 7.0));
        assert_eq!(l.as1_org.as_deref(), Some("A"));
        Ok(())
    }

    #[test]
    fn zero_or_negative_link_totals_are_excluded() -> Result<()> {
        let raw = "AS1,AS1_org_name,AS2,AS2_org_name,Total_CO2\n\
                   1,A,2,B,0\n\
                   3,C,4,D,-1.5\n\
                   5,E,6,F,0.01\n";
        let ds = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        assert_eq!(ds.len(), 1);
        assert_eq!(link(&ds, 0).as1, "5");
        assert_eq!(ds.dropped(), 2);

        let plain = load("AS1,AS2,Total_CO2\n1,2,0\n", SchemaKind::LinkPlain, ParseMode::Simple)?;
        assert!(plain.is_empty());
        Ok(())
    }

    #[test]
    fn header_only_input_yields_empty_dataset() -> Result<()> {
        for mode in [ParseMode::Simple, ParseMode::Quoted] {
            let ds = load("AS1,AS2,Total_CO2\n", SchemaKind::LinkPlain, mode)?;
            assert!(ds.is_empty());
            assert_eq!(ds.dropped(), 0);
            assert_eq!(ds.key_range(), None);
        }
        Ok(())
    }

    #[test]
    fn empty_input_is_a_hard_error() {
        assert!(matches!(
            load("", SchemaKind::AsEmissions, ParseMode::Simple),
            Err(LoadError::Empty)
        ));
        assert!(matches!(
            load(" \n\r\n", SchemaKind::LinkEnriched, ParseMode::Quoted),
            Err(LoadError::Empty)
        ));
    }

    #[test]
    fn invalid_utf8_is_a_hard_error() {
        let bytes = b"ASN,Organization,CO2 Emissions\n1,\xff\xfe,2.0\n";
        assert!(matches!(
            load_bytes(bytes, SchemaKind::AsEmissions, ParseMode::Simple),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn blank_lines_crlf_and_bom_are_tolerated() -> Result<()> {
        let raw = "\u{feff}ASN,Organization,CO2 Emissions\r\n\r\n1,A,2.5\r\n\r\n2,B,0.5\r\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;
        assert_eq!(as_rows(&ds)[0], ("2".to_string(), "B".to_string(), 0.5));
        assert_eq!(as_rows(&ds)[1], ("1".to_string(), "A".to_string(), 2.5));
        assert_eq!(ds.dropped(), 0);

        let quoted = "AS1,AS2,Total_CO2\r\n\r\n1,2,3\r\n   \r\n";
        let ds = load(quoted, SchemaKind::LinkPlain, ParseMode::Quoted)?;
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped(), 0);
        Ok(())
    }

    #[test]
    fn non_finite_values_never_reach_the_output() -> Result<()> {
        let raw = "ASN,Organization,CO2 Emissions\n1,A,NaN\n2,B,inf\n3,C,-Infinity\n4,D,\n5,E,1e400\n6,F,7\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.dropped(), 5);
        assert!(ds.records().iter().all(|r| r.key().is_finite()));
        Ok(())
    }

    #[test]
    fn output_is_ascending_and_ties_keep_input_order() -> Result<()> {
        let raw = "ASN,Organization,CO2 Emissions\n\
                   a,A,3\nb,B,1\nc,C,2\nd,D,1\ne,E,10\nf,F,2.000\ng,G,-4\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;
        let keys: Vec<f64> = ds.records().iter().map(Record::key).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        let order: Vec<String> = as_rows(&ds).into_iter().map(|(asn, _, _)| asn).collect();
        assert_eq!(order, vec!["g", "b", "d", "c", "f", "a", "e"]);
        assert_eq!(ds.key_range(), Some((-4.0, 10.0)));
        Ok(())
    }

    #[test]
    fn sort_uses_full_precision_not_rounded_display() -> Result<()> {
        let raw = "ASN,Organization,CO2 Emissions\nx,X,1.004\ny,Y,1.001\n";
        let ds = load(raw, SchemaKind::AsEmissions, ParseMode::Simple)?;
        let rows = ds.rows();
        // both display as 1.00; order must still follow the real values
        assert_eq!(rows[0][0].to_string(), "y");
        assert_eq!(rows[0][2].to_string(), rows[1][2].to_string());
        Ok(())
    }

    #[test]
    fn loading_twice_gives_identical_output() -> Result<()> {
        let raw = "AS1,AS1_org_name,AS2,AS2_org_name,Total_CO2\n\
                   1,A,2,B,5\n3,C,4,D,5\n5,E,6,F,1\n7,G,8,H,bad\n";
        let first = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        let second = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn dropping_rows_does_not_reorder_the_rest() -> Result<()> {
        let clean = "ASN,Organization,CO2 Emissions\na,A,2\nb,B,1\nc,C,2\n";
        let noisy = "ASN,Organization,CO2 Emissions\na,A,2\nx,X,oops\nb,B,1\ny,Y\nc,C,2\n";
        let clean = load(clean, SchemaKind::AsEmissions, ParseMode::Simple)?;
        let noisy = load(noisy, SchemaKind::AsEmissions, ParseMode::Simple)?;
        assert_eq!(clean.records(), noisy.records());
        assert_eq!(noisy.dropped(), 2);
        Ok(())
    }

    #[test]
    fn missing_named_column_drops_every_row() -> Result<()> {
        let raw = "AS1,AS2,CO2\n1,2,3\n";
        let ds = load(raw, SchemaKind::LinkPlain, ParseMode::Quoted)?;
        assert!(ds.is_empty());
        assert_eq!(ds.dropped(), 1);
        Ok(())
    }

    #[test]
    fn quoted_org_fields_default_to_empty_when_absent() -> Result<()> {
        let raw = "AS1,AS2,Total_CO2\n1,2,3\n";
        let ds = load(raw, SchemaKind::LinkEnriched, ParseMode::Quoted)?;
        let l = link(&ds, 0);
        assert_eq!(l.as1_org.as_deref(), Some(""));
        assert_eq!(ds.columns().len(), 5);
        assert_eq!(ds.rows()[0].len(), 5);
        Ok(())
    }
}
