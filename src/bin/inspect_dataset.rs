// src/bin/inspect_dataset.rs
//
// Usage: inspect_dataset <csv> <schema> [simple|quoted] [--sort COL[:asc|desc]] [--search Q] [--page N]

use anyhow::{anyhow, Context, Result};
use carbontables::{
    load::{load_bytes, ParseMode, SchemaKind},
    render::{DataTable, Order},
};
use clap::Parser;
use std::{fs, path::PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(about = "Load one CSV dataset and print a summary and one page of the table")]
struct Args {
    csv: PathBuf,
    /// as_intensity, as_emissions, link_plain or link_enriched
    schema: SchemaKind,
    /// Defaults to the schema's usual mode.
    mode: Option<ParseMode>,
    /// Column index to sort on, optionally with `:asc` or `:desc`.
    #[arg(long, value_parser = parse_sort)]
    sort: Option<(usize, Order)>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

fn parse_sort(s: &str) -> Result<(usize, Order)> {
    let (col, order) = s.split_once(':').unwrap_or((s, "asc"));
    let col = col
        .trim()
        .parse()
        .with_context(|| format!("bad column index `{}`", col))?;
    let order = match order.trim().to_lowercase().as_str() {
        "asc" => Order::Asc,
        "desc" => Order::Desc,
        other => return Err(anyhow!("sort order must be asc or desc, got `{}`", other)),
    };
    Ok((col, order))
}

fn main() -> Result<()> {
    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let schema = args.schema;
    let mode = args.mode.unwrap_or_else(|| schema.default_mode());
    let path = &args.csv;

    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let dataset = load_bytes(&bytes, schema, mode)
        .with_context(|| format!("loading {}", path.display()))?;

    // ─── summary ─────────────────────────────────────────────────────
    println!("\n{: <12} {:>15}", "file", path.display());
    println!("{:-<28}", "");
    println!("{: <12} {:>15}", "schema", schema);
    println!("{: <12} {:>15}", "mode", mode);
    println!("{: <12} {:>15}", "records", dataset.len());
    println!("{: <12} {:>15}", "dropped", dataset.dropped());
    if let Some((lo, hi)) = dataset.key_range() {
        println!("{: <12} {:>15.2}", "min key", lo);
        println!("{: <12} {:>15.2}", "max key", hi);
    }

    // ─── view ────────────────────────────────────────────────────────
    let mut table = DataTable::new(dataset, args.page_size);
    if let Some((col, order)) = args.sort {
        table.sort_by(col, order)?;
    }
    if let Some(q) = &args.search {
        table.search(q);
    }
    let shown = table.page(args.page);

    println!();
    println!("{}", table.columns().join("\t"));
    for row in table.page_rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join("\t"));
    }
    println!("{}  (page {} of {})", table.info(), shown, table.page_count());

    Ok(())
}
