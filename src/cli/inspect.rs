use std::path::Path;

use colored::Colorize;
use comfy_table::{Cell, Table};

use ledgerline::error::Result;
use ledgerline::finance::Kind;
use ledgerline::fmt::delimiter_name;
use ledgerline::models::CanonicalField;
use ledgerline::settings::load_settings;
use ledgerline::{extract, Extraction};

pub fn run(file: &str, format: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let extraction = extract(Path::new(file), format, &settings)?;
    print_report(file, &extraction);
    Ok(())
}

fn print_report(file: &str, e: &Extraction) {
    println!("{}", file.bold());
    println!("  Format:     {}", e.format.key());
    if let Some(s) = e.sniffed {
        println!("  Delimiter:  {}", delimiter_name(s.delimiter));
        println!("  Header row: {}", s.header_row);
    }
    if let Some(tier) = e.tier {
        println!("  Tier:       {tier}");
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Header", "Column"]);
    for (i, (source, name)) in e.columns.iter().enumerate() {
        let column = if CanonicalField::from_name(name).is_some() {
            name.green().to_string()
        } else {
            name.clone()
        };
        table.add_row(vec![Cell::new(i + 1), Cell::new(source), Cell::new(column)]);
    }
    println!("{table}");

    if e.used_preview {
        println!("  Rows:       {}", "none rendered, raw preview used".yellow());
    } else {
        println!("  Rows:       {}", e.rows);
    }
    if e.truncated {
        println!("  Output:     {}", "truncated".yellow());
    }

    let kind = match e.finance.kind {
        Kind::Finance => e.finance.kind.as_str().green().to_string(),
        _ => e.finance.kind.as_str().to_string(),
    };
    println!(
        "  Kind:       {kind} ({:.0}% confidence)",
        e.finance.confidence * 100.0
    );
    if !e.finance.keywords.is_empty() {
        println!("  Keywords:   {}", e.finance.keywords.join(", "));
    }
}
