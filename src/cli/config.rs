use colored::Colorize;
use comfy_table::{Cell, Table};

use ledgerline::error::Result;
use ledgerline::settings::{load_settings, save_settings, settings_file_exists, settings_path};
use ledgerline::Settings;

pub fn show() -> Result<()> {
    let path = settings_path();
    if settings_file_exists() {
        println!("Settings: {}", path.display());
    } else {
        println!(
            "Settings: {} {}",
            path.display(),
            "(not found, using defaults)".dimmed()
        );
    }

    let settings = load_settings();
    let mut table = Table::new();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![Cell::new("sample_lines"), Cell::new(settings.sample_lines)]);
    table.add_row(vec![
        Cell::new("header_scan_lines"),
        Cell::new(settings.header_scan_lines),
    ]);
    table.add_row(vec![Cell::new("preview_rows"), Cell::new(settings.preview_rows)]);
    table.add_row(vec![Cell::new("max_chars"), Cell::new(settings.max_chars)]);
    println!("{table}");

    if !settings.header_aliases.is_empty() {
        let mut aliases = Table::new();
        aliases.set_header(vec!["Header", "Column"]);
        for (raw, name) in &settings.header_aliases {
            aliases.add_row(vec![Cell::new(raw), Cell::new(name)]);
        }
        println!("Header aliases\n{aliases}");
    }
    Ok(())
}

pub fn init(force: bool) -> Result<()> {
    let path = settings_path();
    if settings_file_exists() && !force {
        println!("Settings already exist at {} (use --force to overwrite)", path.display());
        return Ok(());
    }
    save_settings(&Settings::default())?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
