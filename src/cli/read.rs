use std::path::Path;

use ledgerline::error::Result;
use ledgerline::read_statement;
use ledgerline::settings::load_settings;

pub fn run(file: &str, format: Option<&str>, max_chars: Option<usize>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(n) = max_chars {
        settings.max_chars = n;
    }
    let text = read_statement(Path::new(file), format, &settings)?;
    println!("{text}");
    Ok(())
}
