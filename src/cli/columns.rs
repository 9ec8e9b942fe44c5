use ledgerline::error::Result;
use ledgerline::normalizer::normalize_headers;
use ledgerline::settings::load_settings;

pub fn run(headers: &[String]) -> Result<()> {
    let settings = load_settings();
    let columns = normalize_headers(headers, &settings.header_aliases);
    for (raw, name) in headers.iter().zip(&columns) {
        println!("{raw} -> {name}");
    }
    Ok(())
}
