//! Show how a language resolves against the font catalog.

use burnsub_common::config::AppConfig;
use burnsub_render_engine::FontCatalog;

pub fn run(language: String, config: &AppConfig) -> anyhow::Result<()> {
    let catalog = FontCatalog::from_config(&config.fonts);
    let candidates = catalog.candidates(&language)?;

    println!("Fonts for {language}:");
    if candidates.is_empty() {
        println!("  (none close enough)");
    }
    for (rank, (distance, entry)) in candidates.iter().enumerate() {
        let marker = if rank == 0 { "*" } else { " " };
        let align = entry
            .align
            .map(|a| a.to_string())
            .unwrap_or_else(|| config.output.align.to_string());
        println!(
            "  {marker} {:<8} distance {:>3}  align {:<6} {:?}",
            entry.tag, distance, align, entry.asset
        );
    }
    Ok(())
}
