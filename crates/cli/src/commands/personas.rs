//! `personachat personas`: List the persona and style tables.

use personachat_config::AppConfig;
use personachat_core::DirectiveTable;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    print_table("🎭 Personas", &config.persona_table(), &config.session.persona);
    print_table("✍️  Estilos", &config.style_table(), &config.session.style);

    Ok(())
}

fn print_table(title: &str, table: &DirectiveTable, current: &str) {
    println!("{title}");
    println!("─────────────────────────────────────");
    for row in table.iter() {
        let marker = if row.key == current { "•" } else { " " };
        println!(" {marker} {:<24} {}", row.key, row.directive);
    }
    println!();
}
