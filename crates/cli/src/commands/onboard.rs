//! `ragdesk onboard`: First-time setup.

use std::path::Path;

use ragdesk_config::AppConfig;

use super::CommandResult;

pub async fn run(config_path: &Path) -> CommandResult {
    println!("🗂️  ragdesk — First-Time Setup");
    println!("============================\n");

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
            println!("✅ Created config directory: {}", config_dir.display());
        } else {
            println!("  Config directory exists: {}", config_dir.display());
        }
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    // Honour index.path from an existing config; fall back to defaults.
    let config = AppConfig::load_from(config_path).unwrap_or_default();
    let index_dir = config.index_dir();
    if !index_dir.exists() {
        std::fs::create_dir_all(&index_dir)?;
        println!("✅ Created index directory: {}", index_dir.display());
    }

    println!("\n📝 Next steps:");
    println!("   1. Set RAGDESK_API_KEY (or OPENAI_API_KEY), or add api_key to the config");
    println!("   2. Run: ragdesk ingest ./docs");
    println!("   3. Run: ragdesk chat\n");

    Ok(())
}
