use feedsieve_core::{Config, Paths};
use serde_json::Value;

/// Show the current configuration as pretty-printed JSON, cookie redacted.
pub async fn show() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;
    let mut json = serde_json::to_value(&config)?;

    if let Some(cookie) = json.pointer_mut("/session/cookie") {
        if cookie.as_str().map_or(false, |c| !c.is_empty()) {
            *cookie = Value::String("<redacted>".to_string());
        }
    }

    println!();
    println!("Current configuration");
    println!("  File: {}", paths.config_file().display());
    println!();
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

pub async fn init(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config_path = paths.config_file();

    if config_path.exists() && !force {
        println!("Config already exists at {}", config_path.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    paths.ensure_dirs()?;
    Config::default().save(&config_path)?;
    println!("✓ Wrote {}", config_path.display());
    println!("  Paste your t.bilibili.com cookie into session.cookie to log in.");
    Ok(())
}

pub async fn path() -> anyhow::Result<()> {
    println!("{}", Paths::new().config_file().display());
    Ok(())
}
