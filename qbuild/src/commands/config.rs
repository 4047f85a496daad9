//! `qbuild config show`: effective user settings with their origins.

use anyhow::Result;
use console::style;
use qbuild_common::config::{LoadedUserConfig, UserConfig};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SettingRow {
    key: &'static str,
    value: String,
    source: String,
}

fn value_of(config: &UserConfig, key: &str) -> String {
    let env = &config.environment;
    let conn = &config.connection;
    match key {
        "general.log_level" => config.general.log_level.clone(),
        "connection.host" => conn.host.clone(),
        "connection.user" => conn.user.clone(),
        "connection.port" => conn.port.to_string(),
        "connection.identity_file" => conn
            .identity_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        "connection.temp_dir" => conn.temp_dir.clone(),
        "environment.library_list" => env.library_list.join(" "),
        "environment.current_library" => env.current_library.clone(),
        "environment.default_user_libraries" => env.default_user_libraries.join(" "),
        "environment.log_compile_output" => env.log_compile_output.to_string(),
        _ => String::new(),
    }
}

fn rows(loaded: &LoadedUserConfig) -> Vec<SettingRow> {
    loaded
        .sources
        .iter()
        .map(|(key, source)| SettingRow {
            key: *key,
            value: value_of(&loaded.config, key),
            source: source.to_string(),
        })
        .collect()
}

pub fn show(loaded: LoadedUserConfig, json: bool) -> Result<i32> {
    let rows = rows(&loaded);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(0);
    }

    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0);
    for row in &rows {
        println!(
            "{:width$}  {}  {}",
            row.key,
            row.value,
            style(format!("({})", row.source)).dim(),
            width = width
        );
    }
    for error in &loaded.env_errors {
        eprintln!("{} {}", style("warn").yellow(), error);
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbuild_common::config::load_user_config;
    use tempfile::TempDir;

    #[test]
    fn test_rows_cover_every_tracked_key() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[connection]\nhost = \"ibmi\"\nport = 2222\n").unwrap();

        let loaded = load_user_config(Some(&path)).unwrap();
        let rows = rows(&loaded);
        assert_eq!(rows.len(), loaded.sources.len());
        assert!(rows.iter().all(|r| r.key.contains('.')));

        let host = rows.iter().find(|r| r.key == "connection.host").unwrap();
        assert_eq!(host.value, "ibmi");
        assert!(host.source.contains("config.toml"));
        let libl = rows.iter().find(|r| r.key == "environment.library_list").unwrap();
        assert_eq!(libl.value, "QGPL QTEMP &BUILDLIB");
        assert_eq!(libl.source, "default");
    }
}
