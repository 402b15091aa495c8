use super::structs::Config;
use std::fs;
use std::path::Path;
use log::{debug, info, warn};

const CONFIG_PATH: &str = "runcat.toml";

/// Top-level tables `Config` understands
const SECTIONS: [&str; 3] = ["icons", "sampler", "tray"];

pub fn load_config() -> Config {
    load_config_from(Path::new(CONFIG_PATH))
}

/// Read `path`, falling back to built-in defaults when it is absent or invalid
pub fn load_config_from(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file at {}, running with built-in settings", path.display());
        return Config::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read {}: {}. Using defaults.", path.display(), e);
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            let defaulted = defaulted_sections(&content);
            if !defaulted.is_empty() {
                debug!("Sections not in {}, using defaults: [{}]", path.display(), defaulted.join("], ["));
            }
            config
        }
        Err(e) => {
            warn!("Invalid config {}: {}. Using defaults.", path.display(), e);
            Config::default()
        }
    }
}

/// Known sections missing from a config file
fn defaulted_sections(content: &str) -> Vec<&'static str> {
    let table: toml::Table = match content.parse() {
        Ok(table) => table,
        Err(_) => return SECTIONS.to_vec(),
    };
    SECTIONS
        .iter()
        .copied()
        .filter(|section| !table.contains_key(*section))
        .collect()
}
