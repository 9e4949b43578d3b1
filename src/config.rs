use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::Path;

/// Runtime configuration for the store
pub struct StoreConfig {
    /// Path to the directory holding the database file
    pub data_dir: String,

    /// Optional path to a packaged seed image to materialize on first launch
    pub seed_path: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### shoplite configuration file

### directory for the shoplite database file
# data_dir = "~/.shoplite"

### path to a pre-seeded database image copied into place on first launch
# seed_path = "/path/to/seed.sqlite3"
"#;

impl Default for StoreConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.shoplite", home_dir),
            seed_path: None,
        }
    }
}

impl StoreConfig {
    /// Create and initialize a new configuration
    ///
    /// Reads `{path}` if given, otherwise `~/.shoplite/shoplite.toml`
    /// (created with a commented template if absent). Values from the
    /// environment override the file; e.g. `SHOPLITE_DATA_DIR=/srv/shop`
    /// relocates the database directory.
    pub fn new(path: &Option<String>) -> Result<StoreConfig> {
        // Pick up a .env file before reading the environment source
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let shoplite_dir = format!("{}/.shoplite", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(shoplite_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create shoplite directory: {}", e))?;
                let p = format!("{}/shoplite.toml", shoplite_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Add in settings from the environment (with a prefix of SHOPLITE)
        builder = builder.add_source(config::Environment::with_prefix("SHOPLITE"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => {
                let path = Path::new(p);
                path.to_str()
                    .ok_or_else(|| anyhow!("Could not convert data_dir path to string"))?
                    .to_string()
            }
            None => {
                std::fs::create_dir_all(shoplite_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                shoplite_dir.clone()
            }
        };

        let seed_path = config.get("seed_path").cloned();

        Ok(StoreConfig {
            data_dir,
            seed_path,
        })
    }

    /// Get the path to the SQLite database file
    pub fn sqlite_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/shoplite.sqlite3", data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.data_dir.ends_with(".shoplite"));
        assert!(config.seed_path.is_none());
    }

    #[test]
    fn test_sqlite_path() {
        let config = StoreConfig {
            data_dir: "/tmp/shop/".to_string(),
            seed_path: None,
        };
        assert_eq!(config.sqlite_path(), "/tmp/shop/shoplite.sqlite3");
    }
}
