use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address of the backend's listing channel endpoint.
    pub server_addr: String,
    /// Public base URL that server-hosted image paths are resolved against.
    pub image_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8000".to_string(),
            image_base_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

impl AppConfig {
    /// Absolute URL for a server-hosted image path.
    pub fn image_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.image_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    toml::from_str(&contents).unwrap_or_default()
}

pub fn save_config(config: &AppConfig) -> std::io::Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config).unwrap_or_default();
    std::fs::write(path, contents)
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("STAYBOARD_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

fn app_data_dir() -> PathBuf {
    if let Some(path) = std::env::var_os("STAYBOARD_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("Stayboard");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("Stayboard");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("stayboard");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("stayboard");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".stayboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = AppConfig {
            server_addr: "rentals.example:9000".to_string(),
            image_base_url: "https://rentals.example".to_string(),
        };
        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path);
        assert_eq!(loaded.server_addr, "rentals.example:9000");
        assert_eq!(loaded.image_base_url, "https://rentals.example");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let loaded = load_config_from(Path::new("/nonexistent/stayboard.toml"));
        assert_eq!(loaded.server_addr, AppConfig::default().server_addr);
    }

    #[test]
    fn image_url_joins_base_and_path() {
        let config = AppConfig {
            server_addr: String::new(),
            image_base_url: "https://rentals.example/".to_string(),
        };
        assert_eq!(
            config.image_url("/uploads/a.png"),
            "https://rentals.example/uploads/a.png"
        );
    }
}
