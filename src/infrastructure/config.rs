use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "config/tableau";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientSettings {
    /// REST API version used when the server version isn't probed.
    pub api_version: String,
    /// Ask the server for its REST API version before signing in.
    pub use_server_version: bool,
    /// Directory `file_path` entries are resolved against.
    pub workbooks_dir: PathBuf,
    pub page_size: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_version: "3.19".to_string(),
            use_server_version: true,
            workbooks_dir: PathBuf::from("workbooks"),
            page_size: 100,
            request_timeout_secs: 60,
            user_agent: format!("tableau-publisher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load settings from an optional file, then `TABLEAU_*` environment variables.
pub fn load_client_settings(path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(config::Environment::with_prefix("TABLEAU").try_parsing(true))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = ClientSettings::default();
        assert_eq!(settings.api_version, "3.19");
        assert!(settings.use_server_version);
        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.request_timeout(), Duration::from_secs(60));
        assert_eq!(settings.workbooks_dir, PathBuf::from("workbooks"));
    }

    #[test]
    fn test_load_from_file_keeps_unset_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "api_version = \"3.4\"").unwrap();
        writeln!(file, "use_server_version = false").unwrap();
        writeln!(file, "workbooks_dir = \"/srv/workbooks\"").unwrap();

        let settings = load_client_settings(Some(file.path())).unwrap();
        assert_eq!(settings.api_version, "3.4");
        assert!(!settings.use_server_version);
        assert_eq!(settings.workbooks_dir, PathBuf::from("/srv/workbooks"));
        assert_eq!(settings.page_size, 100);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(load_client_settings(Some(Path::new("/nonexistent/tableau.toml"))).is_err());
    }
}
