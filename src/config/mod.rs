mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
///
/// Values are not validated here: command-line overrides are applied first,
/// then the merged result goes through [`validate_config`].
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./imgforge.toml", "~/.config/imgforge/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.conversion.from == config.conversion.to {
        anyhow::bail!(
            "Source and target formats are both {}",
            config.conversion.to.label()
        );
    }

    if config.conversion.timeout_secs == 0 {
        anyhow::bail!("Conversion timeout cannot be 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgforge_av::{BackendKind, ImageFormat};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input, PathBuf::from("./data"));
        assert_eq!(config.output_dir(), PathBuf::from("./data"));
        assert!(!config.overwrite);
        assert_eq!(config.conversion.from, ImageFormat::Heic);
        assert_eq!(config.conversion.to, ImageFormat::Png);
        assert_eq!(config.conversion.backend, BackendKind::Auto);
        assert_eq!(config.conversion.timeout_secs, 60);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
input = "/photos/raw"
output = "/photos/png"
overwrite = true

[conversion]
from = "HEIC"
to = "jpeg"
backend = "library"
timeout_secs = 30
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.input, PathBuf::from("/photos/raw"));
        assert_eq!(config.output_dir(), PathBuf::from("/photos/png"));
        assert!(config.overwrite);
        assert!(!config.recursive);
        assert_eq!(config.conversion.from, ImageFormat::Heic);
        assert_eq!(config.conversion.to, ImageFormat::Jpeg);
        assert_eq!(config.conversion.backend, BackendKind::Library);
        assert_eq!(config.conversion.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[conversion]\nto = \"avif\"\n").unwrap();

        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_partial_config_loads_before_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[conversion]\nfrom = \"png\"\n").unwrap();

        let mut config = load_config_or_default(Some(file.path())).unwrap();
        assert_eq!(config.conversion.from, ImageFormat::Png);
        assert!(validate_config(&config).is_err());

        config.conversion.to = ImageFormat::Jpeg;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_same_formats_rejected() {
        let mut config = Config::default();
        config.conversion.to = ImageFormat::Heic;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.conversion.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
