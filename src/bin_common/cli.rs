//! CLI utilities for binaries
//!
//! Handles configuration path resolution from arguments and
//! environment variables.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Quoter configuration (config/quoter.yaml)
    Quoter,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Quoter => "config/quoter.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        match self {
            ConfigType::Quoter => "QUOTER_CONFIG_PATH",
            ConfigType::Custom(_) => "QUOTER_CONFIG_PATH",
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use rfq_quoter::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Quoter);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Resolve the config path, `--config <path>` first
pub fn config_path_from_args(args: &[String], config_type: ConfigType) -> PathBuf {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(path) = arg.strip_prefix("--config=") {
            return PathBuf::from(path);
        }
        if arg == "--config" {
            if let Some(path) = iter.next() {
                return PathBuf::from(path);
            }
        }
    }

    load_config_from_env(config_type)
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Quoter.default_path(), "config/quoter.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_config_flag_forms() {
        let args = vec!["--config".to_string(), "a.yaml".to_string()];
        assert_eq!(
            config_path_from_args(&args, ConfigType::Quoter),
            PathBuf::from("a.yaml")
        );

        let args = vec!["--verbose".to_string(), "--config=b.yaml".to_string()];
        assert_eq!(
            config_path_from_args(&args, ConfigType::Quoter),
            PathBuf::from("b.yaml")
        );
    }

    #[test]
    fn test_custom_type_without_flag() {
        let custom = ConfigType::Custom("c.yaml".to_string());
        std::env::remove_var("QUOTER_CONFIG_PATH");
        assert_eq!(config_path_from_args(&[], custom), PathBuf::from("c.yaml"));
    }
}
