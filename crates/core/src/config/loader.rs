use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `VIDSHIFT_TOOLS__FFMPEG_PATH`.
pub const ENV_PREFIX: &str = "VIDSHIFT_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load built-in defaults with environment variable overrides, for running
/// without a config file.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Preset;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[tools]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"

[output]
suffix = "_remux"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(
            config.tools.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert_eq!(config.output.suffix, "_remux");
    }

    #[test]
    fn test_load_config_from_str_empty_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.output.suffix, "_converted");
        assert!(config.tools.use_path);
    }

    #[test]
    fn test_load_config_from_str_bad_type() {
        let toml = r#"
[defaults]
crf = "high"
"#;
        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/vidshift.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[tools]
search_dirs = ["/custom/bin"]
use_path = false

[defaults]
preset = "fast"
crf = 20
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.tools.search_dirs, vec![PathBuf::from("/custom/bin")]);
        assert!(!config.tools.use_path);
        assert_eq!(config.defaults.preset, Preset::Fast);
        assert_eq!(config.defaults.crf, 20);
        assert_eq!(config.output.suffix, "_converted");
    }

    #[test]
    fn test_load_config_from_env_without_overrides() {
        let config = load_config_from_env().unwrap();
        assert_eq!(config.output.suffix, "_converted");
        assert_eq!(config.output.log_buffer_bytes, 64 * 1024);
    }
}
