//! Configuration file discovery and loading.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Project configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "raffle.yaml";

/// Private project configuration file name, usually not committed.
pub const LOCAL_CONFIG_FILE: &str = "raffle.local.yaml";

/// A loaded configuration file with its precedence level.
///
/// Lower precedence values are overridden by higher ones.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the configuration file.
    pub path: PathBuf,
    /// Precedence level (higher values take priority).
    pub precedence: u8,
    /// Parsed configuration.
    pub config: Config,
}

/// Loads configuration from the user and project files.
///
/// # Examples
///
/// ```no_run
/// use raffle::config::ConfigLoader;
/// use std::path::Path;
///
/// let sources = ConfigLoader::load_all(Path::new("."), None).unwrap();
/// println!("Found {} configuration sources", sources.len());
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Discover and load all configuration files.
    ///
    /// Searches for:
    /// 1. User config at `~/.raffle/config.yaml` or `<data_dir>/config.yaml` (precedence 1)
    /// 2. `raffle.yaml` walking up from `working_dir` (precedence 2)
    /// 3. `raffle.local.yaml` next to it (precedence 3)
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration file exists but cannot be read
    /// or parsed.
    pub fn load_all(working_dir: &Path, data_dir: Option<&Path>) -> Result<Vec<ConfigSource>> {
        let mut sources = Vec::new();

        if let Some(user_config) = Self::load_user_config(data_dir)? {
            sources.push(user_config);
        }
        sources.extend(Self::discover_project_configs(working_dir)?);

        sources.sort_by_key(|s| s.precedence);
        Ok(sources)
    }

    fn load_user_config(data_dir: Option<&Path>) -> Result<Option<ConfigSource>> {
        let config_path = match data_dir {
            Some(dir) => dir.join("config.yaml"),
            None => crate::database::resolve_data_dir()?.join("config.yaml"),
        };

        if !config_path.exists() {
            return Ok(None);
        }

        let config = Self::load_file(&config_path)?;
        Ok(Some(ConfigSource {
            path: config_path,
            precedence: 1,
            config,
        }))
    }

    /// Discover project configurations by walking up directories.
    ///
    /// Stops at the first directory containing either file.
    ///
    /// # Errors
    ///
    /// Returns an error if any discovered file cannot be read or parsed.
    pub fn discover_project_configs(start_dir: &Path) -> Result<Vec<ConfigSource>> {
        let mut configs = Vec::new();
        let mut current = start_dir.to_path_buf();

        loop {
            for (name, precedence) in [(PROJECT_CONFIG_FILE, 2), (LOCAL_CONFIG_FILE, 3)] {
                let path = current.join(name);
                if path.exists() {
                    let config = Self::load_file(&path)?;
                    configs.push(ConfigSource {
                        path,
                        precedence,
                        config,
                    });
                }
            }

            if !configs.is_empty() || !current.pop() {
                break;
            }
        }

        Ok(configs)
    }

    /// Load and parse a YAML configuration file.
    ///
    /// An empty or comment-only file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;

        let parsed: Option<Config> =
            serde_yaml::from_str(&contents).map_err(|e| Error::Validation {
                field: format!("{}", path.display()),
                message: format!("Invalid YAML: {e}"),
            })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(parsed.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load_file(Path::new("/nonexistent/path/config.yaml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.yaml");
        fs::write(&config_path, "invalid: yaml: syntax:").unwrap();

        let err = ConfigLoader::load_file(&config_path).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_load_comment_only_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "# nothing here\n").unwrap();

        assert_eq!(ConfigLoader::load_file(&config_path).unwrap(), Config::default());
    }

    #[test]
    fn test_discover_both_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILE), "progress_interval: 10\n").unwrap();
        fs::write(temp_dir.path().join(LOCAL_CONFIG_FILE), "progress_interval: 20\n").unwrap();

        let configs = ConfigLoader::discover_project_configs(temp_dir.path()).unwrap();
        assert_eq!(configs.len(), 2);
        let project = configs.iter().find(|c| c.precedence == 2).unwrap();
        let local = configs.iter().find(|c| c.precedence == 3).unwrap();
        assert_eq!(project.config.progress_interval, Some(10));
        assert_eq!(local.config.progress_interval, Some(20));
    }

    #[test]
    fn test_discover_stops_at_first_config() {
        let temp_dir = TempDir::new().unwrap();
        let child = temp_dir.path().join("child");
        fs::create_dir(&child).unwrap();
        fs::write(temp_dir.path().join(PROJECT_CONFIG_FILE), "send_mail: false\n").unwrap();

        let configs = ConfigLoader::discover_project_configs(&child).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].config.send_mail, Some(false));
    }

    #[test]
    fn test_load_all_uses_data_dir_and_sorts() {
        let data_dir = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        fs::write(data_dir.path().join("config.yaml"), "default_seed: 1\n").unwrap();
        fs::write(project.path().join(LOCAL_CONFIG_FILE), "default_seed: 3\n").unwrap();

        let sources = ConfigLoader::load_all(project.path(), Some(data_dir.path())).unwrap();
        let precedences: Vec<u8> = sources.iter().map(|s| s.precedence).collect();
        assert_eq!(precedences, vec![1, 3]);
    }
}
