//! The YAML configuration document.
//!
//! ```yaml
//! temp-dir: /tmp/backup
//! destination-dir: /mnt/backup
//! append-timestamp: true
//! compressor:
//!   level: 6
//! targets:
//!   - description: Documents
//!     source-path: /home/me/Documents
//!     archive-name: documents
//!     exclude-patterns: ['.*\.log$']
//! ```

use crate::backup::compress::XzConfig;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;
use crate::backup::target::Target;
use crate::backup::validate::validate_writable_dir;

use bon::Builder;
use getset::{CopyGetters, Getters};
use itertools::Itertools;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize, Validate, Builder, Getters, CopyGetters)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[validate(schema(function = validate_targets))]
pub struct Configuration {
    /// Scratch directory holding archives while they are written.
    #[validate(custom(function = validate_writable_dir))]
    #[builder(into)]
    #[getset(get = "pub")]
    temp_dir: PathBuf,
    /// Where finished archives are moved to.
    #[validate(custom(function = validate_writable_dir))]
    #[builder(into)]
    #[getset(get = "pub")]
    destination_dir: PathBuf,
    #[validate(nested)]
    #[builder(into)]
    #[getset(get = "pub")]
    targets: Vec<Target>,
    #[serde(default)]
    #[validate(nested)]
    #[builder(default)]
    #[getset(get = "pub")]
    compressor: XzConfig,
    #[serde(default)]
    #[builder(default)]
    #[getset(get_copy = "pub")]
    append_timestamp: bool,
}

impl Configuration {
    /// Parses and validates a configuration document.
    pub fn from_yaml_str(yaml: &str) -> Result<Configuration> {
        let config: Configuration = serde_yml::from_str(yaml)
            .map_err(Error::from)
            .with_msg("Parse YAML config failed")?;
        config
            .validate()
            .map_err(Error::from)
            .with_msg("Config validation failed")?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Configuration> {
        let path = path.as_ref();
        File::open(path)
            .map_err(Error::from)
            .with_msg(format!("Open config failed: {:?}", path))
            .and_then(|f| {
                serde_yml::from_reader::<_, Configuration>(f)
                    .map_err(Error::from)
                    .with_msg(format!("Parse YAML config failed: {:?}", path))
            })
            .and_then(|config| {
                config
                    .validate()
                    .map_err(Error::from)
                    .map(|_| config)
                    .with_msg(format!("Config validation failed: {:?}", path))
            })
    }
}

/// At least one target, and no two targets writing the same archive.
fn validate_targets(config: &Configuration) -> std::result::Result<(), ValidationError> {
    if config.targets.is_empty() {
        return Err(ValidationError::new("NoTarget")
            .with_message("at least one target must be configured".into()));
    }
    let duplicates = config
        .targets
        .iter()
        .map(|t| t.archive_name())
        .duplicates()
        .collect_vec();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new("DuplicateArchiveName").with_message(
            format!("archive names used by more than one target: {:?}", duplicates).into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Dirs {
        root: TempDir,
    }

    impl Dirs {
        fn new() -> Self {
            let root = TempDir::new().unwrap();
            for dir in ["docs", "photos", "temp", "dest"] {
                std::fs::create_dir_all(root.path().join(dir)).unwrap();
            }
            Self { root }
        }

        fn path(&self, name: &str) -> String {
            self.root.path().join(name).to_string_lossy().into_owned()
        }

        fn yaml(&self, extra_target: &str) -> String {
            format!(
                "
temp-dir: {temp}
destination-dir: {dest}
targets:
  - description: Documents
    source-path: {docs}
    archive-name: documents
    exclude-patterns:
      - '.*\\.log$'
  - description: Photos
    source-path: {photos}
    archive-name: photos
    include-patterns: ['.*\\.jpe?g$']
{extra_target}",
                temp = self.path("temp"),
                dest = self.path("dest"),
                docs = self.path("docs"),
                photos = self.path("photos"),
            )
        }
    }

    #[test]
    fn test_parse_valid_configuration() {
        let dirs = Dirs::new();
        let config = Configuration::from_yaml_str(&dirs.yaml("")).unwrap();

        assert_eq!(config.temp_dir(), &PathBuf::from(dirs.path("temp")));
        assert_eq!(config.destination_dir(), &PathBuf::from(dirs.path("dest")));
        assert_eq!(config.targets().len(), 2);
        assert_eq!(config.targets()[0].description(), "Documents");
        assert_eq!(config.targets()[1].archive_name(), "photos");
        assert!(!config.append_timestamp());
        assert_eq!(config.compressor(), &XzConfig::default());
    }

    #[test]
    fn test_parse_optional_settings() {
        let dirs = Dirs::new();
        let yaml = format!(
            "{}append-timestamp: true\ncompressor:\n  level: 7\n  thread: 1\n",
            dirs.yaml("")
        );
        let config = Configuration::from_yaml_str(&yaml).unwrap();
        assert!(config.append_timestamp());
        assert_eq!(config.compressor(), &XzConfig::new(Some(7), Some(1)));
    }

    #[test]
    fn test_missing_destination_dir_key() {
        let dirs = Dirs::new();
        let yaml = dirs
            .yaml("")
            .replace(&format!("destination-dir: {}\n", dirs.path("dest")), "");
        let err = Configuration::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("Parse YAML config failed"));
    }

    #[test]
    fn test_missing_working_dirs_are_created() {
        let dirs = Dirs::new();
        let yaml = dirs.yaml("").replace(&dirs.path("dest"), &dirs.path("new/dest"));
        Configuration::from_yaml_str(&yaml).unwrap();
        assert!(dirs.root.path().join("new/dest").is_dir());
    }

    #[test]
    fn test_missing_source_dir_fails_validation() {
        let dirs = Dirs::new();
        let yaml = dirs.yaml("").replace(&dirs.path("photos"), &dirs.path("videos"));
        let err = Configuration::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err.root_cause(), Error::ValidationError(_)));
    }

    #[test]
    fn test_ambiguous_target_fails_validation() {
        let dirs = Dirs::new();
        let extra = format!(
            "  - description: Both\n    source-path: {}\n    archive-name: both\n    include-patterns: ['a']\n    exclude-patterns: ['b']\n",
            dirs.path("docs")
        );
        let err = Configuration::from_yaml_str(&dirs.yaml(&extra)).unwrap_err();
        assert!(err.to_string().contains("ambiguous filtering mode"));
    }

    #[test]
    fn test_duplicate_archive_names_fail_validation() {
        let dirs = Dirs::new();
        let extra = format!(
            "  - description: Again\n    source-path: {}\n    archive-name: documents\n",
            dirs.path("docs")
        );
        let err = Configuration::from_yaml_str(&dirs.yaml(&extra)).unwrap_err();
        assert!(err.to_string().contains("documents"));
    }

    #[test]
    fn test_invalid_pattern_fails_parsing() {
        let dirs = Dirs::new();
        let yaml = dirs.yaml("").replace(".*\\.jpe?g$", "(unclosed");
        assert!(Configuration::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_unknown_key_fails_parsing() {
        let dirs = Dirs::new();
        let yaml = format!("{}retention: 7d\n", dirs.yaml(""));
        assert!(Configuration::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_empty_targets_fail_validation() {
        let dirs = Dirs::new();
        let yaml = format!(
            "temp-dir: {}\ndestination-dir: {}\ntargets: []\n",
            dirs.path("temp"),
            dirs.path("dest")
        );
        let err = Configuration::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("at least one target"), "{err}");
    }

    #[test]
    fn test_from_yaml_file() {
        let dirs = Dirs::new();
        let file = dirs.root.path().join("backup.yml");
        std::fs::write(&file, dirs.yaml("")).unwrap();
        let config = Configuration::from_yaml_file(&file).unwrap();
        assert_eq!(config.targets().len(), 2);

        let err = Configuration::from_yaml_file(dirs.root.path().join("nope.yml")).unwrap_err();
        assert!(err.to_string().contains("Open config failed"));
    }
}
