//! Backup targets and the relevance filter attached to each of them.

use crate::backup::pattern::AnchoredRegex;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::validate::{validate_dir_exist, validate_valid_archive_base_name};

use bon::Builder;
use getset::Getters;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use std::path::{Path, PathBuf};

/// One configured source directory that is backed up into its own archive.
///
/// At most one of `include_patterns` and `exclude_patterns` may be non-empty. With
/// neither configured every file is relevant.
#[derive(Clone, Debug, Deserialize, Validate, Builder, Getters)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
#[validate(schema(function = validate_filter_mode))]
#[getset(get = "pub")]
pub struct Target {
    #[validate(length(min = 1))]
    #[builder(into)]
    description: String,
    #[validate(custom(function = validate_dir_exist))]
    #[builder(into)]
    source_path: PathBuf,
    #[validate(custom(function = validate_valid_archive_base_name))]
    #[builder(into)]
    archive_name: String,
    #[serde(default)]
    #[builder(into)]
    include_patterns: Option<Vec<AnchoredRegex>>,
    #[serde(default)]
    #[builder(into)]
    exclude_patterns: Option<Vec<AnchoredRegex>>,
}

/// How a target selects its files, resolved from the two pattern lists.
#[derive(Debug, Clone, Copy)]
pub enum FilterMode<'a> {
    All,
    Include(&'a [AnchoredRegex]),
    Exclude(&'a [AnchoredRegex]),
}

impl Target {
    pub fn filter_mode(&self) -> Result<FilterMode<'_>> {
        let include = self.include_patterns.as_deref();
        let exclude = self.exclude_patterns.as_deref();
        match (include, exclude) {
            (None, None) => Ok(FilterMode::All),
            (Some(inc), Some(exc)) if !inc.is_empty() && !exc.is_empty() => {
                Err(self.ambiguous_filter("include and exclude patterns are both set"))
            }
            (Some(inc), _) if !inc.is_empty() => Ok(FilterMode::Include(inc)),
            (_, Some(exc)) if !exc.is_empty() => Ok(FilterMode::Exclude(exc)),
            _ => Err(self.ambiguous_filter("pattern lists are present but empty")),
        }
    }

    /// Decides whether the file at `path` belongs in this target's archive.
    ///
    /// Patterns are matched against the whole path string from its first character.
    pub fn is_relevant<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let path = path.as_ref().to_string_lossy();
        let relevant = match self.filter_mode()? {
            FilterMode::All => true,
            FilterMode::Include(patterns) => first_match(patterns, &path).is_some(),
            FilterMode::Exclude(patterns) => first_match(patterns, &path).is_none(),
        };
        Ok(relevant)
    }

    fn ambiguous_filter(&self, reason: &'static str) -> Error {
        Error::AmbiguousFilter {
            target: self.description.clone(),
            reason,
        }
    }
}

fn first_match<'a>(patterns: &'a [AnchoredRegex], path: &str) -> Option<&'a AnchoredRegex> {
    let matched = patterns.iter().find(|p| p.is_match(path));
    if let Some(pattern) = matched {
        tracing::trace!("{:?} matched pattern {}", path, pattern);
    }
    matched
}

fn validate_filter_mode(target: &Target) -> std::result::Result<(), ValidationError> {
    target.filter_mode().map(|_| ()).map_err(|e| {
        ValidationError::new("AmbiguousFilter").with_message(e.to_string().into())
    })
}
