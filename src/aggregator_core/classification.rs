//! Species classification lookups and the policy for species missing from them

use super::source::{AggregateError, ClassificationLookup, ClassificationSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_UNKNOWN_LABEL: &str = "unknown";

/// What to do with a species that has no classification entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Leave it out of every classified view
    #[default]
    Drop,
    /// Count it under the given label
    Bucket(String),
}

impl UnclassifiedPolicy {
    /// Label for `category`, or `None` if the category is dropped
    pub fn resolve<'a>(&'a self, lookup: &'a ClassificationLookup, category: &str) -> Option<&'a str> {
        match lookup.get(category) {
            Some(label) => Some(label.as_str()),
            None => match self {
                UnclassifiedPolicy::Drop => None,
                UnclassifiedPolicy::Bucket(label) => Some(label.as_str()),
            },
        }
    }
}

impl FromStr for UnclassifiedPolicy {
    type Err = String;

    /// Accepts `drop`, `bucket` or `bucket:<label>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "drop" => return Ok(UnclassifiedPolicy::Drop),
            "bucket" => return Ok(UnclassifiedPolicy::Bucket(DEFAULT_UNKNOWN_LABEL.to_string())),
            _ => {}
        }

        match s.split_once(':') {
            Some((kind, label)) if kind.eq_ignore_ascii_case("bucket") && !label.trim().is_empty() => {
                Ok(UnclassifiedPolicy::Bucket(label.trim().to_string()))
            }
            _ => Err(format!(
                "expected 'drop', 'bucket' or 'bucket:<label>', got '{}'",
                s
            )),
        }
    }
}

impl fmt::Display for UnclassifiedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnclassifiedPolicy::Drop => write!(f, "drop"),
            UnclassifiedPolicy::Bucket(label) => write!(f, "bucket:{}", label),
        }
    }
}

/// Classification mapping stored as a flat JSON object:
/// `{"Raptor": "carnivore", "Stego": "herbivore"}`
#[derive(Debug, Clone)]
pub struct JsonClassificationFile {
    path: PathBuf,
}

impl JsonClassificationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClassificationSource for JsonClassificationFile {
    fn load(&self) -> Result<ClassificationLookup, AggregateError> {
        let json = std::fs::read_to_string(&self.path)?;
        let lookup: ClassificationLookup = serde_json::from_str(&json)?;
        log::debug!(
            "Loaded {} classifications from {}",
            lookup.len(),
            self.path.display()
        );
        Ok(lookup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup() -> ClassificationLookup {
        [("Raptor", "carnivore"), ("Stego", "herbivore")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let lookup = lookup();
        assert_eq!(UnclassifiedPolicy::Drop.resolve(&lookup, "Raptor"), Some("carnivore"));
        assert_eq!(UnclassifiedPolicy::Drop.resolve(&lookup, "Dodo"), None);

        let bucket = UnclassifiedPolicy::Bucket("unknown".to_string());
        assert_eq!(bucket.resolve(&lookup, "Dodo"), Some("unknown"));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("drop".parse::<UnclassifiedPolicy>(), Ok(UnclassifiedPolicy::Drop));
        assert_eq!(
            "BUCKET".parse::<UnclassifiedPolicy>(),
            Ok(UnclassifiedPolicy::Bucket("unknown".to_string()))
        );
        assert_eq!(
            "bucket:Other".parse::<UnclassifiedPolicy>(),
            Ok(UnclassifiedPolicy::Bucket("Other".to_string()))
        );
        assert!("bucket:".parse::<UnclassifiedPolicy>().is_err());
        assert!("keep".parse::<UnclassifiedPolicy>().is_err());
    }

    #[test]
    fn test_json_file_lookup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Raptor":"carnivore","Trex":"carnivore"}}"#).unwrap();

        let lookup = JsonClassificationFile::new(file.path()).load().unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup["Trex"], "carnivore");
    }

    #[test]
    fn test_malformed_json_is_data_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["Raptor"]"#).unwrap();

        let err = JsonClassificationFile::new(file.path()).load().unwrap_err();
        assert!(matches!(err, AggregateError::DataUnavailable(_)));
    }
}
