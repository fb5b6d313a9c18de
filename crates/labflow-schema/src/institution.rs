use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read institution config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse institution config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("unsupported config_version: {0}, expected 1")]
    UnsupportedVersion(u32),
    #[error("institution.name must not be empty")]
    EmptyName,
    #[error("departments list must not be empty")]
    NoDepartments,
    #[error("duplicate department entry: '{0}'")]
    DuplicateDepartment(String),
}

/// Institution-wide configuration, loaded from `labflow.toml`.
///
/// The departments list is the closed set that user registration and
/// request submission validate against when a config is supplied. It
/// precedes the `[institution]` table in the file, since top-level keys
/// must come before the first table header.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InstitutionConfig {
    pub config_version: u32,
    pub departments: Vec<String>,
    pub institution: InstitutionSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct InstitutionSection {
    pub name: String,
}

impl InstitutionConfig {
    pub fn has_department(&self, department: &str) -> bool {
        self.departments.iter().any(|d| d == department)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.config_version != 1 {
            return Err(ConfigError::UnsupportedVersion(self.config_version));
        }
        if self.institution.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.departments.is_empty() {
            return Err(ConfigError::NoDepartments);
        }
        for (i, d) in self.departments.iter().enumerate() {
            if self.departments[..i].contains(d) {
                return Err(ConfigError::DuplicateDepartment(d.clone()));
            }
        }
        Ok(())
    }
}

pub fn parse_institution_str(input: &str) -> Result<InstitutionConfig, ConfigError> {
    let config: InstitutionConfig = toml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

pub fn parse_institution_file(path: impl AsRef<Path>) -> Result<InstitutionConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_institution_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
config_version = 1
departments = [
    "Computer Science and Engineering",
    "Mechanical Engineering",
    "Electrical and Electronics Engineering",
]

[institution]
name = "College of Engineering Perumon"
"#;

    #[test]
    fn parses_full_config() {
        let config = parse_institution_str(SAMPLE).expect("should parse");
        assert_eq!(config.config_version, 1);
        assert_eq!(config.institution.name, "College of Engineering Perumon");
        assert_eq!(config.departments.len(), 3);
        assert!(config.has_department("Mechanical Engineering"));
        assert!(!config.has_department("Fine Arts"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let input = r#"
config_version = 1
campus = "south"
departments = ["A"]

[institution]
name = "X"
"#;
        assert!(parse_institution_str(input).is_err());
    }

    #[test]
    fn rejects_unsupported_version() {
        let input = r#"
config_version = 2
departments = ["A"]

[institution]
name = "X"
"#;
        assert!(matches!(
            parse_institution_str(input),
            Err(ConfigError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_empty_departments() {
        let input = r#"
config_version = 1
departments = []

[institution]
name = "X"
"#;
        assert!(matches!(parse_institution_str(input), Err(ConfigError::NoDepartments)));
    }

    #[test]
    fn rejects_duplicate_departments() {
        let input = r#"
config_version = 1
departments = ["A", "B", "A"]

[institution]
name = "X"
"#;
        assert!(matches!(
            parse_institution_str(input),
            Err(ConfigError::DuplicateDepartment(d)) if d == "A"
        ));
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let dir = std::env::temp_dir().join("labflow-schema-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("labflow.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = parse_institution_file(&path).unwrap();
        assert_eq!(config.departments.len(), 3);
        let _ = fs::remove_file(&path);
    }
}
