use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The contracts one driver run generates bindings for.
///
/// ```toml
/// [[contracts]]
/// name = "price_prediction"
/// schema_dir = "contracts/price_prediction/schema"
/// out_dir = "contracts/price_prediction/bindings"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    #[serde(default)]
    pub contracts: Vec<ContractTarget>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractTarget {
    /// Contract identity, used for the client name and in diagnostics.
    pub name:       String,
    pub schema_dir: PathBuf,
    pub out_dir:    PathBuf,
    /// Output file name inside `out_dir`. Defaults to `<name>.rs`.
    #[serde(default)]
    pub file:       Option<String>,
}

impl ContractTarget {
    pub fn new(name: impl Into<String>, schema_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        ContractTarget {
            name:       name.into(),
            schema_dir: schema_dir.into(),
            out_dir:    out_dir.into(),
            file:       None,
        }
    }

    pub fn output_path(&self) -> PathBuf {
        match &self.file {
            Some(file) => self.out_dir.join(file),
            None       => self.out_dir.join(format!("{}.rs", self.name)),
        }
    }

    fn resolve_against(mut self, base: &Path) -> Self {
        if self.schema_dir.is_relative() {
            self.schema_dir = base.join(&self.schema_dir);
        }
        if self.out_dir.is_relative() {
            self.out_dir = base.join(&self.out_dir);
        }
        self
    }
}

impl DriverConfig {
    pub fn single(target: ContractTarget) -> Self {
        DriverConfig { contracts: vec![target] }
    }

    /// Parses TOML text; relative directories are resolved against `base`.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self> {
        let config: DriverConfig = toml::from_str(text).context("Invalid driver config")?;
        let config = DriverConfig {
            contracts: config
                .contracts
                .into_iter()
                .map(|target| target.resolve_against(base))
                .collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file. Relative directories are taken relative to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml(&text, base).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let mut outputs = HashSet::new();
        for target in &self.contracts {
            if target.name.trim().is_empty() {
                bail!("A contract has an empty name");
            }
            if !outputs.insert(target.output_path()) {
                bail!(
                    "Contract {} writes to {}, which another contract already writes to",
                    target.name,
                    target.output_path().display()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_base() {
        let config = DriverConfig::from_toml(
            r#"
            [[contracts]]
            name = "price_prediction"
            schema_dir = "contracts/price_prediction/schema"
            out_dir = "/abs/bindings"
            file = "prediction.rs"
            "#,
            Path::new("/work"),
        )
        .unwrap();

        let target = &config.contracts[0];
        assert_eq!(target.schema_dir, PathBuf::from("/work/contracts/price_prediction/schema"));
        assert_eq!(target.out_dir, PathBuf::from("/abs/bindings"));
        assert_eq!(target.output_path(), PathBuf::from("/abs/bindings/prediction.rs"));
    }

    #[test]
    fn test_default_file_name() {
        let target = ContractTarget::new("fast_oracle", "schema", "out");
        assert_eq!(target.output_path(), PathBuf::from("out/fast_oracle.rs"));
    }

    #[test]
    fn test_rejects_unknown_fields_and_shared_outputs() {
        let err = DriverConfig::from_toml("[[contracts]]\nname = \"a\"\nschema = \"s\"\n", Path::new(".")).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid driver config"));

        let err = DriverConfig::from_toml(
            r#"
            [[contracts]]
            name = "a"
            schema_dir = "a/schema"
            out_dir = "out"
            file = "bindings.rs"

            [[contracts]]
            name = "b"
            schema_dir = "b/schema"
            out_dir = "out"
            file = "bindings.rs"
            "#,
            Path::new("."),
        )
        .unwrap_err();
        assert!(err.to_string().contains("another contract already writes to"));
    }
}
