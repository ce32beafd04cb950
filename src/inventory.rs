use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Inventory file not found: {0:?}")]
    NotFound(PathBuf),
    #[error("Reading inventory {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parsing inventory {path:?}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Inventory must be a YAML list of device records, got {0}")]
    NotAList(&'static str),
}

/// Load the raw device records from a YAML inventory file.
///
/// Records are returned untyped; see [`crate::validate`] for turning them into devices.
pub(crate) fn load_inventory(path: &Path) -> Result<Vec<Value>, InventoryError> {
    if !path.is_file() {
        return Err(InventoryError::NotFound(path.to_path_buf()));
    }

    let data = fs::read_to_string(path).map_err(|source| InventoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_inventory(path, &data)
}

fn parse_inventory(path: &Path, data: &str) -> Result<Vec<Value>, InventoryError> {
    let document: Value = serde_yaml::from_str(data).map_err(|source| InventoryError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match document {
        Value::Sequence(records) => Ok(records),
        other => Err(InventoryError::NotAList(kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::inventory::{load_inventory, parse_inventory, InventoryError};

    #[test]
    fn load_inventory_successfully() -> Result<(), anyhow::Error> {
        let records = load_inventory(Path::new("testdata/routers.yaml"))?;

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].get("hostname").and_then(|h| h.as_str()),
            Some("nashville-core-01")
        );

        Ok(())
    }

    #[test]
    fn load_inventory_fails_due_to_missing_file() {
        let err = load_inventory(Path::new("testdata/<missing>.yaml")).unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(_)));
    }

    #[test]
    fn load_inventory_fails_for_mapping() {
        let err = load_inventory(Path::new("testdata/not_a_list.yaml")).unwrap_err();
        assert!(matches!(err, InventoryError::NotAList("a mapping")));
    }

    #[test]
    fn parse_inventory_rejects_scalars() {
        let path = Path::new("inline.yaml");

        assert!(matches!(
            parse_inventory(path, "just a string"),
            Err(InventoryError::NotAList("a string"))
        ));
        assert!(matches!(
            parse_inventory(path, "~"),
            Err(InventoryError::NotAList("null"))
        ));
    }

    #[test]
    fn parse_inventory_fails_due_to_invalid_yaml() {
        assert!(matches!(
            parse_inventory(Path::new("inline.yaml"), "- [unclosed"),
            Err(InventoryError::Parse { .. })
        ));
    }
}
