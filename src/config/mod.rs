use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};
use crate::utils::split_qualified_name;
use crate::validation::{validate_identifier_length, validate_qualified_name};

/// Engine limit on identifier length in bytes (NAMEDATALEN - 1)
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Suffix given to external leaf partitions in the metadata set
pub const EXT_PART_SUFFIX: &str = "_ext_part_";

/// Grantee used for an ACL that was revoked from everyone
pub const EMPTY_ACL_GRANTEE: &str = "GRANTEE";

/// Enable verbose dependency logging (for debugging)
pub const DEBUG_DEPENDENCIES: bool = false;

/// Policy flags for one backup run
///
/// Every field defaults to "off"/empty, so a config file only has to name
/// what it changes:
///
/// ```json
/// { "leaf_partition_data": true, "include_relations": ["public.sales"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Capture data per leaf partition instead of through the partition root
    pub leaf_partition_data: bool,
    /// Schema-qualified relations to back up (empty = everything)
    pub include_relations: Vec<String>,
    /// Schema-qualified relations to skip
    pub exclude_relations: Vec<String>,
    /// Schemas to back up (empty = every schema)
    pub include_schemas: Vec<String>,
    /// Schemas to skip
    pub exclude_schemas: Vec<String>,
}

impl BackupConfig {
    /// Parse and validate a JSON config document
    pub fn from_json(json: &str) -> BackupResult<Self> {
        let config: BackupConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject flag combinations the filters cannot honor
    pub fn validate(&self) -> BackupResult<()> {
        if !self.include_relations.is_empty() && !self.exclude_relations.is_empty() {
            return Err(BackupError::ConfigError {
                setting: "include_relations".to_string(),
                value: self.include_relations.join(","),
                reason: "cannot be combined with exclude_relations".to_string(),
            });
        }
        if !self.include_schemas.is_empty() && !self.exclude_schemas.is_empty() {
            return Err(BackupError::ConfigError {
                setting: "include_schemas".to_string(),
                value: self.include_schemas.join(","),
                reason: "cannot be combined with exclude_schemas".to_string(),
            });
        }

        for name in self.include_relations.iter().chain(&self.exclude_relations) {
            validate_qualified_name(name, "relation filter")?;
            if let Some((schema, relation)) = split_qualified_name(name) {
                validate_identifier_length(schema)?;
                validate_identifier_length(relation)?;
            }
        }

        Ok(())
    }

    /// Whether schema and exclude filters keep this qualified relation
    ///
    /// The include-relation list is not applied here: it drives partition
    /// classification, which needs to see the whole hierarchy.
    pub fn selects_relation(&self, schema: &str, fqn: &str) -> bool {
        if !self.include_schemas.is_empty() && !self.include_schemas.iter().any(|s| s == schema) {
            return false;
        }
        if self.exclude_schemas.iter().any(|s| s == schema) {
            return false;
        }
        !self.exclude_relations.iter().any(|r| r == fqn)
    }
}
