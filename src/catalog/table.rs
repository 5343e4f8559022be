use serde::{Deserialize, Serialize};

use crate::metadata::Acl;

/// Position of a relation in a partition hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionType {
    #[default]
    #[serde(rename = "n")]
    None,
    #[serde(rename = "p")]
    Parent,
    #[serde(rename = "i")]
    Intermediate,
    #[serde(rename = "l")]
    Leaf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaIdentity {
    #[default]
    #[serde(rename = "d")]
    Default,
    #[serde(rename = "f")]
    Full,
    #[serde(rename = "n")]
    Nothing,
    /// Set through the index itself, nothing to emit for the table
    #[serde(rename = "i")]
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDefinition {
    /// 1-based ordinal, unique within a table
    pub num: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub has_default: bool,
    pub default_val: String,
    pub encoding: String,
    /// -1 means the column uses the default statistics target
    pub stat_target: i32,
    pub storage_type: String,
    pub acl: Vec<Acl>,
    pub comment: String,
    pub collation: String,
    pub security_label_provider: String,
    pub security_label: String,
    pub fdw_options: String,
    pub options: String,
}

impl Default for ColumnDefinition {
    fn default() -> Self {
        ColumnDefinition {
            num: 0,
            name: String::new(),
            type_name: String::new(),
            not_null: false,
            has_default: false,
            default_val: String::new(),
            encoding: String::new(),
            stat_target: -1,
            storage_type: String::new(),
            acl: Vec::new(),
            comment: String::new(),
            collation: String::new(),
            security_label_provider: String::new(),
            security_label: String::new(),
            fdw_options: String::new(),
            options: String::new(),
        }
    }
}

impl ColumnDefinition {
    pub fn new(num: i32, name: &str, type_name: &str) -> Self {
        ColumnDefinition {
            num,
            name: name.to_string(),
            type_name: type_name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTableKind {
    Readable,
    ReadableWeb,
    Writable,
    WritableWeb,
}

impl ExternalTableKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ExternalTableKind::Readable => "READABLE EXTERNAL",
            ExternalTableKind::ReadableWeb => "READABLE EXTERNAL WEB",
            ExternalTableKind::Writable => "WRITABLE EXTERNAL",
            ExternalTableKind::WritableWeb => "WRITABLE EXTERNAL WEB",
        }
    }

    pub fn is_writable(self) -> bool {
        matches!(self, ExternalTableKind::Writable | ExternalTableKind::WritableWeb)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalTableDefinition {
    pub uris: Vec<String>,
    /// `ALL_SEGMENTS`, `MASTER_ONLY`, `PER_HOST`, `HOST:<h>`,
    /// `TOTAL_SEGS:<n>` or `SEGMENT_ID:<n>`
    pub exec_location: String,
    /// `t` text, `c` csv, `b` custom, `a` avro, `p` parquet
    pub format_type: String,
    pub format_opts: String,
    pub options: String,
    pub command: String,
    pub reject_limit: i64,
    /// `r` rows, `p` percent
    pub reject_limit_type: String,
    pub log_errors: bool,
    pub err_table_schema: String,
    pub err_table_name: String,
    pub encoding: String,
    pub writable: bool,
}

impl ExternalTableDefinition {
    /// Command-based tables and http locations are web tables
    pub fn kind(&self) -> ExternalTableKind {
        let is_web = self.uris.is_empty() || self.uris.iter().any(|uri| uri.starts_with("http"));
        match (self.writable, is_web) {
            (false, false) => ExternalTableKind::Readable,
            (false, true) => ExternalTableKind::ReadableWeb,
            (true, false) => ExternalTableKind::Writable,
            (true, true) => ExternalTableKind::WritableWeb,
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self.format_type.as_str() {
            "c" => "csv",
            "b" => "custom",
            "a" => "avro",
            "p" => "parquet",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignTableDefinition {
    pub server: String,
    pub options: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefinition {
    /// `DISTRIBUTED RANDOMLY`, `DISTRIBUTED BY (...)` or `DISTRIBUTED REPLICATED`
    pub dist_policy: String,
    pub part_def: String,
    pub part_template_def: String,
    pub storage_opts: String,
    pub column_defs: Vec<ColumnDefinition>,
    pub ext_table_def: Option<ExternalTableDefinition>,
    pub tablespace: String,
    pub is_external: bool,
    /// Composite type of a typed table (`OF <type>`)
    pub table_type: String,
    pub partition_type: PartitionType,
    /// Unqualified name of the partition root, same schema as the relation
    pub partition_root: Option<String>,
    pub is_unlogged: bool,
    pub foreign_def: Option<ForeignTableDefinition>,
    pub replica_identity: ReplicaIdentity,
}

impl TableDefinition {
    pub fn is_external_leaf(&self) -> bool {
        self.is_external && self.partition_type == PartitionType::Leaf
    }

    pub fn is_typed(&self) -> bool {
        !self.table_type.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_table_kind() {
        let mut def = ExternalTableDefinition::default();
        assert_eq!(def.kind(), ExternalTableKind::ReadableWeb);

        def.uris = vec!["gpfdist://host:8080/data.txt".to_string()];
        assert_eq!(def.kind(), ExternalTableKind::Readable);

        def.uris = vec!["http://webhost/data.txt".to_string()];
        assert_eq!(def.kind(), ExternalTableKind::ReadableWeb);

        def.writable = true;
        assert_eq!(def.kind().keyword(), "WRITABLE EXTERNAL WEB");
        assert!(def.kind().is_writable());
    }

    #[test]
    fn test_format_name_defaults_to_text() {
        let mut def = ExternalTableDefinition::default();
        assert_eq!(def.format_name(), "text");
        def.format_type = "c".to_string();
        assert_eq!(def.format_name(), "csv");
    }

    #[test]
    fn test_is_external_leaf() {
        let mut def = TableDefinition {
            is_external: true,
            ..Default::default()
        };
        assert!(!def.is_external_leaf());

        def.partition_type = PartitionType::Leaf;
        assert!(def.is_external_leaf());
    }

    #[test]
    fn test_partition_type_serde_tags() {
        let def: TableDefinition =
            serde_json::from_str(r#"{ "partition_type": "l", "partition_root": "sales" }"#).unwrap();
        assert_eq!(def.partition_type, PartitionType::Leaf);
        assert_eq!(def.partition_root.as_deref(), Some("sales"));
        assert_eq!(def.replica_identity, ReplicaIdentity::Default);
    }

    #[test]
    fn test_column_default_stat_target_unset() {
        let column = ColumnDefinition::new(1, "i", "integer");
        assert_eq!(column.stat_target, -1);
    }
}
