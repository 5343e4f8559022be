//! Object metadata: owners, comments, security labels and ACLs
//!
//! The query layer returns one row per unnested ACL item; this module folds
//! those rows into per-object maps keyed by catalog oid.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::config::EMPTY_ACL_GRANTEE;
use crate::error::BackupResult;
use crate::parser::parse_acl;

/// A grantable privilege. Declaration order is the order GRANT lists them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Select,
    Insert,
    Update,
    Delete,
    References,
    Trigger,
    Usage,
    Execute,
    Create,
    Temporary,
    Connect,
}

impl Privilege {
    pub fn keyword(self) -> &'static str {
        match self {
            Privilege::Select => "SELECT",
            Privilege::Insert => "INSERT",
            Privilege::Update => "UPDATE",
            Privilege::Delete => "DELETE",
            Privilege::References => "REFERENCES",
            Privilege::Trigger => "TRIGGER",
            Privilege::Usage => "USAGE",
            Privilege::Execute => "EXECUTE",
            Privilege::Create => "CREATE",
            Privilege::Temporary => "TEMPORARY",
            Privilege::Connect => "CONNECT",
        }
    }

    /// Map an aclitem privilege letter; `None` for letters this tool never grants
    pub fn from_acl_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Privilege::Insert),
            'r' => Some(Privilege::Select),
            'w' => Some(Privilege::Update),
            'd' => Some(Privilege::Delete),
            'x' => Some(Privilege::References),
            't' => Some(Privilege::Trigger),
            'U' => Some(Privilege::Usage),
            'X' => Some(Privilege::Execute),
            'C' => Some(Privilege::Create),
            'T' => Some(Privilege::Temporary),
            'c' => Some(Privilege::Connect),
            _ => None,
        }
    }
}

/// One grantee's privileges on an object
///
/// A privilege sits in exactly one of the two sets: `privileges` for a plain
/// grant, `grantable` when it was granted WITH GRANT OPTION. An empty
/// grantee means PUBLIC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Acl {
    pub grantee: String,
    pub privileges: BTreeSet<Privilege>,
    pub grantable: BTreeSet<Privilege>,
}

impl Acl {
    /// Placeholder for an ACL that was revoked from everyone
    pub fn empty_placeholder() -> Self {
        Acl {
            grantee: EMPTY_ACL_GRANTEE.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty_placeholder(&self) -> bool {
        self.grantee == EMPTY_ACL_GRANTEE && self.privileges.is_empty() && self.grantable.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectMetadata {
    pub privileges: Vec<Acl>,
    pub owner: String,
    pub comment: String,
    pub security_label_provider: String,
    pub security_label: String,
}

/// Catalog oid -> metadata
pub type MetadataMap = HashMap<u32, ObjectMetadata>;

/// Table oid -> column name -> ACLs
pub type ColumnPrivilegesMap = HashMap<u32, HashMap<String, Vec<Acl>>>;

/// How the query layer classified an object's ACL array
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclKind<'a> {
    /// The object has the default ACL: no explicit privileges
    Default,
    /// The ACL was revoked from everyone
    Empty,
    /// An ordinary unnested ACL item (any other kind string)
    Item(&'a str),
}

impl<'a> AclKind<'a> {
    pub fn from_row(kind: &str, privileges: Option<&'a str>) -> Self {
        match kind {
            "Default" => AclKind::Default,
            "Empty" => AclKind::Empty,
            _ => AclKind::Item(privileges.unwrap_or("")),
        }
    }
}

/// Row returned by the per-object-type metadata query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataQueryRow {
    pub oid: u32,
    pub privileges: Option<String>,
    pub kind: String,
    pub owner: String,
    pub comment: String,
    pub security_label_provider: String,
    pub security_label: String,
}

/// Row returned by the comment-only query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentQueryRow {
    pub oid: u32,
    pub comment: String,
}

/// Row returned by the column privileges query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPrivilegesRow {
    pub table_oid: u32,
    pub name: String,
    pub privileges: Option<String>,
    pub kind: String,
}

/// Fold one ACL row into an object's ACL list
fn push_acl(acls: &mut Vec<Acl>, kind: AclKind<'_>) -> BackupResult<()> {
    match kind {
        AclKind::Default => {}
        AclKind::Empty => {
            if !acls.iter().any(Acl::is_empty_placeholder) {
                acls.push(Acl::empty_placeholder());
            }
        }
        AclKind::Item(item) => {
            if let Some(acl) = parse_acl(item)? {
                acls.push(acl);
            }
        }
    }
    Ok(())
}

/// Build a metadata map from metadata query rows (one row per ACL item)
///
/// Owner, comment and label are taken from the first row seen for an oid.
pub fn construct_metadata_map(rows: &[MetadataQueryRow]) -> BackupResult<MetadataMap> {
    let mut map = MetadataMap::new();

    for row in rows {
        let entry = map.entry(row.oid).or_insert_with(|| ObjectMetadata {
            privileges: Vec::new(),
            owner: row.owner.clone(),
            comment: row.comment.clone(),
            security_label_provider: row.security_label_provider.clone(),
            security_label: row.security_label.clone(),
        });
        push_acl(&mut entry.privileges, AclKind::from_row(&row.kind, row.privileges.as_deref()))?;
    }

    debug!("Constructed metadata for {} objects", map.len());
    Ok(map)
}

/// Build a metadata map carrying only comments
pub fn construct_comment_map(rows: &[CommentQueryRow]) -> MetadataMap {
    rows.iter()
        .map(|row| {
            (
                row.oid,
                ObjectMetadata {
                    comment: row.comment.clone(),
                    ..Default::default()
                },
            )
        })
        .collect()
}

/// Build `table oid -> column -> ACLs` from column privilege rows
///
/// Every column named by a row gets an entry, even a `Default` one with no ACLs.
pub fn construct_column_privileges_map(
    rows: &[ColumnPrivilegesRow],
) -> BackupResult<ColumnPrivilegesMap> {
    let mut map = ColumnPrivilegesMap::new();

    for row in rows {
        let acls = map
            .entry(row.table_oid)
            .or_default()
            .entry(row.name.clone())
            .or_default();
        push_acl(acls, AclKind::from_row(&row.kind, row.privileges.as_deref()))?;
    }

    Ok(map)
}
