//! Catalog snapshot model
//!
//! Read-only copies of what the query layer fetched. Names are stored the
//! way the engine prints them (already quoted where needed), so they can be
//! spliced into DDL unchanged.

use serde::{Deserialize, Serialize};

use crate::utils::make_fqn;

mod function;
mod table;
mod textsearch;

pub use function::{
    BaseTypeDefinition, CompositeAttribute, DataAccess, DomainDefinition, Function, Type, TypeKind,
    Volatility,
};
pub use table::{
    ColumnDefinition, ExternalTableDefinition, ExternalTableKind, ForeignTableDefinition,
    PartitionType, ReplicaIdentity, TableDefinition,
};
pub use textsearch::{
    TextSearchConfiguration, TextSearchDictionary, TextSearchParser, TextSearchTemplate,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Relation {
    pub schema_oid: u32,
    pub oid: u32,
    pub schema: String,
    pub name: String,
    /// Qualified names of objects this relation must be created after
    pub depends_upon: Vec<String>,
    /// Qualified names of direct inheritance parents, in declaration order
    pub inherits: Vec<String>,
}

impl Relation {
    pub fn new(schema_oid: u32, oid: u32, schema: &str, name: &str) -> Self {
        Relation {
            schema_oid,
            oid,
            schema: schema.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceDefinition {
    pub last_val: i64,
    pub increment: i64,
    pub max_val: i64,
    pub min_val: i64,
    pub cache_val: i64,
    pub log_cnt: i64,
    pub is_cycled: bool,
    pub is_called: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sequence {
    pub relation: Relation,
    pub definition: SequenceDefinition,
}

impl Sequence {
    pub fn fqn(&self) -> String {
        self.relation.fqn()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct View {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub definition: String,
    pub depends_upon: Vec<String>,
}

impl View {
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraint {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    /// `c` check, `f` foreign key, `p` primary key, `u` unique, `x` exclusion
    pub con_type: String,
    pub con_def: String,
    /// Qualified table or domain the constraint is attached to
    pub owning_object: String,
    pub is_domain_constraint: bool,
    pub is_partition_parent: bool,
}

impl Constraint {
    pub fn is_foreign_key(&self) -> bool {
        self.con_type == "f"
    }
}
