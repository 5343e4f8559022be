use serde::{Deserialize, Serialize};

use crate::utils::make_fqn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Volatility {
    #[serde(rename = "i")]
    Immutable,
    #[serde(rename = "s")]
    Stable,
    #[default]
    #[serde(rename = "v")]
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataAccess {
    #[serde(rename = "c")]
    ContainsSql,
    #[serde(rename = "m")]
    ModifiesSqlData,
    #[serde(rename = "n")]
    NoSql,
    #[serde(rename = "r")]
    ReadsSqlData,
}

impl DataAccess {
    pub fn keyword(self) -> &'static str {
        match self {
            DataAccess::ContainsSql => "CONTAINS SQL",
            DataAccess::ModifiesSqlData => "MODIFIES SQL DATA",
            DataAccess::NoSql => "NO SQL",
            DataAccess::ReadsSqlData => "READS SQL DATA",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Function {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub arguments: String,
    /// Argument types only, as used in `COMMENT ON FUNCTION f(int, text)`
    pub ident_args: String,
    pub result_type: String,
    pub returns_set: bool,
    pub function_body: String,
    /// Shared library of a C function; the symbol is then in `function_body`
    pub binary_path: String,
    pub language: String,
    pub volatility: Volatility,
    pub is_strict: bool,
    pub is_security_definer: bool,
    pub data_access: Option<DataAccess>,
    pub cost: f32,
    pub num_rows: f32,
    /// Pre-rendered `SET ...` lines
    pub config: String,
    pub depends_upon: Vec<String>,
}

impl Function {
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }

    /// Identity used for ordering and metadata: the name plus argument types
    pub fn fqn_with_args(&self) -> String {
        format!("{}({})", self.fqn(), self.ident_args)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseTypeDefinition {
    pub input: String,
    pub output: String,
    pub receive: String,
    pub send: String,
    pub mod_in: String,
    pub mod_out: String,
    /// -1 for variable length
    pub internal_length: i32,
    pub is_passed_by_value: bool,
    /// `c` char, `s` int2, `i` int4, `d` double
    pub alignment: String,
    /// `p` plain, `e` external, `m` main, `x` extended
    pub storage: String,
    pub default_val: String,
    pub element: String,
    pub delimiter: String,
    pub category: String,
    pub preferred: bool,
    pub collatable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeAttribute {
    pub name: String,
    pub type_name: String,
    pub collation: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainDefinition {
    pub base_type: String,
    pub default_val: String,
    pub collation: String,
    pub not_null: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Shell,
    Base(BaseTypeDefinition),
    Composite(Vec<CompositeAttribute>),
    Domain(DomainDefinition),
    Enum(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Type {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    pub kind: TypeKind,
    pub depends_upon: Vec<String>,
}

impl Type {
    pub fn fqn(&self) -> String {
        make_fqn(&self.schema, &self.name)
    }

    pub fn is_domain(&self) -> bool {
        matches!(self.kind, TypeKind::Domain(_))
    }
}
