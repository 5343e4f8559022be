//! Post-definition statements: COMMENT, ALTER ... OWNER, REVOKE/GRANT and
//! SECURITY LABEL.
//!
//! Every statement builder returns its text prefixed with a blank line, or an
//! empty string when there is nothing to say, so callers can print the
//! pieces back to back.

use crate::metadata::{Acl, ObjectMetadata, Privilege};
use crate::utils::escape_single_quotes;

use super::toc::MetadataWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Table,
    ForeignTable,
    View,
    Sequence,
    Column,
    Function,
    Type,
    Domain,
    Schema,
    Database,
    Language,
    Tablespace,
    Constraint,
    TextSearchParser,
    TextSearchTemplate,
    TextSearchDictionary,
    TextSearchConfiguration,
}

const TABLE_PRIVILEGES: &[Privilege] = &[
    Privilege::Select,
    Privilege::Insert,
    Privilege::Update,
    Privilege::Delete,
    Privilege::References,
    Privilege::Trigger,
];
const SEQUENCE_PRIVILEGES: &[Privilege] = &[Privilege::Select, Privilege::Update, Privilege::Usage];
const COLUMN_PRIVILEGES: &[Privilege] = &[
    Privilege::Select,
    Privilege::Insert,
    Privilege::Update,
    Privilege::References,
];
const DATABASE_PRIVILEGES: &[Privilege] = &[Privilege::Create, Privilege::Temporary, Privilege::Connect];
const SCHEMA_PRIVILEGES: &[Privilege] = &[Privilege::Usage, Privilege::Create];

impl ObjectType {
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectType::Table => "TABLE",
            ObjectType::ForeignTable => "FOREIGN TABLE",
            ObjectType::View => "VIEW",
            ObjectType::Sequence => "SEQUENCE",
            ObjectType::Column => "COLUMN",
            ObjectType::Function => "FUNCTION",
            ObjectType::Type => "TYPE",
            ObjectType::Domain => "DOMAIN",
            ObjectType::Schema => "SCHEMA",
            ObjectType::Database => "DATABASE",
            ObjectType::Language => "LANGUAGE",
            ObjectType::Tablespace => "TABLESPACE",
            ObjectType::Constraint => "CONSTRAINT",
            ObjectType::TextSearchParser => "TEXT SEARCH PARSER",
            ObjectType::TextSearchTemplate => "TEXT SEARCH TEMPLATE",
            ObjectType::TextSearchDictionary => "TEXT SEARCH DICTIONARY",
            ObjectType::TextSearchConfiguration => "TEXT SEARCH CONFIGURATION",
        }
    }

    /// Keyword after ALTER in the owner statement; `None` when no owner is emitted
    fn owner_keyword(self) -> Option<&'static str> {
        match self {
            ObjectType::Sequence | ObjectType::ForeignTable => Some("TABLE"),
            ObjectType::View
            | ObjectType::Column
            | ObjectType::Constraint
            | ObjectType::TextSearchParser
            | ObjectType::TextSearchTemplate => None,
            other => Some(other.keyword()),
        }
    }

    /// Text between ON and the object name in REVOKE/GRANT
    fn privilege_target(self) -> &'static str {
        match self {
            ObjectType::View => "",
            ObjectType::Column | ObjectType::Table | ObjectType::ForeignTable => "TABLE ",
            ObjectType::Sequence => "SEQUENCE ",
            ObjectType::Function => "FUNCTION ",
            ObjectType::Type => "TYPE ",
            ObjectType::Domain => "DOMAIN ",
            ObjectType::Schema => "SCHEMA ",
            ObjectType::Database => "DATABASE ",
            ObjectType::Language => "LANGUAGE ",
            ObjectType::Tablespace => "TABLESPACE ",
            ObjectType::Constraint
            | ObjectType::TextSearchParser
            | ObjectType::TextSearchTemplate
            | ObjectType::TextSearchDictionary
            | ObjectType::TextSearchConfiguration => "",
        }
    }

    /// Everything `GRANT ALL` covers for this kind of object
    pub fn all_privileges(self) -> &'static [Privilege] {
        match self {
            ObjectType::Table | ObjectType::ForeignTable | ObjectType::View => TABLE_PRIVILEGES,
            ObjectType::Sequence => SEQUENCE_PRIVILEGES,
            ObjectType::Column => COLUMN_PRIVILEGES,
            ObjectType::Function => &[Privilege::Execute],
            ObjectType::Schema => SCHEMA_PRIVILEGES,
            ObjectType::Database => DATABASE_PRIVILEGES,
            ObjectType::Type | ObjectType::Domain | ObjectType::Language => &[Privilege::Usage],
            ObjectType::Tablespace => &[Privilege::Create],
            ObjectType::Constraint
            | ObjectType::TextSearchParser
            | ObjectType::TextSearchTemplate
            | ObjectType::TextSearchDictionary
            | ObjectType::TextSearchConfiguration => &[],
        }
    }
}

pub fn comment_statement(
    name: &str,
    object_type: ObjectType,
    comment: &str,
    owning_object: Option<&str>,
) -> String {
    if comment.is_empty() {
        return String::new();
    }
    let on_owner = owning_object.map(|owner| format!(" ON {owner}")).unwrap_or_default();
    format!(
        "\n\nCOMMENT ON {} {}{} IS '{}';",
        object_type.keyword(),
        name,
        on_owner,
        escape_single_quotes(comment)
    )
}

pub fn owner_statement(name: &str, object_type: ObjectType, owner: &str) -> String {
    match object_type.owner_keyword() {
        Some(keyword) if !owner.is_empty() => {
            format!("\n\nALTER {keyword} {name} OWNER TO {owner};")
        }
        _ => String::new(),
    }
}

/// Privilege names for one ACL set, or `ALL` when it covers the object's full set
fn grant_list(granted: &[Privilege], all: &[Privilege]) -> Option<String> {
    if granted.is_empty() {
        return None;
    }
    if granted.len() == all.len() {
        return Some("ALL".to_string());
    }
    Some(
        granted
            .iter()
            .map(|p| p.keyword())
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// REVOKE/GRANT block restoring an ACL
///
/// With `column` set the block targets that column of the table `name`.
/// An empty ACL list means default privileges and yields nothing; the
/// `GRANTEE` placeholder yields only the REVOKEs.
pub fn privileges_statements(
    name: &str,
    object_type: ObjectType,
    privileges: &[Acl],
    owner: &str,
    column: Option<&str>,
) -> String {
    let all = object_type.all_privileges();
    if privileges.is_empty() || all.is_empty() {
        return String::new();
    }

    let target = object_type.privilege_target();
    let column_clause = column.map(|c| format!("({c}) ")).unwrap_or_default();

    let mut lines = vec![format!("REVOKE ALL {column_clause}ON {target}{name} FROM PUBLIC;")];
    if !owner.is_empty() {
        lines.push(format!("REVOKE ALL {column_clause}ON {target}{name} FROM {owner};"));
    }

    for acl in privileges {
        let grantee = if acl.grantee.is_empty() { "PUBLIC" } else { acl.grantee.as_str() };
        let plain: Vec<Privilege> = acl.privileges.iter().copied().filter(|p| all.contains(p)).collect();
        let grantable: Vec<Privilege> = acl.grantable.iter().copied().filter(|p| all.contains(p)).collect();

        if let Some(list) = grant_list(&plain, all) {
            lines.push(format!("GRANT {list} {column_clause}ON {target}{name} TO {grantee};"));
        }
        if let Some(list) = grant_list(&grantable, all) {
            lines.push(format!(
                "GRANT {list} {column_clause}ON {target}{name} TO {grantee} WITH GRANT OPTION;"
            ));
        }
    }

    format!("\n\n{}", lines.join("\n"))
}

pub fn security_label_statement(
    name: &str,
    object_type: ObjectType,
    provider: &str,
    label: &str,
) -> String {
    if provider.is_empty() || label.is_empty() {
        return String::new();
    }
    format!(
        "\n\nSECURITY LABEL FOR {} ON {} {} IS '{}';",
        provider,
        object_type.keyword(),
        name,
        escape_single_quotes(label)
    )
}

/// Print the comment, owner, privilege and security label statements of one object
pub fn print_object_metadata(
    writer: &mut MetadataWriter,
    metadata: &ObjectMetadata,
    name: &str,
    object_type: ObjectType,
    owning_object: Option<&str>,
) {
    let statements = [
        comment_statement(name, object_type, &metadata.comment, owning_object),
        owner_statement(name, object_type, &metadata.owner),
        privileges_statements(name, object_type, &metadata.privileges, &metadata.owner, None),
        security_label_statement(
            name,
            object_type,
            &metadata.security_label_provider,
            &metadata.security_label,
        ),
    ];
    for statement in statements.iter().filter(|s| !s.is_empty()) {
        writer.println(statement);
    }
}
