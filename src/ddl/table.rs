//! CREATE TABLE for regular, external and foreign tables

use crate::catalog::{
    ColumnDefinition, ExternalTableDefinition, Relation, ReplicaIdentity, TableDefinition,
};
use crate::metadata::ObjectMetadata;
use crate::utils::escape_single_quotes;

use super::metadata::{
    comment_statement, print_object_metadata, privileges_statements, security_label_statement,
    ObjectType,
};
use super::toc::{CatalogEntry, MetadataWriter};

/// Print the create statement of one table plus everything that hangs off it
pub fn print_create_table_statement(
    writer: &mut MetadataWriter,
    relation: &Relation,
    definition: &TableDefinition,
    metadata: &ObjectMetadata,
) {
    let start = writer.byte_count();
    if definition.is_external {
        print_external_table_create_statement(writer, relation, definition);
    } else if definition.foreign_def.is_some() {
        print_foreign_table_create_statement(writer, relation, definition);
    } else {
        print_regular_table_create_statement(writer, relation, definition);
    }
    print_post_create_table_statements(writer, relation, definition, metadata);
    writer.add_entry(CatalogEntry::new(&relation.schema, "", &relation.name, "TABLE"), start);
}

fn sorted_columns(columns: &[ColumnDefinition]) -> Vec<&ColumnDefinition> {
    let mut sorted: Vec<&ColumnDefinition> = columns.iter().collect();
    sorted.sort_by_key(|c| c.num);
    sorted
}

fn column_line(column: &ColumnDefinition, is_typed: bool) -> String {
    if is_typed {
        let not_null = if column.not_null { " NOT NULL" } else { "" };
        return format!("\t{} WITH OPTIONS{}", column.name, not_null);
    }

    let mut line = format!("\t{} {}", column.name, column.type_name);
    if !column.fdw_options.is_empty() {
        line.push_str(&format!(" OPTIONS ({})", column.fdw_options));
    }
    if !column.collation.is_empty() {
        line.push_str(&format!(" COLLATE {}", column.collation));
    }
    if column.has_default {
        line.push_str(&format!(" DEFAULT {}", column.default_val));
    }
    if column.not_null {
        line.push_str(" NOT NULL");
    }
    if !column.encoding.is_empty() {
        line.push_str(&format!(" ENCODING ({})", column.encoding));
    }
    line
}

/// Column block between the parentheses, one tab-indented line per column
fn print_column_definitions(writer: &mut MetadataWriter, columns: &[ColumnDefinition], is_typed: bool) {
    let lines: Vec<String> = sorted_columns(columns)
        .into_iter()
        .map(|column| column_line(column, is_typed))
        .collect();
    if !lines.is_empty() {
        writer.println(&lines.join(",\n"));
    }
}

fn print_regular_table_create_statement(
    writer: &mut MetadataWriter,
    relation: &Relation,
    definition: &TableDefinition,
) {
    let unlogged = if definition.is_unlogged { "UNLOGGED " } else { "" };
    let typed = if definition.is_typed() {
        format!("OF {} ", definition.table_type)
    } else {
        String::new()
    };
    writer.print(&format!("\n\nCREATE {}TABLE {} {}(\n", unlogged, relation.fqn(), typed));
    print_column_definitions(writer, &definition.column_defs, definition.is_typed());
    writer.print(") ");

    if !relation.inherits.is_empty() {
        writer.print(&format!("INHERITS ({}) ", relation.inherits.join(", ")));
    }
    if !definition.storage_opts.is_empty() {
        writer.print(&format!("WITH ({}) ", definition.storage_opts));
    }
    if !definition.tablespace.is_empty() {
        writer.print(&format!("TABLESPACE {} ", definition.tablespace));
    }
    writer.print(&definition.dist_policy);
    if !definition.part_def.is_empty() {
        writer.print(&format!(" {}", definition.part_def.trim()));
    }
    writer.println(";");
    if !definition.part_template_def.is_empty() {
        writer.println(&format!("{};", definition.part_template_def.trim()));
    }

    print_alter_column_statements(writer, relation, &definition.column_defs);

    let identity = match definition.replica_identity {
        ReplicaIdentity::Full => Some("FULL"),
        ReplicaIdentity::Nothing => Some("NOTHING"),
        ReplicaIdentity::Default | ReplicaIdentity::Index => None,
    };
    if let Some(identity) = identity {
        writer.println(&format!("\n\nALTER TABLE {} REPLICA IDENTITY {};", relation.fqn(), identity));
    }
}

/// Column attributes that CREATE TABLE cannot carry
fn print_alter_column_statements(writer: &mut MetadataWriter, relation: &Relation, columns: &[ColumnDefinition]) {
    let fqn = relation.fqn();
    for column in sorted_columns(columns) {
        if column.stat_target >= 0 {
            writer.println(&format!(
                "\nALTER TABLE ONLY {} ALTER COLUMN {} SET STATISTICS {};",
                fqn, column.name, column.stat_target
            ));
        }
        if !column.storage_type.is_empty() {
            writer.println(&format!(
                "\nALTER TABLE ONLY {} ALTER COLUMN {} SET STORAGE {};",
                fqn, column.name, column.storage_type
            ));
        }
        if !column.options.is_empty() {
            writer.println(&format!(
                "\nALTER TABLE ONLY {} ALTER COLUMN {} SET ({});",
                fqn, column.name, column.options
            ));
        }
    }
}

/// `ON ...` clause of an EXECUTE web table, empty for all segments
fn exec_location_clause(exec_location: &str) -> String {
    let (kind, value) = exec_location.split_once(':').unwrap_or((exec_location, ""));
    match kind {
        "HOST" => format!(" ON HOST '{value}'"),
        "MASTER_ONLY" => " ON MASTER".to_string(),
        "PER_HOST" => " ON HOST".to_string(),
        "SEGMENT_ID" => format!(" ON SEGMENT {value}"),
        "TOTAL_SEGS" => format!(" ON {value}"),
        _ => String::new(),
    }
}

fn print_external_table_create_statement(
    writer: &mut MetadataWriter,
    relation: &Relation,
    definition: &TableDefinition,
) {
    let empty = ExternalTableDefinition::default();
    let external = definition.ext_table_def.as_ref().unwrap_or(&empty);
    let kind = external.kind();

    writer.print(&format!("\n\nCREATE {} TABLE {} (\n", kind.keyword(), relation.fqn()));
    print_column_definitions(writer, &definition.column_defs, false);
    writer.print(") ");

    if !external.command.is_empty() {
        writer.print(&format!(
            "EXECUTE '{}'{}",
            escape_single_quotes(&external.command),
            exec_location_clause(&external.exec_location)
        ));
    } else if !external.uris.is_empty() {
        writer.print(&format!("LOCATION (\n\t'{}'\n)", external.uris.join("',\n\t'")));
        if !kind.is_writable() && external.exec_location == "MASTER_ONLY" {
            writer.print(" ON MASTER");
        }
    }
    writer.println("");

    writer.print(&format!("FORMAT '{}'", external.format_name()));
    if !external.format_opts.is_empty() {
        writer.print(&format!(" ({})", external.format_opts.trim()));
    }
    if !external.options.is_empty() {
        writer.print(&format!("\nOPTIONS (\n\t{}\n)", external.options));
    }
    if !external.encoding.is_empty() {
        writer.print(&format!("\nENCODING '{}'", external.encoding));
    }

    if !kind.is_writable() {
        if external.log_errors {
            if external.err_table_name.is_empty() {
                writer.print("\nLOG ERRORS");
            } else {
                writer.print(&format!(
                    "\nLOG ERRORS INTO {}.{}",
                    external.err_table_schema, external.err_table_name
                ));
            }
        }
        if external.reject_limit != 0 {
            let unit = if external.reject_limit_type == "p" { "PERCENT" } else { "ROWS" };
            writer.print(&format!("\nSEGMENT REJECT LIMIT {} {}", external.reject_limit, unit));
        }
    } else if !definition.dist_policy.is_empty() {
        writer.print(&format!("\n{}", definition.dist_policy));
    }
    writer.println(";");
}

fn print_foreign_table_create_statement(
    writer: &mut MetadataWriter,
    relation: &Relation,
    definition: &TableDefinition,
) {
    writer.print(&format!("\n\nCREATE FOREIGN TABLE {} (\n", relation.fqn()));
    print_column_definitions(writer, &definition.column_defs, false);
    writer.print(")");
    if let Some(foreign) = &definition.foreign_def {
        writer.print(&format!(" SERVER {}", foreign.server));
        if !foreign.options.is_empty() {
            writer.print(&format!(" OPTIONS ({})", foreign.options));
        }
    }
    writer.println(";");
}

/// Table metadata block followed by per-column comments, privileges and labels
pub fn print_post_create_table_statements(
    writer: &mut MetadataWriter,
    relation: &Relation,
    definition: &TableDefinition,
    metadata: &ObjectMetadata,
) {
    let fqn = relation.fqn();
    let object_type = if definition.foreign_def.is_some() && !definition.is_external {
        ObjectType::ForeignTable
    } else {
        ObjectType::Table
    };
    print_object_metadata(writer, metadata, &fqn, object_type, None);

    for column in sorted_columns(&definition.column_defs) {
        let column_fqn = format!("{}.{}", fqn, column.name);
        let statements = [
            comment_statement(&column_fqn, ObjectType::Column, &column.comment, None),
            privileges_statements(&fqn, ObjectType::Column, &column.acl, &metadata.owner, Some(&column.name)),
            security_label_statement(
                &column_fqn,
                ObjectType::Column,
                &column.security_label_provider,
                &column.security_label,
            ),
        ];
        for statement in statements.iter().filter(|s| !s.is_empty()) {
            writer.println(statement);
        }
    }
}
