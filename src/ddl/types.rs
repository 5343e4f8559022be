//! CREATE TYPE / CREATE DOMAIN

use crate::catalog::{BaseTypeDefinition, CompositeAttribute, Constraint, DomainDefinition, Type, TypeKind};
use crate::metadata::ObjectMetadata;
use crate::utils::escape_single_quotes;

use super::metadata::{comment_statement, print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

/// Forward declaration that lets functions reference a type before it is defined
pub fn print_create_shell_type_statement(writer: &mut MetadataWriter, type_: &Type) {
    let start = writer.byte_count();
    writer.println(&format!("\n\nCREATE TYPE {};", type_.fqn()));
    writer.add_entry(CatalogEntry::new(&type_.schema, "", &type_.name, "TYPE"), start);
}

/// Full definition of a type plus its metadata block
///
/// `domain_constraints` are the constraints whose owning object is this
/// domain; they are ignored for other kinds.
pub fn print_create_type_statement(
    writer: &mut MetadataWriter,
    type_: &Type,
    metadata: &ObjectMetadata,
    domain_constraints: &[&Constraint],
) {
    let fqn = type_.fqn();
    match &type_.kind {
        TypeKind::Shell => print_create_shell_type_statement(writer, type_),
        TypeKind::Base(base) => {
            let start = writer.byte_count();
            print_base_type(writer, &fqn, base);
            print_object_metadata(writer, metadata, &fqn, ObjectType::Type, None);
            writer.add_entry(CatalogEntry::new(&type_.schema, "", &type_.name, "TYPE"), start);
        }
        TypeKind::Composite(attributes) => {
            let start = writer.byte_count();
            print_composite_type(writer, &fqn, attributes);
            print_object_metadata(writer, metadata, &fqn, ObjectType::Type, None);
            writer.add_entry(CatalogEntry::new(&type_.schema, "", &type_.name, "TYPE"), start);
        }
        TypeKind::Domain(domain) => {
            let start = writer.byte_count();
            print_domain(writer, &fqn, domain, domain_constraints);
            print_object_metadata(writer, metadata, &fqn, ObjectType::Domain, None);
            writer.add_entry(CatalogEntry::new(&type_.schema, "", &type_.name, "DOMAIN"), start);
        }
        TypeKind::Enum(labels) => {
            let start = writer.byte_count();
            let quoted: Vec<String> = labels
                .iter()
                .map(|label| format!("'{}'", escape_single_quotes(label)))
                .collect();
            writer.println(&format!("\n\nCREATE TYPE {} AS ENUM (\n\t{}\n);", fqn, quoted.join(",\n\t")));
            print_object_metadata(writer, metadata, &fqn, ObjectType::Type, None);
            writer.add_entry(CatalogEntry::new(&type_.schema, "", &type_.name, "TYPE"), start);
        }
    }
}

fn alignment_name(alignment: &str) -> Option<&'static str> {
    match alignment {
        "s" => Some("int2"),
        "i" => Some("int4"),
        "d" => Some("double"),
        _ => None,
    }
}

fn storage_name(storage: &str) -> Option<&'static str> {
    match storage {
        "e" => Some("external"),
        "m" => Some("main"),
        "x" => Some("extended"),
        _ => None,
    }
}

fn print_base_type(writer: &mut MetadataWriter, fqn: &str, base: &BaseTypeDefinition) {
    let mut clauses = vec![format!("INPUT = {}", base.input), format!("OUTPUT = {}", base.output)];

    let optional_functions = [
        ("RECEIVE", &base.receive),
        ("SEND", &base.send),
        ("TYPMOD_IN", &base.mod_in),
        ("TYPMOD_OUT", &base.mod_out),
    ];
    for (keyword, function) in optional_functions {
        if !function.is_empty() && function != "-" {
            clauses.push(format!("{keyword} = {function}"));
        }
    }
    if base.internal_length > 0 {
        clauses.push(format!("INTERNALLENGTH = {}", base.internal_length));
    }
    if base.is_passed_by_value {
        clauses.push("PASSEDBYVALUE".to_string());
    }
    if let Some(alignment) = alignment_name(&base.alignment) {
        clauses.push(format!("ALIGNMENT = {alignment}"));
    }
    if let Some(storage) = storage_name(&base.storage) {
        clauses.push(format!("STORAGE = {storage}"));
    }
    if !base.default_val.is_empty() {
        clauses.push(format!("DEFAULT = '{}'", escape_single_quotes(&base.default_val)));
    }
    if !base.element.is_empty() {
        clauses.push(format!("ELEMENT = {}", base.element));
    }
    if !base.delimiter.is_empty() && base.delimiter != "," {
        clauses.push(format!("DELIMITER = '{}'", escape_single_quotes(&base.delimiter)));
    }
    if !base.category.is_empty() && base.category != "U" {
        clauses.push(format!("CATEGORY = '{}'", base.category));
    }
    if base.preferred {
        clauses.push("PREFERRED = true".to_string());
    }
    if base.collatable {
        clauses.push("COLLATABLE = true".to_string());
    }

    writer.println(&format!("\n\nCREATE TYPE {} (\n\t{}\n);", fqn, clauses.join(",\n\t")));
}

fn print_composite_type(writer: &mut MetadataWriter, fqn: &str, attributes: &[CompositeAttribute]) {
    let lines: Vec<String> = attributes
        .iter()
        .map(|attribute| {
            let collation = if attribute.collation.is_empty() {
                String::new()
            } else {
                format!(" COLLATE {}", attribute.collation)
            };
            format!("\t{} {}{}", attribute.name, attribute.type_name, collation)
        })
        .collect();
    writer.println(&format!("\n\nCREATE TYPE {} AS (\n{}\n);", fqn, lines.join(",\n")));

    for attribute in attributes {
        let column = format!("{}.{}", fqn, attribute.name);
        let comment = comment_statement(&column, ObjectType::Column, &attribute.comment, None);
        if !comment.is_empty() {
            writer.println(&comment);
        }
    }
}

fn print_domain(
    writer: &mut MetadataWriter,
    fqn: &str,
    domain: &DomainDefinition,
    constraints: &[&Constraint],
) {
    let mut statement = format!("\n\nCREATE DOMAIN {} AS {}", fqn, domain.base_type);
    if !domain.default_val.is_empty() {
        statement.push_str(&format!(" DEFAULT {}", domain.default_val));
    }
    if !domain.collation.is_empty() {
        statement.push_str(&format!(" COLLATE {}", domain.collation));
    }
    if domain.not_null {
        statement.push_str(" NOT NULL");
    }
    for constraint in constraints {
        statement.push_str(&format!("\n\tCONSTRAINT {} {}", constraint.name, constraint.con_def));
    }
    statement.push(';');
    writer.println(&statement);
}
