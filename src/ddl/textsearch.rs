//! Text search parsers, templates, dictionaries and configurations

use crate::catalog::{TextSearchConfiguration, TextSearchDictionary, TextSearchParser, TextSearchTemplate};
use crate::metadata::{MetadataMap, ObjectMetadata};
use crate::utils::make_fqn;

use super::metadata::{print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

/// Statement, metadata block and TOC entry of one text search object
fn print_text_search_object(
    writer: &mut MetadataWriter,
    statement: &str,
    metadata: &MetadataMap,
    oid: u32,
    schema: &str,
    name: &str,
    object_type: ObjectType,
) {
    let empty = ObjectMetadata::default();
    let start = writer.byte_count();
    writer.print(statement);
    let fqn = make_fqn(schema, name);
    print_object_metadata(writer, metadata.get(&oid).unwrap_or(&empty), &fqn, object_type, None);
    writer.add_entry(CatalogEntry::new(schema, "", name, object_type.keyword()), start);
}

pub fn print_create_text_search_parser_statements(
    writer: &mut MetadataWriter,
    parsers: &[TextSearchParser],
    metadata: &MetadataMap,
) {
    for parser in parsers {
        let fqn = parser.fqn();
        let mut clauses = vec![
            format!("START = {}", parser.start_func),
            format!("GETTOKEN = {}", parser.token_func),
            format!("END = {}", parser.end_func),
            format!("LEXTYPES = {}", parser.lex_types_func),
        ];
        if !parser.headline_func.is_empty() {
            clauses.push(format!("HEADLINE = {}", parser.headline_func));
        }
        let statement = format!("\n\nCREATE TEXT SEARCH PARSER {} (\n\t{}\n);", fqn, clauses.join(",\n\t"));
        print_text_search_object(
            writer,
            &statement,
            metadata,
            parser.oid,
            &parser.schema,
            &parser.name,
            ObjectType::TextSearchParser,
        );
    }
}

pub fn print_create_text_search_template_statements(
    writer: &mut MetadataWriter,
    templates: &[TextSearchTemplate],
    metadata: &MetadataMap,
) {
    for template in templates {
        let fqn = template.fqn();
        let mut clauses = Vec::new();
        if !template.init_func.is_empty() {
            clauses.push(format!("INIT = {}", template.init_func));
        }
        clauses.push(format!("LEXIZE = {}", template.lexize_func));
        let statement = format!("\n\nCREATE TEXT SEARCH TEMPLATE {} (\n\t{}\n);", fqn, clauses.join(",\n\t"));
        print_text_search_object(
            writer,
            &statement,
            metadata,
            template.oid,
            &template.schema,
            &template.name,
            ObjectType::TextSearchTemplate,
        );
    }
}

pub fn print_create_text_search_dictionary_statements(
    writer: &mut MetadataWriter,
    dictionaries: &[TextSearchDictionary],
    metadata: &MetadataMap,
) {
    for dictionary in dictionaries {
        let fqn = dictionary.fqn();
        let mut clauses = vec![format!("TEMPLATE = {}", dictionary.template)];
        if !dictionary.init_option.is_empty() {
            clauses.push(dictionary.init_option.clone());
        }
        let statement = format!("\n\nCREATE TEXT SEARCH DICTIONARY {} (\n\t{}\n);", fqn, clauses.join(",\n\t"));
        print_text_search_object(
            writer,
            &statement,
            metadata,
            dictionary.oid,
            &dictionary.schema,
            &dictionary.name,
            ObjectType::TextSearchDictionary,
        );
    }
}

pub fn print_create_text_search_configuration_statements(
    writer: &mut MetadataWriter,
    configurations: &[TextSearchConfiguration],
    metadata: &MetadataMap,
) {
    for configuration in configurations {
        let fqn = configuration.fqn();
        let mut statement = format!(
            "\n\nCREATE TEXT SEARCH CONFIGURATION {} (\n\tPARSER = {}\n);",
            fqn, configuration.parser
        );
        for (token, dictionaries) in &configuration.token_to_dicts {
            statement.push_str(&format!(
                "\n\nALTER TEXT SEARCH CONFIGURATION {}\n\tADD MAPPING FOR \"{}\" WITH {};",
                fqn,
                token,
                dictionaries.join(", ")
            ));
        }
        print_text_search_object(
            writer,
            &statement,
            metadata,
            configuration.oid,
            &configuration.schema,
            &configuration.name,
            ObjectType::TextSearchConfiguration,
        );
    }
}
