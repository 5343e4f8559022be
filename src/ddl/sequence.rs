//! CREATE SEQUENCE, setval and OWNED BY

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::catalog::{Relation, Sequence, SequenceDefinition};
use crate::metadata::{MetadataMap, ObjectMetadata};
use crate::utils::{escape_single_quotes, split_owning_column};

use super::metadata::{print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

/// MAXVALUE/MINVALUE lines; the engine defaults depend on the direction
fn bound_clauses(definition: &SequenceDefinition) -> (String, String) {
    let (default_max, default_min) = if definition.increment < 0 {
        (-1, i64::MIN)
    } else {
        (i64::MAX, 1)
    };

    let max = if definition.max_val == default_max {
        "NO MAXVALUE".to_string()
    } else {
        format!("MAXVALUE {}", definition.max_val)
    };
    let min = if definition.min_val == default_min {
        "NO MINVALUE".to_string()
    } else {
        format!("MINVALUE {}", definition.min_val)
    };
    (max, min)
}

pub fn print_create_sequence_statements(
    writer: &mut MetadataWriter,
    sequences: &[Sequence],
    metadata: &MetadataMap,
) {
    let empty = ObjectMetadata::default();
    for sequence in sequences {
        let start = writer.byte_count();
        let fqn = sequence.fqn();
        let definition = &sequence.definition;

        writer.print(&format!("\n\nCREATE SEQUENCE {fqn}\n"));
        if !definition.is_called {
            writer.print(&format!("\tSTART WITH {}\n", definition.last_val));
        }
        let (max, min) = bound_clauses(definition);
        writer.print(&format!(
            "\tINCREMENT BY {}\n\t{}\n\t{}\n\tCACHE {}",
            definition.increment, max, min, definition.cache_val
        ));
        if definition.is_cycled {
            writer.print("\n\tCYCLE");
        }
        writer.println(";");
        writer.println(&format!(
            "\nSELECT pg_catalog.setval('{}', {}, {});",
            escape_single_quotes(&fqn),
            definition.last_val,
            definition.is_called
        ));

        let sequence_metadata = metadata.get(&sequence.relation.oid).unwrap_or(&empty);
        print_object_metadata(writer, sequence_metadata, &fqn, ObjectType::Sequence, None);
        writer.add_entry(
            CatalogEntry::new(&sequence.relation.schema, "", &sequence.relation.name, "SEQUENCE"),
            start,
        );
    }
}

/// Attach sequences to the columns that own them
///
/// `owner_columns` maps a sequence's qualified name to `schema.table.column`.
/// Nothing is emitted when the owning table is not part of the backup, since
/// the statement would fail on restore.
pub fn print_alter_sequence_statements(
    writer: &mut MetadataWriter,
    sequences: &[Sequence],
    owner_columns: &HashMap<String, String>,
    tables: &[Relation],
) {
    let backed_up: HashSet<String> = tables.iter().map(Relation::fqn).collect();

    for sequence in sequences {
        let fqn = sequence.fqn();
        let Some(owning_column) = owner_columns.get(&fqn) else {
            continue;
        };
        let Some((table, _column)) = split_owning_column(owning_column) else {
            debug!("Skipping OWNED BY for {}: malformed owner column {}", fqn, owning_column);
            continue;
        };
        if !backed_up.contains(table) {
            debug!("Skipping OWNED BY for {}: table {} is not in the backup", fqn, table);
            continue;
        }

        let start = writer.byte_count();
        writer.println(&format!("\n\nALTER SEQUENCE {fqn} OWNED BY {owning_column};"));
        writer.add_entry(
            CatalogEntry::new(&sequence.relation.schema, "", &sequence.relation.name, "SEQUENCE OWNER"),
            start,
        );
    }
}
