use crate::catalog::Constraint;
use crate::metadata::{MetadataMap, ObjectMetadata};

use super::metadata::{print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

fn alter_keyword(constraint: &Constraint) -> &'static str {
    if constraint.is_domain_constraint {
        "DOMAIN"
    } else if constraint.is_partition_parent {
        // ONLY would leave the partitions without the constraint
        "TABLE"
    } else {
        "TABLE ONLY"
    }
}

/// Print constraints, foreign keys last so the keys they reference exist
pub fn print_constraint_statements(
    writer: &mut MetadataWriter,
    constraints: &[Constraint],
    metadata: &MetadataMap,
) {
    let empty = ObjectMetadata::default();
    let (foreign_keys, others): (Vec<&Constraint>, Vec<&Constraint>) =
        constraints.iter().partition(|c| c.is_foreign_key());

    for constraint in others.into_iter().chain(foreign_keys) {
        let start = writer.byte_count();
        writer.println(&format!(
            "\n\nALTER {} {} ADD CONSTRAINT {} {};",
            alter_keyword(constraint),
            constraint.owning_object,
            constraint.name,
            constraint.con_def
        ));
        let constraint_metadata = metadata.get(&constraint.oid).unwrap_or(&empty);
        print_object_metadata(
            writer,
            constraint_metadata,
            &constraint.name,
            ObjectType::Constraint,
            Some(&constraint.owning_object),
        );
        writer.add_entry(
            CatalogEntry::new(&constraint.schema, &constraint.owning_object, &constraint.name, "CONSTRAINT"),
            start,
        );
    }
}
