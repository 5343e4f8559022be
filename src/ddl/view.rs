//! CREATE VIEW statements

use crate::catalog::View;
use crate::metadata::{MetadataMap, ObjectMetadata};

use super::metadata::{print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

/// Print views in the order given; callers pass them already sorted
pub fn print_create_view_statements(writer: &mut MetadataWriter, views: &[View], metadata: &MetadataMap) {
    let empty = ObjectMetadata::default();
    for view in views {
        let start = writer.byte_count();
        let fqn = view.fqn();
        let definition = view.definition.trim_end();
        let terminator = if definition.ends_with(';') { "" } else { ";" };

        writer.println(&format!("\n\nCREATE VIEW {fqn} AS {definition}{terminator}"));
        let view_metadata = metadata.get(&view.oid).unwrap_or(&empty);
        print_object_metadata(writer, view_metadata, &fqn, ObjectType::View, None);
        writer.add_entry(CatalogEntry::new(&view.schema, "", &view.name, "VIEW"), start);
    }
}
