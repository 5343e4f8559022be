use crate::catalog::{DataAccess, Function, Volatility};
use crate::metadata::ObjectMetadata;

use super::metadata::{print_object_metadata, ObjectType};
use super::toc::{CatalogEntry, MetadataWriter};

/// Dollar-quote marker that does not occur in `body`: `$$`, then `$_$`, `$__$`, ...
fn dollar_quote_marker(body: &str) -> String {
    let mut marker = "$$".to_string();
    let mut underscores = 0;
    while body.contains(&marker) {
        underscores += 1;
        marker = format!("${}$", "_".repeat(underscores));
    }
    marker
}

fn default_cost(language: &str) -> f32 {
    if language == "c" || language == "internal" {
        1.0
    } else {
        100.0
    }
}

fn print_function_body_or_path(writer: &mut MetadataWriter, function: &Function) {
    if function.binary_path.is_empty() {
        let marker = dollar_quote_marker(&function.function_body);
        writer.print(&format!("\n{marker}{}{marker}\n", function.function_body));
    } else {
        writer.print(&format!("\n'{}', '{}'\n", function.binary_path, function.function_body));
    }
}

fn print_function_modifiers(writer: &mut MetadataWriter, function: &Function) {
    match function.data_access {
        Some(DataAccess::ContainsSql) | None => {}
        Some(access) => writer.print(&format!(" {}", access.keyword())),
    }
    match function.volatility {
        Volatility::Immutable => writer.print(" IMMUTABLE"),
        Volatility::Stable => writer.print(" STABLE"),
        Volatility::Volatile => {}
    }
    if function.is_strict {
        writer.print(" STRICT");
    }
    if function.is_security_definer {
        writer.print(" SECURITY DEFINER");
    }
    if (function.cost - default_cost(&function.language)).abs() > f32::EPSILON {
        writer.print(&format!("\nCOST {}", function.cost));
    }
    if function.returns_set && function.num_rows > 0.0 && (function.num_rows - 1000.0).abs() > f32::EPSILON {
        writer.print(&format!("\nROWS {}", function.num_rows));
    }
    if !function.config.is_empty() {
        writer.print(&format!("\n{}", function.config));
    }
}

pub fn print_create_function_statement(
    writer: &mut MetadataWriter,
    function: &Function,
    metadata: &ObjectMetadata,
) {
    let start = writer.byte_count();
    writer.print(&format!(
        "\n\nCREATE FUNCTION {}({}) RETURNS {} AS",
        function.fqn(),
        function.arguments,
        function.result_type
    ));
    print_function_body_or_path(writer, function);
    writer.print(&format!("LANGUAGE {}", function.language));
    print_function_modifiers(writer, function);
    writer.println(";");

    print_object_metadata(writer, metadata, &function.fqn_with_args(), ObjectType::Function, None);
    let name = format!("{}({})", function.name, function.ident_args);
    writer.add_entry(CatalogEntry::new(&function.schema, "", &name, "FUNCTION"), start);
}
