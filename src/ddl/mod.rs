//! DDL rendering: catalog objects to predata statements
//!
//! Every renderer appends to a [`MetadataWriter`] and registers one
//! [`CatalogEntry`] per object, covering the create statement and the
//! metadata block that follows it:
//! - **Tables**: regular, external and foreign, with column attributes
//! - **Sequences**: definition, current value and `OWNED BY`
//! - **Types and functions**: in dependency order, shells first where needed
//! - **Views, constraints, text search objects**
//!
//! ## Whitespace
//!
//! Statements are separated by blank lines exactly as the restore side
//! expects; entries trim the surrounding whitespace of their span.

pub mod constraint;
pub mod dependent;
pub mod function;
pub mod metadata;
pub mod sequence;
pub mod table;
pub mod textsearch;
pub mod toc;
pub mod types;
pub mod view;

pub use constraint::print_constraint_statements;
pub use dependent::{print_dependent_objects, DependentMetadata};
pub use function::print_create_function_statement;
pub use metadata::{print_object_metadata, ObjectType};
pub use sequence::{print_alter_sequence_statements, print_create_sequence_statements};
pub use table::print_create_table_statement;
pub use textsearch::{
    print_create_text_search_configuration_statements, print_create_text_search_dictionary_statements,
    print_create_text_search_parser_statements, print_create_text_search_template_statements,
};
pub use toc::{CatalogEntry, EmittedStatement, MetadataWriter};
pub use types::{print_create_shell_type_statement, print_create_type_statement};
pub use view::print_create_view_statements;
