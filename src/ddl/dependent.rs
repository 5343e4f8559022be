//! Rendering of the sorted function/type/table sequence

use std::collections::HashMap;

use crate::catalog::{Constraint, TableDefinition};
use crate::dependency::{PredataObject, Sorted};
use crate::error::{BackupError, BackupResult};
use crate::{internal_error, require};
use crate::metadata::{MetadataMap, ObjectMetadata};

use super::function::print_create_function_statement;
use super::table::print_create_table_statement;
use super::toc::MetadataWriter;
use super::types::{print_create_shell_type_statement, print_create_type_statement};

/// Metadata maps for the three kinds of object in the mixed sort
#[derive(Debug, Clone, Copy)]
pub struct DependentMetadata<'a> {
    pub functions: &'a MetadataMap,
    pub types: &'a MetadataMap,
    pub relations: &'a MetadataMap,
}

/// Print functions, types and tables in sorted order
///
/// Domain constraints are rendered inline with their domain and are looked
/// up by owning object.
pub fn print_dependent_objects(
    writer: &mut MetadataWriter,
    sorted: &[Sorted<PredataObject>],
    metadata: DependentMetadata<'_>,
    table_defs: &HashMap<u32, TableDefinition>,
    domain_constraints: &[Constraint],
) -> BackupResult<()> {
    let empty = ObjectMetadata::default();

    for step in sorted {
        match step {
            Sorted::Shell(PredataObject::Type(type_)) => {
                print_create_shell_type_statement(writer, type_);
            }
            Sorted::Shell(other) => {
                return Err(internal_error!("Only types can be shelled, got {:?}", other));
            }
            Sorted::Definition(PredataObject::Function(function)) => {
                let function_metadata = metadata.functions.get(&function.oid).unwrap_or(&empty);
                print_create_function_statement(writer, function, function_metadata);
            }
            Sorted::Definition(PredataObject::Type(type_)) => {
                let fqn = type_.fqn();
                let constraints: Vec<&Constraint> = domain_constraints
                    .iter()
                    .filter(|c| c.is_domain_constraint && c.owning_object == fqn)
                    .collect();
                let type_metadata = metadata.types.get(&type_.oid).unwrap_or(&empty);
                print_create_type_statement(writer, type_, type_metadata, &constraints);
            }
            Sorted::Definition(PredataObject::Table(relation)) => {
                let definition = require!(
                    table_defs.get(&relation.oid),
                    BackupError::MissingTableDefinition {
                        relation: relation.fqn(),
                    }
                );
                let relation_metadata = metadata.relations.get(&relation.oid).unwrap_or(&empty);
                print_create_table_statement(writer, relation, definition, relation_metadata);
            }
        }
    }
    Ok(())
}
