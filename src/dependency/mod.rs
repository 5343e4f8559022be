//! Dependency resolution
//!
//! Orders predata objects so that everything is created after what it
//! references. Dependencies are recorded by the query layer as qualified
//! names; `graph` resolves them through an identity lookup and sorts.

pub mod graph;
pub mod inheritance;
pub mod objects;

pub use graph::{topological_sort, SortCategory, Sortable, Sorted, TypeState};
pub use inheritance::{apply_table_inheritance, InheritanceRow};
pub use objects::{sort_functions_and_types_and_tables, sort_views, PredataObject};
