use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{Relation, TableDefinition};

/// One `pg_inherits` edge as returned by the query layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InheritanceRow {
    pub child_oid: u32,
    /// Qualified name of the parent table
    pub parent_fqn: String,
}

/// Record inheritance parents on child relations
///
/// Each parent becomes both an `INHERITS` entry and a dependency, in row
/// order. External leaf partitions are skipped: they are created as
/// stand-alone tables and exchanged in later. Parents outside the backup set
/// are still recorded; the sort ignores them.
pub fn apply_table_inheritance(
    relations: &mut [Relation],
    rows: &[InheritanceRow],
    definitions: &HashMap<u32, TableDefinition>,
) {
    let mut parents_by_child: HashMap<u32, Vec<&str>> = HashMap::new();
    for row in rows {
        parents_by_child
            .entry(row.child_oid)
            .or_default()
            .push(row.parent_fqn.as_str());
    }

    for relation in relations.iter_mut() {
        let Some(parents) = parents_by_child.get(&relation.oid) else {
            continue;
        };
        if definitions.get(&relation.oid).is_some_and(TableDefinition::is_external_leaf) {
            debug!("Not recording inheritance for external partition {}", relation.fqn());
            continue;
        }

        for parent in parents {
            if !relation.inherits.iter().any(|p| p == parent) {
                relation.inherits.push((*parent).to_string());
            }
            if !relation.depends_upon.iter().any(|d| d == parent) {
                relation.depends_upon.push((*parent).to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PartitionType;

    fn row(child_oid: u32, parent: &str) -> InheritanceRow {
        InheritanceRow {
            child_oid,
            parent_fqn: parent.to_string(),
        }
    }

    #[test]
    fn test_multiple_parents_in_row_order() {
        let mut relations = vec![Relation::new(1, 10, "public", "child")];
        let rows = vec![row(10, "public.parent_b"), row(10, "public.parent_a")];

        apply_table_inheritance(&mut relations, &rows, &HashMap::new());

        assert_eq!(relations[0].inherits, vec!["public.parent_b", "public.parent_a"]);
        assert_eq!(relations[0].depends_upon, vec!["public.parent_b", "public.parent_a"]);
    }

    #[test]
    fn test_existing_dependency_not_duplicated() {
        let mut relation = Relation::new(1, 10, "public", "child");
        relation.depends_upon.push("public.parent".to_string());
        let mut relations = vec![relation];

        apply_table_inheritance(&mut relations, &[row(10, "public.parent")], &HashMap::new());

        assert_eq!(relations[0].depends_upon, vec!["public.parent"]);
        assert_eq!(relations[0].inherits, vec!["public.parent"]);
    }

    #[test]
    fn test_external_leaf_skipped() {
        let mut relations = vec![Relation::new(1, 10, "public", "ext_leaf")];
        let definitions = HashMap::from([(
            10,
            TableDefinition {
                is_external: true,
                partition_type: PartitionType::Leaf,
                ..Default::default()
            },
        )]);

        apply_table_inheritance(&mut relations, &[row(10, "public.parent")], &definitions);

        assert!(relations[0].inherits.is_empty());
        assert!(relations[0].depends_upon.is_empty());
    }

    #[test]
    fn test_parent_outside_backup_set_still_recorded() {
        let mut relations = vec![Relation::new(1, 10, "public", "child")];

        apply_table_inheritance(&mut relations, &[row(10, "other.not_backed_up")], &HashMap::new());

        assert_eq!(relations[0].inherits, vec!["other.not_backed_up"]);
    }
}
