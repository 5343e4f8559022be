//! Partition classification
//!
//! Splits the relations of a backup into the set that needs DDL (the
//! metadata set) and the set whose rows are captured (the data set).
//!
//! One `CREATE TABLE` on a partition root carries the partition clause for
//! the whole hierarchy, so leaves and intermediate partitions never get DDL
//! of their own. External leaves are the exception: they are exchanged into
//! the hierarchy after the fact, so each gets a stand-alone table named
//! `<leaf>_ext_part_`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::catalog::{PartitionType, Relation, TableDefinition};
use crate::config::{EXT_PART_SUFFIX, MAX_IDENTIFIER_LENGTH};
use crate::error::{BackupError, BackupResult};
use crate::utils::{make_fqn, split_qualified_name};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRelations {
    /// Relations that get DDL, external leaves already renamed
    pub metadata: Vec<Relation>,
    /// Relations whose data is captured, original names
    pub data: Vec<Relation>,
}

/// Split relations into the metadata set and the data set
///
/// Both sets keep the input order. A relation with no definition is treated
/// as an ordinary table.
pub fn classify_relations(
    relations: &[Relation],
    definitions: &HashMap<u32, TableDefinition>,
    include_list: &[String],
    leaf_partition_data: bool,
) -> BackupResult<ClassifiedRelations> {
    let included: HashSet<&str> = include_list.iter().map(String::as_str).collect();
    let filtered = !included.is_empty();

    // A listed leaf or intermediate partition pulls in the root that owns its DDL
    let mut reachable: HashSet<String> = included.iter().map(|s| (*s).to_string()).collect();
    for relation in relations {
        if !included.contains(relation.fqn().as_str()) {
            continue;
        }
        if let Some(root) = definitions.get(&relation.oid).and_then(|d| d.partition_root.as_ref()) {
            reachable.insert(make_fqn(&relation.schema, root));
        }
    }

    let mut classified = ClassifiedRelations::default();

    for relation in relations {
        let definition = definitions.get(&relation.oid);
        let partition_type = definition.map_or(PartitionType::None, |d| d.partition_type);
        let is_external = definition.is_some_and(|d| d.is_external);
        let is_foreign = definition.is_some_and(|d| d.foreign_def.is_some());
        let fqn = relation.fqn();

        match partition_type {
            PartitionType::None | PartitionType::Parent => {
                if !filtered || reachable.contains(&fqn) {
                    classified.metadata.push(relation.clone());
                }
            }
            PartitionType::Leaf if is_external => {
                let root_listed = definition
                    .and_then(|d| d.partition_root.as_ref())
                    .is_some_and(|root| included.contains(make_fqn(&relation.schema, root).as_str()));
                if !filtered || included.contains(fqn.as_str()) || root_listed {
                    let mut renamed = relation.clone();
                    renamed.name = append_ext_part_suffix(&relation.name)?;
                    debug!("External partition {} backed up as {}", fqn, renamed.fqn());
                    classified.metadata.push(renamed);
                }
            }
            PartitionType::Leaf | PartitionType::Intermediate => {}
        }

        // External and foreign tables hold no rows of their own
        if is_external || is_foreign {
            continue;
        }

        let in_data_set = if leaf_partition_data {
            matches!(partition_type, PartitionType::Leaf | PartitionType::None)
        } else if filtered {
            included.contains(fqn.as_str())
        } else {
            matches!(partition_type, PartitionType::None | PartitionType::Parent)
        };
        if in_data_set {
            classified.data.push(relation.clone());
        }
    }

    info!(
        "Classified {} relations: {} need metadata, {} need data",
        relations.len(),
        classified.metadata.len(),
        classified.data.len()
    );
    Ok(classified)
}

/// Append `_ext_part_` to an external partition's unqualified name
pub fn append_ext_part_suffix(name: &str) -> BackupResult<String> {
    append_suffix(name, EXT_PART_SUFFIX, MAX_IDENTIFIER_LENGTH)
}

/// Append `suffix` to an identifier, truncating it first so the result is at
/// most `max_len` bytes including any surrounding double quotes.
///
/// Truncation stays inside the quotes, on a char boundary, and never leaves
/// half of an escaped `""` pair.
pub fn append_suffix(name: &str, suffix: &str, max_len: usize) -> BackupResult<String> {
    if name.is_empty() {
        return Err(BackupError::InvalidIdentifier {
            identifier: name.to_string(),
            reason: "cannot append a suffix to an empty name".to_string(),
        });
    }

    let quoted = name.len() >= 2 && name.starts_with('"') && name.ends_with('"');
    let (core, overhead) = if quoted { (&name[1..name.len() - 1], 2) } else { (name, 0) };

    if suffix.len() + overhead >= max_len {
        return Err(BackupError::ConfigError {
            setting: "identifier suffix".to_string(),
            value: suffix.to_string(),
            reason: format!("leaves no room for a name within {max_len} bytes"),
        });
    }
    let budget = max_len - overhead - suffix.len();

    let mut cut = core.len().min(budget);
    while !core.is_char_boundary(cut) {
        cut -= 1;
    }
    let mut truncated = &core[..cut];
    if quoted && cut < core.len() {
        let trailing_quotes = truncated.bytes().rev().take_while(|b| *b == b'"').count();
        if trailing_quotes % 2 == 1 {
            truncated = &truncated[..truncated.len() - 1];
        }
    }

    if truncated.is_empty() {
        return Err(BackupError::InvalidIdentifier {
            identifier: name.to_string(),
            reason: format!("nothing left of the name after making room for '{suffix}'"),
        });
    }

    Ok(if quoted {
        format!("\"{truncated}{suffix}\"")
    } else {
        format!("{truncated}{suffix}")
    })
}

fn is_partition_member(definition: Option<&TableDefinition>) -> bool {
    definition.is_some_and(|d| {
        matches!(d.partition_type, PartitionType::Leaf | PartitionType::Intermediate)
    })
}

/// Narrow relations to what an include list reaches
///
/// Keeps the listed relations, the partitions below a listed relation (by
/// partition root or inheritance parent) and the ancestors of a listed
/// partition. Ordinary inheritance children of a listed table are not
/// pulled in. An empty include list keeps everything.
///
/// Call after [`crate::dependency::apply_table_inheritance`] so partition
/// parents are known.
pub fn resolve_include_relations(
    include_list: &[String],
    relations: &[Relation],
    definitions: &HashMap<u32, TableDefinition>,
) -> Vec<Relation> {
    if include_list.is_empty() {
        return relations.to_vec();
    }

    let listed: HashSet<&str> = include_list.iter().map(String::as_str).collect();
    let partition_root = |relation: &Relation| {
        definitions
            .get(&relation.oid)
            .and_then(|d| d.partition_root.as_ref())
            .map(|root| make_fqn(&relation.schema, root))
    };

    // Walk down from the listed relations
    let mut below: HashSet<String> = listed.iter().map(|s| (*s).to_string()).collect();
    loop {
        let mut grew = false;
        for relation in relations {
            if !is_partition_member(definitions.get(&relation.oid)) {
                continue;
            }
            let fqn = relation.fqn();
            if below.contains(&fqn) {
                continue;
            }
            let under_root = partition_root(relation).is_some_and(|root| listed.contains(root.as_str()));
            if under_root || relation.inherits.iter().any(|parent| below.contains(parent)) {
                below.insert(fqn);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    // Walk up from the listed partitions
    let by_fqn: HashMap<String, &Relation> = relations.iter().map(|r| (r.fqn(), r)).collect();
    let mut above: HashSet<String> = HashSet::new();
    let mut pending: Vec<&Relation> = relations
        .iter()
        .filter(|r| listed.contains(r.fqn().as_str()))
        .collect();
    while let Some(relation) = pending.pop() {
        if !is_partition_member(definitions.get(&relation.oid)) {
            continue;
        }
        for ancestor in partition_root(relation).into_iter().chain(relation.inherits.iter().cloned()) {
            if above.insert(ancestor.clone()) {
                if let Some(parent) = by_fqn.get(&ancestor) {
                    pending.push(*parent);
                }
            }
        }
    }

    let resolved: Vec<Relation> = relations
        .iter()
        .filter(|r| {
            let fqn = r.fqn();
            below.contains(&fqn) || above.contains(&fqn)
        })
        .cloned()
        .collect();
    debug!(
        "Include list of {} entries resolved to {} relations",
        include_list.len(),
        resolved.len()
    );
    resolved
}

/// Add the known relations that share a schema with the include list
///
/// An empty include list means "no filter" and stays empty. Known relations
/// must already be narrowed by [`resolve_include_relations`], otherwise every
/// table of an included schema is pulled in.
pub fn expand_include_relations(include_list: &[String], known_relations: &[Relation]) -> Vec<String> {
    if include_list.is_empty() {
        return Vec::new();
    }

    let schemas: HashSet<&str> = include_list
        .iter()
        .filter_map(|entry| split_qualified_name(entry).map(|(schema, _)| schema))
        .collect();
    let mut listed: HashSet<String> = include_list.iter().cloned().collect();
    let mut expanded = include_list.to_vec();

    for relation in known_relations {
        if !schemas.contains(relation.schema.as_str()) {
            continue;
        }
        let fqn = relation.fqn();
        if listed.insert(fqn.clone()) {
            debug!("Include list expanded with {}", fqn);
            expanded.push(fqn);
        }
    }

    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn relation(oid: u32, name: &str) -> Relation {
        Relation::new(2200, oid, "public", name)
    }

    fn definition(partition_type: PartitionType, root: Option<&str>) -> TableDefinition {
        TableDefinition {
            partition_type,
            partition_root: root.map(str::to_string),
            ..Default::default()
        }
    }

    /// parent `sales` with intermediate `sales_1`, leaves `sales_1_a` and
    /// external `sales_1_ext`, plus ordinary table `plain`
    fn hierarchy() -> (Vec<Relation>, HashMap<u32, TableDefinition>) {
        let mut relations = vec![
            relation(1, "sales"),
            relation(2, "sales_1"),
            relation(3, "sales_1_a"),
            relation(4, "sales_1_ext"),
            relation(5, "plain"),
        ];
        relations[1].inherits = vec!["public.sales".to_string()];
        relations[2].inherits = vec!["public.sales_1".to_string()];
        let mut external = definition(PartitionType::Leaf, Some("sales"));
        external.is_external = true;
        let definitions = HashMap::from([
            (1, definition(PartitionType::Parent, None)),
            (2, definition(PartitionType::Intermediate, Some("sales"))),
            (3, definition(PartitionType::Leaf, Some("sales"))),
            (4, external),
            (5, definition(PartitionType::None, None)),
        ]);
        (relations, definitions)
    }

    fn names(relations: &[Relation]) -> Vec<&str> {
        relations.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_classify_without_filters() {
        let (relations, definitions) = hierarchy();

        let classified = classify_relations(&relations, &definitions, &[], false).unwrap();

        assert_eq!(names(&classified.metadata), vec!["sales", "sales_1_ext_ext_part_", "plain"]);
        assert_eq!(names(&classified.data), vec!["sales", "plain"]);
    }

    #[test]
    fn test_classify_leaf_partition_data() {
        let (relations, definitions) = hierarchy();

        let classified = classify_relations(&relations, &definitions, &[], true).unwrap();

        assert_eq!(names(&classified.data), vec!["sales_1_a", "plain"]);
        for relation in &classified.data {
            let tag = definitions[&relation.oid].partition_type;
            assert!(matches!(tag, PartitionType::Leaf | PartitionType::None));
        }
    }

    #[test]
    fn test_leaf_partition_data_ignores_include_list() {
        let (relations, definitions) = hierarchy();
        let include = vec!["public.plain".to_string()];

        let classified = classify_relations(&relations, &definitions, &include, true).unwrap();

        assert_eq!(names(&classified.metadata), vec!["plain"]);
        assert_eq!(names(&classified.data), vec!["sales_1_a", "plain"]);
    }

    #[test]
    fn test_include_leaf_pulls_in_root_metadata() {
        let (relations, definitions) = hierarchy();
        let include = vec!["public.sales_1_a".to_string()];

        let classified = classify_relations(&relations, &definitions, &include, false).unwrap();

        assert_eq!(names(&classified.metadata), vec!["sales"]);
        assert_eq!(names(&classified.data), vec!["sales_1_a"]);
    }

    #[test]
    fn test_include_root_keeps_external_leaf() {
        let (relations, definitions) = hierarchy();
        let include = vec!["public.sales".to_string()];

        let classified = classify_relations(&relations, &definitions, &include, false).unwrap();

        assert_eq!(names(&classified.metadata), vec!["sales", "sales_1_ext_ext_part_"]);
        assert_eq!(names(&classified.data), vec!["sales"]);
    }

    #[test]
    fn test_missing_definition_is_ordinary_table() {
        let relations = vec![relation(9, "orphan")];

        let classified = classify_relations(&relations, &HashMap::new(), &[], true).unwrap();

        assert_eq!(names(&classified.metadata), vec!["orphan"]);
        assert_eq!(names(&classified.data), vec!["orphan"]);
    }

    #[test]
    fn test_suffix_short_name() {
        assert_eq!(append_ext_part_suffix("partition_name").unwrap(), "partition_name_ext_part_");
        assert_eq!(append_ext_part_suffix("\"Partition\"").unwrap(), "\"Partition_ext_part_\"");
    }

    #[test]
    fn test_suffix_truncates_long_unquoted_name() {
        let name = "a".repeat(64);

        let result = append_ext_part_suffix(&name).unwrap();

        assert_eq!(result.len(), 63);
        assert_eq!(result, format!("{}_ext_part_", "a".repeat(53)));
    }

    #[test]
    fn test_suffix_truncates_inside_quotes() {
        let name = format!("\"{}\"", "B".repeat(70));

        let result = append_ext_part_suffix(&name).unwrap();

        assert_eq!(result.len(), 63);
        assert!(result.starts_with('"') && result.ends_with('"'));
        assert_eq!(result, format!("\"{}_ext_part_\"", "B".repeat(51)));
    }

    #[test]
    fn test_suffix_never_splits_escaped_quote() {
        // 50 letters then an escaped quote straddling the 51-byte budget
        let name = format!("\"{}\"\"{}\"", "c".repeat(50), "d".repeat(20));

        let result = append_ext_part_suffix(&name).unwrap();

        assert_eq!(result, format!("\"{}_ext_part_\"", "c".repeat(50)));
    }

    #[test]
    fn test_suffix_never_splits_multibyte_char() {
        let name = "é".repeat(40);

        let result = append_ext_part_suffix(&name).unwrap();

        assert!(result.len() <= 63);
        assert_eq!(result, format!("{}_ext_part_", "é".repeat(26)));
    }

    #[test]
    fn test_suffix_inconsistent_limits() {
        assert!(matches!(
            append_suffix("name", "_ext_part_", 10),
            Err(BackupError::ConfigError { .. })
        ));
        assert!(matches!(
            append_suffix("", "_ext_part_", 63),
            Err(BackupError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_expand_include_relations() {
        let known = vec![
            relation(1, "sales"),
            relation(2, "sales_1_prt_1"),
            Relation::new(2201, 3, "other", "t"),
        ];
        let include = vec!["public.sales".to_string()];

        let expanded = expand_include_relations(&include, &known);

        assert_eq!(expanded, vec!["public.sales", "public.sales_1_prt_1"]);
    }

    #[rstest]
    #[case::listed_leaf(&["public.sales_1_a"], true, &["sales"], &["sales_1_a"])]
    #[case::listed_intermediate(&["public.sales_1"], true, &["sales"], &["sales_1_a"])]
    #[case::listed_root(&["public.sales"], true, &["sales", "sales_1_ext_ext_part_"], &["sales_1_a"])]
    #[case::listed_root_without_leaf_data(&["public.sales"], false, &["sales", "sales_1_ext_ext_part_"], &["sales"])]
    #[case::listed_plain_table(&["public.plain"], false, &["plain"], &["plain"])]
    fn test_resolve_then_classify(
        #[case] include: &[&str],
        #[case] leaf_partition_data: bool,
        #[case] metadata: &[&str],
        #[case] data: &[&str],
    ) {
        let (relations, definitions) = hierarchy();
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();

        let resolved = resolve_include_relations(&include, &relations, &definitions);
        let classified = classify_relations(&resolved, &definitions, &include, leaf_partition_data).unwrap();

        assert_eq!(names(&classified.metadata), metadata);
        assert_eq!(names(&classified.data), data);
    }

    #[test]
    fn test_resolve_listed_leaf_pulls_ancestors_only() {
        let (relations, definitions) = hierarchy();
        let include = vec!["public.sales_1_a".to_string()];

        let resolved = resolve_include_relations(&include, &relations, &definitions);

        assert_eq!(names(&resolved), vec!["sales", "sales_1", "sales_1_a"]);
    }

    #[test]
    fn test_resolve_skips_schema_siblings() {
        let (mut relations, definitions) = hierarchy();
        relations.push(relation(6, "unrelated_big_table"));
        let include = vec!["public.plain".to_string()];

        let resolved = resolve_include_relations(&include, &relations, &definitions);

        assert_eq!(names(&resolved), vec!["plain"]);
        assert_eq!(expand_include_relations(&include, &resolved), vec!["public.plain"]);
    }

    #[test]
    fn test_resolve_ignores_plain_inheritance_children() {
        let mut child = relation(7, "audit_child");
        child.inherits = vec!["public.plain".to_string()];
        let (mut relations, definitions) = hierarchy();
        relations.push(child);
        let include = vec!["public.plain".to_string()];

        let resolved = resolve_include_relations(&include, &relations, &definitions);

        assert_eq!(names(&resolved), vec!["plain"]);
    }

    #[test]
    fn test_expand_over_resolved_root() {
        let (relations, definitions) = hierarchy();
        let include = vec!["public.sales".to_string()];

        let resolved = resolve_include_relations(&include, &relations, &definitions);

        assert_eq!(
            expand_include_relations(&include, &resolved),
            vec!["public.sales", "public.sales_1", "public.sales_1_a", "public.sales_1_ext"]
        );
    }

    #[test]
    fn test_resolve_without_include_list_keeps_everything() {
        let (relations, definitions) = hierarchy();

        assert_eq!(resolve_include_relations(&[], &relations, &definitions), relations);
    }

    #[test]
    fn test_expand_empty_include_list() {
        assert!(expand_include_relations(&[], &[relation(1, "sales")]).is_empty());
    }
}
