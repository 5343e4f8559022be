//! Predata pipeline
//!
//! Wires the pieces together for one backup run:
//! 1. Validate the config and apply schema/exclude filters
//! 2. Record table inheritance, then narrow relations, sequences and views
//!    to what the include list reaches
//! 3. Attach column privileges to table definitions
//! 4. Classify relations into the metadata and data sets
//! 5. Sort functions, types and tables, then views
//! 6. Render everything in restore order
//!
//! The input is a catalog snapshot the query layer already fetched; nothing
//! here touches a database.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::catalog::{
    Constraint, Function, Relation, Sequence, TableDefinition, TextSearchConfiguration,
    TextSearchDictionary, TextSearchParser, TextSearchTemplate, Type, View,
};
use crate::config::BackupConfig;
use crate::ddl::{
    print_alter_sequence_statements, print_constraint_statements, print_create_sequence_statements,
    print_create_text_search_configuration_statements, print_create_text_search_dictionary_statements,
    print_create_text_search_parser_statements, print_create_text_search_template_statements,
    print_create_view_statements, print_dependent_objects, DependentMetadata, EmittedStatement,
    MetadataWriter,
};
use crate::dependency::{apply_table_inheritance, sort_functions_and_types_and_tables, sort_views, InheritanceRow};
use crate::error::BackupResult;
use crate::metadata::{
    construct_column_privileges_map, construct_comment_map, construct_metadata_map, ColumnPrivilegesRow,
    CommentQueryRow, MetadataQueryRow,
};
use crate::partition::{classify_relations, expand_include_relations, resolve_include_relations};
use crate::utils::split_owning_column;

/// Everything the query layer fetched for one backup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredataCatalog {
    pub relations: Vec<Relation>,
    /// Keyed by relation oid
    pub table_defs: HashMap<u32, TableDefinition>,
    pub inheritance: Vec<InheritanceRow>,
    pub column_privileges: Vec<ColumnPrivilegesRow>,
    pub sequences: Vec<Sequence>,
    /// Sequence qualified name -> owning `schema.table.column`
    pub sequence_owner_columns: HashMap<String, String>,
    pub views: Vec<View>,
    pub functions: Vec<Function>,
    pub types: Vec<Type>,
    pub constraints: Vec<Constraint>,
    pub text_search_parsers: Vec<TextSearchParser>,
    pub text_search_templates: Vec<TextSearchTemplate>,
    pub text_search_dictionaries: Vec<TextSearchDictionary>,
    pub text_search_configurations: Vec<TextSearchConfiguration>,
    /// Tables, sequences and views share the `pg_class` oid space
    pub relation_metadata: Vec<MetadataQueryRow>,
    pub function_metadata: Vec<MetadataQueryRow>,
    pub type_metadata: Vec<MetadataQueryRow>,
    pub text_search_metadata: Vec<MetadataQueryRow>,
    pub constraint_comments: Vec<CommentQueryRow>,
}

impl PredataCatalog {
    pub fn from_json(json: &str) -> BackupResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of one run: the relation sets and the ordered statements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredataBackup {
    pub metadata_relations: Vec<Relation>,
    pub data_relations: Vec<Relation>,
    /// Include list after expansion; empty when no filter was given
    pub include_relations: Vec<String>,
    pub statements: Vec<EmittedStatement>,
}

impl PredataBackup {
    pub fn to_json(&self) -> BackupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copy column ACLs from the privileges rows onto the matching columns
fn attach_column_privileges(
    definitions: &mut HashMap<u32, TableDefinition>,
    rows: &[ColumnPrivilegesRow],
) -> BackupResult<()> {
    let privileges = construct_column_privileges_map(rows)?;
    for (table_oid, columns) in &privileges {
        let Some(definition) = definitions.get_mut(table_oid) else {
            debug!("Column privileges for unknown table oid {}", table_oid);
            continue;
        };
        for column in &mut definition.column_defs {
            if let Some(acl) = columns.get(&column.name) {
                column.acl.clone_from(acl);
            }
        }
    }
    Ok(())
}

/// Run the whole predata pass over a catalog snapshot
pub fn backup_predata(catalog: PredataCatalog, config: &BackupConfig) -> BackupResult<PredataBackup> {
    config.validate()?;

    let PredataCatalog {
        mut relations,
        mut table_defs,
        inheritance,
        column_privileges,
        mut sequences,
        sequence_owner_columns,
        mut views,
        functions,
        types,
        constraints,
        text_search_parsers,
        text_search_templates,
        text_search_dictionaries,
        text_search_configurations,
        relation_metadata,
        function_metadata,
        type_metadata,
        text_search_metadata,
        constraint_comments,
    } = catalog;

    relations.retain(|r| config.selects_relation(&r.schema, &r.fqn()));
    sequences.retain(|s| config.selects_relation(&s.relation.schema, &s.fqn()));
    views.retain(|v| config.selects_relation(&v.schema, &v.fqn()));

    apply_table_inheritance(&mut relations, &inheritance, &table_defs);
    let relations = resolve_include_relations(&config.include_relations, &relations, &table_defs);
    let include_relations = expand_include_relations(&config.include_relations, &relations);
    if !include_relations.is_empty() {
        let included: HashSet<&str> = include_relations.iter().map(String::as_str).collect();
        sequences.retain(|s| {
            let keep = included.contains(s.fqn().as_str())
                || sequence_owner_columns
                    .get(&s.fqn())
                    .and_then(|column| split_owning_column(column.as_str()))
                    .is_some_and(|(table, _)| included.contains(table));
            if !keep {
                debug!("Skipping sequence {}: not reached by the include list", s.fqn());
            }
            keep
        });
        views.retain(|v| included.contains(v.fqn().as_str()));
    }
    attach_column_privileges(&mut table_defs, &column_privileges)?;

    // Only directly listed relations count here; the expansion feeds the filters above
    let classified = classify_relations(
        &relations,
        &table_defs,
        &config.include_relations,
        config.leaf_partition_data,
    )?;

    let relation_md = construct_metadata_map(&relation_metadata)?;
    let function_md = construct_metadata_map(&function_metadata)?;
    let type_md = construct_metadata_map(&type_metadata)?;
    let text_search_md = construct_metadata_map(&text_search_metadata)?;
    let constraint_md = construct_comment_map(&constraint_comments);

    let (domain_constraints, table_constraints): (Vec<Constraint>, Vec<Constraint>) =
        constraints.into_iter().partition(|c| c.is_domain_constraint);
    let backed_up: HashSet<String> = classified.metadata.iter().map(Relation::fqn).collect();
    let table_constraints: Vec<Constraint> = table_constraints
        .into_iter()
        .filter(|c| {
            let keep = backed_up.contains(&c.owning_object);
            if !keep {
                debug!("Skipping constraint {} on {}: table not in backup", c.name, c.owning_object);
            }
            keep
        })
        .collect();

    let sorted = sort_functions_and_types_and_tables(functions, types, classified.metadata.clone())?;
    let views = sort_views(views)?;

    let mut writer = MetadataWriter::new();
    print_create_sequence_statements(&mut writer, &sequences, &relation_md);
    print_dependent_objects(
        &mut writer,
        &sorted,
        DependentMetadata {
            functions: &function_md,
            types: &type_md,
            relations: &relation_md,
        },
        &table_defs,
        &domain_constraints,
    )?;
    print_create_text_search_parser_statements(&mut writer, &text_search_parsers, &text_search_md);
    print_create_text_search_template_statements(&mut writer, &text_search_templates, &text_search_md);
    print_create_text_search_dictionary_statements(&mut writer, &text_search_dictionaries, &text_search_md);
    print_create_text_search_configuration_statements(&mut writer, &text_search_configurations, &text_search_md);
    print_create_view_statements(&mut writer, &views, &relation_md);
    print_constraint_statements(&mut writer, &table_constraints, &constraint_md);
    print_alter_sequence_statements(&mut writer, &sequences, &sequence_owner_columns, &classified.metadata);

    let statements = writer.statements();
    info!(
        "Predata complete: {} statements, {} relations need data",
        statements.len(),
        classified.data.len()
    );

    Ok(PredataBackup {
        metadata_relations: classified.metadata,
        data_relations: classified.data,
        include_relations,
        statements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BaseTypeDefinition, ColumnDefinition, PartitionType, SequenceDefinition, TypeKind};
    use crate::error::testing::{assert_dependency_cycle, assert_error_contains};

    fn table_def(columns: Vec<ColumnDefinition>) -> TableDefinition {
        TableDefinition {
            dist_policy: "DISTRIBUTED RANDOMLY".to_string(),
            column_defs: columns,
            ..Default::default()
        }
    }

    fn sample_catalog() -> PredataCatalog {
        let mut orders = Relation::new(2200, 100, "public", "orders");
        orders.depends_upon = vec!["public.money".to_string()];
        let customers = Relation::new(2200, 101, "public", "customers");

        let mut orders_columns = vec![
            ColumnDefinition::new(1, "id", "integer"),
            ColumnDefinition::new(2, "amount", "public.money"),
        ];
        orders_columns[0].not_null = true;

        let money = Type {
            oid: 300,
            schema: "public".to_string(),
            name: "money".to_string(),
            kind: TypeKind::Base(BaseTypeDefinition {
                input: "public.money_in".to_string(),
                output: "public.money_out".to_string(),
                ..Default::default()
            }),
            depends_upon: vec!["public.money_in(cstring)".to_string(), "public.money_out(public.money)".to_string()],
        };
        let io_function = |oid: u32, name: &str, args: &str, result: &str| Function {
            oid,
            schema: "public".to_string(),
            name: name.to_string(),
            arguments: args.to_string(),
            ident_args: args.to_string(),
            result_type: result.to_string(),
            binary_path: "$libdir/money".to_string(),
            function_body: name.to_string(),
            language: "c".to_string(),
            cost: 1.0,
            depends_upon: vec!["public.money".to_string()],
            ..Default::default()
        };

        PredataCatalog {
            relations: vec![orders, customers],
            table_defs: HashMap::from([(100, table_def(orders_columns)), (101, table_def(vec![]))]),
            column_privileges: vec![ColumnPrivilegesRow {
                table_oid: 100,
                name: "amount".to_string(),
                privileges: Some("auditor=r/owner".to_string()),
                kind: String::new(),
            }],
            sequences: vec![Sequence {
                relation: Relation::new(2200, 200, "public", "orders_id_seq"),
                definition: SequenceDefinition {
                    last_val: 1,
                    increment: 1,
                    max_val: i64::MAX,
                    min_val: 1,
                    cache_val: 1,
                    is_called: false,
                    ..Default::default()
                },
            }],
            sequence_owner_columns: HashMap::from([(
                "public.orders_id_seq".to_string(),
                "public.orders.id".to_string(),
            )]),
            views: vec![View {
                oid: 400,
                schema: "public".to_string(),
                name: "big_orders".to_string(),
                definition: "SELECT id FROM public.orders WHERE amount > 100".to_string(),
                depends_upon: vec![],
            }],
            functions: vec![
                io_function(500, "money_in", "cstring", "public.money"),
                io_function(501, "money_out", "public.money", "cstring"),
            ],
            types: vec![money],
            constraints: vec![
                Constraint {
                    oid: 600,
                    schema: "public".to_string(),
                    name: "orders_customer_fkey".to_string(),
                    con_type: "f".to_string(),
                    con_def: "FOREIGN KEY (id) REFERENCES public.customers(id)".to_string(),
                    owning_object: "public.orders".to_string(),
                    ..Default::default()
                },
                Constraint {
                    oid: 601,
                    schema: "public".to_string(),
                    name: "orders_pkey".to_string(),
                    con_type: "p".to_string(),
                    con_def: "PRIMARY KEY (id)".to_string(),
                    owning_object: "public.orders".to_string(),
                    ..Default::default()
                },
            ],
            relation_metadata: vec![MetadataQueryRow {
                oid: 100,
                privileges: None,
                kind: "Default".to_string(),
                owner: "admin".to_string(),
                ..Default::default()
            }],
            constraint_comments: vec![CommentQueryRow {
                oid: 601,
                comment: "Primary key".to_string(),
            }],
            ..Default::default()
        }
    }

    fn object_types(backup: &PredataBackup) -> Vec<(String, String)> {
        backup
            .statements
            .iter()
            .map(|s| (s.entry.object_type.clone(), s.entry.name.clone()))
            .collect()
    }

    #[test]
    fn test_emission_order() {
        let backup = backup_predata(sample_catalog(), &BackupConfig::default()).unwrap();

        let expected: Vec<(String, String)> = [
            ("SEQUENCE", "orders_id_seq"),
            ("TABLE", "customers"),
            ("TYPE", "money"),
            ("FUNCTION", "money_in(cstring)"),
            ("FUNCTION", "money_out(public.money)"),
            ("TYPE", "money"),
            ("TABLE", "orders"),
            ("VIEW", "big_orders"),
            ("CONSTRAINT", "orders_pkey"),
            ("CONSTRAINT", "orders_customer_fkey"),
            ("SEQUENCE OWNER", "orders_id_seq"),
        ]
        .iter()
        .map(|(t, n)| (t.to_string(), n.to_string()))
        .collect();
        assert_eq!(object_types(&backup), expected);
        assert_eq!(backup.statements[2].statement, "CREATE TYPE public.money;");
    }

    #[test]
    fn test_table_statement_carries_owner_and_column_grants() {
        let backup = backup_predata(sample_catalog(), &BackupConfig::default()).unwrap();

        let orders = backup
            .statements
            .iter()
            .find(|s| s.entry.object_type == "TABLE" && s.entry.name == "orders")
            .unwrap();
        assert_eq!(
            orders.statement,
            "CREATE TABLE public.orders (\n\tid integer NOT NULL,\n\tamount public.money\n) DISTRIBUTED RANDOMLY;\n\n\n\
ALTER TABLE public.orders OWNER TO admin;\n\n\n\
REVOKE ALL (amount) ON TABLE public.orders FROM PUBLIC;\n\
REVOKE ALL (amount) ON TABLE public.orders FROM admin;\n\
GRANT SELECT (amount) ON TABLE public.orders TO auditor;"
        );
    }

    #[test]
    fn test_constraint_comment_and_owned_by() {
        let backup = backup_predata(sample_catalog(), &BackupConfig::default()).unwrap();

        let pkey = backup.statements.iter().find(|s| s.entry.name == "orders_pkey").unwrap();
        assert_eq!(pkey.entry.reference_object, "public.orders");
        assert!(pkey.statement.ends_with("COMMENT ON CONSTRAINT orders_pkey ON public.orders IS 'Primary key';"));

        let owner = backup.statements.last().unwrap();
        assert_eq!(owner.statement, "ALTER SEQUENCE public.orders_id_seq OWNED BY public.orders.id;");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let first = backup_predata(sample_catalog(), &BackupConfig::default()).unwrap();
        let second = backup_predata(sample_catalog(), &BackupConfig::default()).unwrap();

        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_excluded_relation_drops_its_ddl() {
        let config = BackupConfig {
            exclude_relations: vec!["public.orders".to_string()],
            ..Default::default()
        };

        let backup = backup_predata(sample_catalog(), &config).unwrap();

        let names: Vec<&str> = backup.metadata_relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["customers"]);
        assert!(backup.statements.iter().all(|s| s.entry.object_type != "CONSTRAINT"));
        assert!(backup.statements.iter().all(|s| s.entry.object_type != "SEQUENCE OWNER"));
    }

    #[test]
    fn test_leaf_partition_data_with_external_leaf() {
        let mut catalog = PredataCatalog::default();
        let parent = Relation::new(2200, 1, "public", "sales");
        let leaf = Relation::new(2200, 2, "public", "sales_1_prt_jan");
        let ext_leaf = Relation::new(2200, 3, "public", "sales_1_prt_feb");
        catalog.relations = vec![parent, leaf, ext_leaf];
        catalog.table_defs = HashMap::from([
            (1, TableDefinition { partition_type: PartitionType::Parent, ..table_def(vec![]) }),
            (
                2,
                TableDefinition {
                    partition_type: PartitionType::Leaf,
                    partition_root: Some("sales".to_string()),
                    ..table_def(vec![])
                },
            ),
            (
                3,
                TableDefinition {
                    partition_type: PartitionType::Leaf,
                    partition_root: Some("sales".to_string()),
                    is_external: true,
                    ..table_def(vec![])
                },
            ),
        ]);
        catalog.inheritance = vec![InheritanceRow {
            child_oid: 3,
            parent_fqn: "public.sales".to_string(),
        }];
        let config = BackupConfig {
            leaf_partition_data: true,
            ..Default::default()
        };

        let backup = backup_predata(catalog, &config).unwrap();

        let metadata: Vec<&str> = backup.metadata_relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(metadata, vec!["sales", "sales_1_prt_feb_ext_part_"]);
        let data: Vec<&str> = backup.data_relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(data, vec!["sales_1_prt_jan"]);
        assert!(backup.statements[1].statement.starts_with("CREATE READABLE EXTERNAL WEB TABLE public.sales_1_prt_feb_ext_part_"));
    }

    #[test]
    fn test_included_table_leaves_schema_siblings_out() {
        let mut catalog = sample_catalog();
        catalog.relations.push(Relation::new(2200, 102, "public", "unrelated_big_table"));
        catalog.table_defs.insert(102, table_def(vec![]));
        let config = BackupConfig {
            include_relations: vec!["public.orders".to_string()],
            ..Default::default()
        };

        let backup = backup_predata(catalog, &config).unwrap();

        assert_eq!(backup.include_relations, vec!["public.orders"]);
        let metadata: Vec<&str> = backup.metadata_relations.iter().map(|r| r.name.as_str()).collect();
        let data: Vec<&str> = backup.data_relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(metadata, vec!["orders"]);
        assert_eq!(data, vec!["orders"]);

        // The owned sequence follows its table; the unlisted view does not
        let kinds: Vec<(String, String)> = object_types(&backup)
            .into_iter()
            .filter(|(t, _)| t != "TYPE" && t != "FUNCTION")
            .collect();
        let expected: Vec<(String, String)> = [
            ("SEQUENCE", "orders_id_seq"),
            ("TABLE", "orders"),
            ("CONSTRAINT", "orders_pkey"),
            ("CONSTRAINT", "orders_customer_fkey"),
            ("SEQUENCE OWNER", "orders_id_seq"),
        ]
        .iter()
        .map(|(t, n)| (t.to_string(), n.to_string()))
        .collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_include_list_gates_dependents() {
        let config = BackupConfig {
            include_relations: vec!["public.customers".to_string(), "public.big_orders".to_string()],
            ..Default::default()
        };

        let backup = backup_predata(sample_catalog(), &config).unwrap();

        let kinds: Vec<(String, String)> = object_types(&backup)
            .into_iter()
            .filter(|(t, _)| t != "TYPE" && t != "FUNCTION")
            .collect();
        let expected: Vec<(String, String)> = [("TABLE", "customers"), ("VIEW", "big_orders")]
            .iter()
            .map(|(t, n)| (t.to_string(), n.to_string()))
            .collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn test_include_leaf_with_leaf_partition_data() {
        let mut catalog = PredataCatalog::default();
        catalog.relations = vec![
            Relation::new(2200, 1, "public", "sales"),
            Relation::new(2200, 2, "public", "sales_1_prt_jan"),
            Relation::new(2200, 3, "public", "sales_1_prt_feb"),
        ];
        let leaf = || TableDefinition {
            partition_type: PartitionType::Leaf,
            partition_root: Some("sales".to_string()),
            ..table_def(vec![])
        };
        catalog.table_defs = HashMap::from([
            (1, TableDefinition { partition_type: PartitionType::Parent, ..table_def(vec![]) }),
            (2, leaf()),
            (3, leaf()),
        ]);
        catalog.inheritance = vec![
            InheritanceRow { child_oid: 2, parent_fqn: "public.sales".to_string() },
            InheritanceRow { child_oid: 3, parent_fqn: "public.sales".to_string() },
        ];
        let config = BackupConfig {
            leaf_partition_data: true,
            include_relations: vec!["public.sales_1_prt_jan".to_string()],
            ..Default::default()
        };

        let backup = backup_predata(catalog, &config).unwrap();

        let metadata: Vec<&str> = backup.metadata_relations.iter().map(|r| r.name.as_str()).collect();
        let data: Vec<&str> = backup.data_relations.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(metadata, vec!["sales"]);
        assert_eq!(data, vec!["sales_1_prt_jan"]);
        assert_eq!(backup.include_relations, vec!["public.sales_1_prt_jan", "public.sales"]);
    }

    #[test]
    fn test_unbreakable_cycle_fails() {
        let mut catalog = sample_catalog();
        catalog.relations[1].depends_upon = vec!["public.orders".to_string()];
        catalog.relations[0].depends_upon.push("public.customers".to_string());

        assert_dependency_cycle(
            backup_predata(catalog, &BackupConfig::default()),
            &["public.orders", "public.customers"],
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BackupConfig {
            include_schemas: vec!["a".to_string()],
            exclude_schemas: vec!["b".to_string()],
            ..Default::default()
        };

        assert_error_contains(backup_predata(sample_catalog(), &config), "exclude_schemas");
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = PredataCatalog::from_json(
            r#"{
                "relations": [{ "oid": 10, "schema": "public", "name": "t" }],
                "table_defs": { "10": { "dist_policy": "DISTRIBUTED BY (a)",
                                        "column_defs": [{ "num": 1, "name": "a", "type_name": "integer" }] } }
            }"#,
        )
        .unwrap();

        let backup = backup_predata(catalog, &BackupConfig::default()).unwrap();

        assert_eq!(backup.statements.len(), 1);
        assert_eq!(backup.statements[0].statement, "CREATE TABLE public.t (\n\ta integer\n) DISTRIBUTED BY (a);");
        assert!(backup.to_json().unwrap().contains("\"object_type\": \"TABLE\""));
    }
}
