use tracing::info;

use super::graph::{topological_sort, SortCategory, Sortable, Sorted};
use crate::catalog::{Function, Relation, Type, TypeKind, View};
use crate::error::BackupResult;

/// An object that is created in the functions/types/tables pass
#[derive(Debug, Clone, PartialEq)]
pub enum PredataObject {
    Function(Function),
    Type(Type),
    Table(Relation),
}

impl Sortable for PredataObject {
    fn fqn(&self) -> String {
        match self {
            PredataObject::Function(function) => function.fqn_with_args(),
            PredataObject::Type(t) => t.fqn(),
            PredataObject::Table(relation) => relation.fqn(),
        }
    }

    fn depends_upon(&self) -> &[String] {
        match self {
            PredataObject::Function(function) => &function.depends_upon,
            PredataObject::Type(t) => &t.depends_upon,
            PredataObject::Table(relation) => &relation.depends_upon,
        }
    }

    fn sort_category(&self) -> SortCategory {
        match self {
            PredataObject::Type(t) => match t.kind {
                TypeKind::Shell => SortCategory::ShellType,
                TypeKind::Base(_) => SortCategory::BaseType,
                TypeKind::Composite(_) | TypeKind::Domain(_) | TypeKind::Enum(_) => {
                    SortCategory::CompositeType
                }
            },
            PredataObject::Function(_) => SortCategory::Function,
            PredataObject::Table(_) => SortCategory::Relation,
        }
    }

    fn can_shell(&self) -> bool {
        matches!(
            self,
            PredataObject::Type(Type {
                kind: TypeKind::Base(_) | TypeKind::Composite(_),
                ..
            })
        )
    }
}

impl Sortable for View {
    fn fqn(&self) -> String {
        View::fqn(self)
    }

    fn depends_upon(&self) -> &[String] {
        &self.depends_upon
    }
}

/// Order functions, types and tables into one creation sequence
pub fn sort_functions_and_types_and_tables(
    functions: Vec<Function>,
    types: Vec<Type>,
    tables: Vec<Relation>,
) -> BackupResult<Vec<Sorted<PredataObject>>> {
    let mut objects = Vec::with_capacity(functions.len() + types.len() + tables.len());
    objects.extend(functions.into_iter().map(PredataObject::Function));
    objects.extend(types.into_iter().map(PredataObject::Type));
    objects.extend(tables.into_iter().map(PredataObject::Table));

    let sorted = topological_sort(objects)?;
    let shells = sorted.iter().filter(|s| s.is_shell()).count();
    info!("Sorted {} functions, types and tables ({} shell types)", sorted.len() - shells, shells);
    Ok(sorted)
}

/// Order views so each is created after the views it selects from
pub fn sort_views(views: Vec<View>) -> BackupResult<Vec<View>> {
    Ok(topological_sort(views)?
        .into_iter()
        .map(Sorted::into_object)
        .collect())
}
