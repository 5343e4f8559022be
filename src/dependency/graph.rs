//! Dependency graph and topological sort
//!
//! Objects are ordered with Kahn's algorithm. Type cycles are broken by
//! emitting a shell (forward declaration) and defining the type later.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, warn};

use crate::config::DEBUG_DEPENDENCIES;
use crate::error::{BackupError, BackupResult};

/// Emission precedence for objects with no ordering between them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortCategory {
    ShellType,
    BaseType,
    CompositeType,
    Function,
    Relation,
}

/// An object the dependency resolver can order
pub trait Sortable {
    /// Identity other objects name in their dependency lists
    fn fqn(&self) -> String;

    fn depends_upon(&self) -> &[String];

    fn sort_category(&self) -> SortCategory {
        SortCategory::Relation
    }

    /// Whether a bodyless forward declaration can stand in for this object
    fn can_shell(&self) -> bool {
        false
    }
}

/// Per-object progress: Pending -> Defined, or Pending -> Shelled -> Defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeState {
    Pending,
    Shelled,
    Defined,
}

/// One step of the emission order
#[derive(Debug, Clone, PartialEq)]
pub enum Sorted<T> {
    /// Forward declaration; the definition follows later in the order
    Shell(T),
    Definition(T),
}

impl<T> Sorted<T> {
    pub fn object(&self) -> &T {
        match self {
            Sorted::Shell(object) | Sorted::Definition(object) => object,
        }
    }

    pub fn into_object(self) -> T {
        match self {
            Sorted::Shell(object) | Sorted::Definition(object) => object,
        }
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, Sorted::Shell(_))
    }
}

type ReadyKey = Reverse<(SortCategory, String, usize)>;

/// Index-based view of the objects being sorted
///
/// `dependencies[i]` lists what object `i` waits for; `dependents[j]` is the
/// reverse. An object is released once it is shelled or defined, and each
/// release decrements its dependents' `waiting` count exactly once.
struct SortGraph {
    names: Vec<String>,
    categories: Vec<SortCategory>,
    shellable: Vec<bool>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
    waiting: Vec<usize>,
    states: Vec<TypeState>,
    released: Vec<bool>,
}

impl SortGraph {
    fn build<T: Sortable>(items: &[T]) -> BackupResult<Self> {
        let n = items.len();
        let names: Vec<String> = items.iter().map(Sortable::fqn).collect();

        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (idx, name) in names.iter().enumerate() {
            if index.insert(name.as_str(), idx).is_some() {
                return Err(BackupError::DuplicateObject { name: name.clone() });
            }
        }

        let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, item) in items.iter().enumerate() {
            for dep in item.depends_upon() {
                match index.get(dep.as_str()) {
                    Some(&target) if target == idx => {
                        debug!("Ignoring self-dependency of {}", names[idx]);
                    }
                    Some(&target) => {
                        if !dependencies[idx].contains(&target) {
                            if DEBUG_DEPENDENCIES {
                                debug!("{} depends on {}", names[idx], names[target]);
                            }
                            dependencies[idx].push(target);
                            dependents[target].push(idx);
                        }
                    }
                    None => {
                        debug!("Ignoring dependency of {} on {} outside the sort set", names[idx], dep);
                    }
                }
            }
        }

        Ok(SortGraph {
            categories: items.iter().map(Sortable::sort_category).collect(),
            shellable: items.iter().map(Sortable::can_shell).collect(),
            waiting: dependencies.iter().map(Vec::len).collect(),
            states: vec![TypeState::Pending; n],
            released: vec![false; n],
            names,
            dependencies,
            dependents,
        })
    }

    fn key(&self, idx: usize) -> ReadyKey {
        Reverse((self.categories[idx], self.names[idx].clone(), idx))
    }

    /// Mark `idx` as available to its dependents; returns the ones now ready
    fn release(&mut self, idx: usize) -> Vec<usize> {
        if self.released[idx] {
            return Vec::new();
        }
        self.released[idx] = true;

        let mut now_ready = Vec::new();
        for &dependent in &self.dependents[idx] {
            self.waiting[dependent] -= 1;
            if self.waiting[dependent] == 0 && self.states[dependent] != TypeState::Defined {
                now_ready.push(dependent);
            }
        }
        now_ready
    }

    /// Whether `start` can reach itself through unreleased dependencies
    fn on_cycle(&self, start: usize) -> bool {
        let mut visited = vec![false; self.names.len()];
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            for &dep in &self.dependencies[node] {
                if self.released[dep] {
                    continue;
                }
                if dep == start {
                    return true;
                }
                if !visited[dep] {
                    visited[dep] = true;
                    stack.push(dep);
                }
            }
        }
        false
    }

    /// Smallest (category, name) pending object that can break a cycle
    fn shell_candidate(&self) -> Option<usize> {
        (0..self.names.len())
            .filter(|&idx| self.states[idx] == TypeState::Pending && self.shellable[idx])
            .filter(|&idx| self.on_cycle(idx))
            .min_by(|&a, &b| {
                (self.categories[a], &self.names[a]).cmp(&(self.categories[b], &self.names[b]))
            })
    }

    fn unsorted(&self) -> Vec<String> {
        let mut names: Vec<String> = (0..self.names.len())
            .filter(|&idx| self.states[idx] != TypeState::Defined)
            .map(|idx| self.names[idx].clone())
            .collect();
        names.sort();
        names
    }
}

/// Topological sort using Kahn's algorithm
///
/// Every object is emitted after the objects it depends on. Among ready
/// objects the smallest (category, name) goes first, so the order is
/// deterministic. When nothing is ready, a shellable object on a cycle is
/// forward-declared with `Sorted::Shell` and its definition follows once its
/// own dependencies are out.
pub fn topological_sort<T: Sortable + Clone>(items: Vec<T>) -> BackupResult<Vec<Sorted<T>>> {
    let n = items.len();
    let mut graph = SortGraph::build(&items)?;
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();

    let mut ready: BinaryHeap<ReadyKey> = (0..n)
        .filter(|&idx| graph.waiting[idx] == 0)
        .map(|idx| graph.key(idx))
        .collect();

    let mut sorted = Vec::with_capacity(n);
    let mut defined = 0;
    let mut passes = 0;

    loop {
        while let Some(Reverse((_, _, idx))) = ready.pop() {
            let object = slots[idx]
                .take()
                .ok_or_else(|| crate::internal_error!("{} was emitted twice", graph.names[idx]))?;
            graph.states[idx] = TypeState::Defined;
            defined += 1;
            sorted.push(Sorted::Definition(object));
            for next in graph.release(idx) {
                ready.push(graph.key(next));
            }
        }

        if defined == n {
            return Ok(sorted);
        }

        // Each pass shells one object, so there can be at most n of them
        passes += 1;
        if passes > n {
            return Err(crate::internal_error!(
                "Dependency sort made no progress after {} passes",
                passes
            ));
        }

        let Some(idx) = graph.shell_candidate() else {
            let entities = graph.unsorted();
            warn!("Unresolvable dependency cycle among {} objects", entities.len());
            return Err(BackupError::DependencyCycle { entities });
        };

        let shell = slots[idx]
            .clone()
            .ok_or_else(|| crate::internal_error!("{} shelled after definition", graph.names[idx]))?;
        debug!("Breaking dependency cycle with a shell for {}", graph.names[idx]);
        graph.states[idx] = TypeState::Shelled;
        sorted.push(Sorted::Shell(shell));
        for next in graph.release(idx) {
            ready.push(graph.key(next));
        }
    }
}
