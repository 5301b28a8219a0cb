//! # Addon Ordering Graph
//!
//! [`OrderingGraph`] turns `before`/`after` constraints into a single linear order.
//!
//! A `before` constraint from `a` to `b` adds the edge `a -> b` (`a` comes first); an
//! `after` constraint from `a` to `b` adds `b -> a`. Names that only ever appear as
//! constraint targets become payload-less nodes: they still order the nodes around
//! them, but resolve to `None` and are meant to be skipped by the consumer.
//!
//! Resolution is a Kahn-style sort where the ready set is drained by the order in
//! which names were first seen, so the same input always yields the same output.
use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

/// Error produced while building or resolving an [`OrderingGraph`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    /// The constraints cannot be satisfied
    #[error("Cycle detected in addon ordering: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// A name was registered as a node twice
    #[error("Addon '{0}' was added to the ordering graph more than once")]
    DuplicateNode(String),
}

#[derive(Debug)]
struct Node<T> {
    name: String,
    payload: Option<T>,
    /// Nodes that must come after this one
    successors: Vec<usize>,
}

/// Directed graph over addon names built from ordering constraints
#[derive(Debug)]
pub struct OrderingGraph<T> {
    index: HashMap<String, usize>,
    nodes: Vec<Node<T>>,
}

impl<T> OrderingGraph<T> {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
        }
    }

    /// Register `name` with its payload and constraints.
    ///
    /// `before` lists names this node must precede, `after` the names it must follow.
    /// Referenced names that were never added themselves stay payload-less.
    pub fn add<B, A>(&mut self, name: &str, payload: T, before: B, after: A) -> Result<(), OrderingError>
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let id = self.vertex(name);
        if self.nodes[id].payload.is_some() {
            return Err(OrderingError::DuplicateNode(name.to_string()));
        }
        self.nodes[id].payload = Some(payload);

        for target in before {
            let target = self.vertex(target.as_ref());
            self.add_edge(id, target);
        }
        for source in after {
            let source = self.vertex(source.as_ref());
            self.add_edge(source, id);
        }
        Ok(())
    }

    /// Whether `name` is known to the graph, as a node or a constraint target
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of distinct names known to the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve the graph into a linear order.
    ///
    /// Every known name appears exactly once. Names that were only referenced by
    /// constraints carry `None`.
    pub fn resolve(self) -> Result<Vec<(String, Option<T>)>, OrderingError> {
        let count = self.nodes.len();
        let mut in_degree = vec![0usize; count];
        for node in &self.nodes {
            for &successor in &node.successors {
                in_degree[successor] += 1;
            }
        }

        // Indices double as first-seen order, so the smallest ready index wins ties.
        let mut ready: BTreeSet<usize> = (0..count).filter(|&id| in_degree[id] == 0).collect();
        let mut order = Vec::with_capacity(count);
        while let Some(id) = ready.pop_first() {
            order.push(id);
            for &successor in &self.nodes[id].successors {
                in_degree[successor] -= 1;
                if in_degree[successor] == 0 {
                    ready.insert(successor);
                }
            }
        }

        if order.len() != count {
            let cycle = self.find_cycle(&in_degree);
            log::trace!("Ordering graph rejected, cycle: {}", cycle.join(" -> "));
            return Err(OrderingError::Cycle(cycle));
        }

        let mut slots: Vec<Option<Node<T>>> = self.nodes.into_iter().map(Some).collect();
        Ok(order
            .into_iter()
            .filter_map(|id| slots[id].take())
            .map(|node| (node.name, node.payload))
            .collect())
    }

    fn vertex(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node {
            name: name.to_string(),
            payload: None,
            successors: Vec::new(),
        });
        self.index.insert(name.to_string(), id);
        id
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        let successors = &mut self.nodes[from].successors;
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    /// Walk predecessors among the nodes the sort could not emit until one repeats.
    ///
    /// Every such node still has a positive in-degree, hence a predecessor that was
    /// not emitted either, so the walk always closes a cycle.
    fn find_cycle(&self, in_degree: &[usize]) -> Vec<String> {
        let stuck = |id: usize| in_degree[id] > 0;
        let Some(start) = (0..self.nodes.len()).find(|&id| stuck(id)) else {
            return Vec::new();
        };

        let mut path = vec![start];
        let mut current = start;
        while let Some(pred) =
            (0..self.nodes.len()).find(|&id| stuck(id) && self.nodes[id].successors.contains(&current))
        {
            if let Some(pos) = path.iter().position(|&id| id == pred) {
                // `path` runs against the edges; flip it and close the loop.
                let mut cycle: Vec<String> = path[pos..]
                    .iter()
                    .rev()
                    .map(|&id| self.nodes[id].name.clone())
                    .collect();
                cycle.push(cycle[0].clone());
                return cycle;
            }
            path.push(pred);
            current = pred;
        }

        path.iter().rev().map(|&id| self.nodes[id].name.clone()).collect()
    }
}

impl<T> Default for OrderingGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
