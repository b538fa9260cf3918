//! Sparse field selection
//!
//! `select(author.name,-books)` resolves against the compiled selection
//! tree into a map of dotted path to "included". Selecting one member of
//! a namespace deselects its siblings unless they are selected too; paths
//! hidden by default stay hidden unless selected.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::schema::SelectNode;
use crate::store::ResultSet;

use super::errors::{FilterError, FilterResult};

/// Selection outcome handed back to the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionPlan {
    pub depth: u32,
    pub select: BTreeMap<String, bool>,
}

impl SelectionPlan {
    pub fn new(select: BTreeMap<String, bool>) -> Self {
        Self { depth: 0, select }
    }

    /// `false` only for paths resolved as excluded
    pub fn is_included(&self, path: &str) -> bool {
        self.select.get(path).copied().unwrap_or(true)
    }
}

pub struct SelectResolver<'a> {
    tree: &'a SelectNode,
}

#[derive(Default)]
struct SelectState {
    included: BTreeSet<String>,
    excluded: BTreeSet<String>,
    potential: BTreeSet<String>,
}

impl<'a> SelectResolver<'a> {
    pub fn new(tree: &'a SelectNode) -> Self {
        Self { tree }
    }

    pub fn resolve(&self, tokens: &[String]) -> FilterResult<BTreeMap<String, bool>> {
        let mut state = SelectState::default();
        for token in tokens {
            match token.strip_prefix('-') {
                Some(path) => self.exclude(path, &mut state)?,
                None => self.include(token.strip_prefix('+').unwrap_or(token), &mut state)?,
            }
        }

        let mut select = BTreeMap::new();
        for path in &state.included {
            select.insert(path.clone(), true);
        }
        let defaults = state.potential.iter().cloned().chain(self.tree.hidden_paths());
        for path in defaults {
            if !state.included.contains(&path) {
                select.insert(path, false);
            }
        }
        for path in &state.excluded {
            select.insert(path.clone(), false);
        }
        Ok(select)
    }

    fn include(&self, path: &str, state: &mut SelectState) -> FilterResult<()> {
        let nodes = self.resolve_chain(path)?;

        for node in &nodes {
            if state.excluded.contains(&node.path) {
                return Err(conflict(path));
            }
        }
        for node in &nodes {
            state.included.insert(node.path.clone());
        }

        // Siblings inside a namespace become default exclusions.
        if nodes.len() > 1 {
            let parent = nodes[nodes.len() - 2];
            let leaf = nodes[nodes.len() - 1];
            for sibling in parent.children.values() {
                if sibling.path != leaf.path {
                    state.potential.insert(sibling.path.clone());
                }
            }
        }
        Ok(())
    }

    fn exclude(&self, path: &str, state: &mut SelectState) -> FilterResult<()> {
        self.resolve_chain(path)?;

        let nested = format!("{}.", path);
        if state
            .included
            .iter()
            .any(|p| p == path || p.starts_with(&nested))
        {
            return Err(conflict(path));
        }
        state.excluded.insert(path.to_string());
        Ok(())
    }

    fn resolve_chain(&self, path: &str) -> FilterResult<Vec<&'a SelectNode>> {
        let segments = path.split('.').count();
        let nodes = self.tree.chain(path);
        if path.is_empty() || nodes.len() != segments {
            return Err(FilterError::parsing(format!("bad select filter: {}", path)));
        }
        Ok(nodes)
    }
}

fn conflict(path: &str) -> FilterError {
    FilterError::parsing(format!("conflicting select properties: {}", path))
}

/// Applies relation hints top-down, skipping excluded subtrees.
pub fn apply_hints<R: ResultSet>(tree: &SelectNode, plan: &SelectionPlan, rs: R) -> R {
    tree.children.values().fold(rs, |rs, node| {
        if !plan.is_included(&node.path) {
            return rs;
        }
        let rs = match &node.hint {
            Some(hint) => rs.optimize(hint),
            None => rs,
        };
        apply_hints(node, plan, rs)
    })
}
