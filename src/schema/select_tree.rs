//! Selection tree
//!
//! Mirrors the nesting of the declaration: one node per namespace or
//! filter segment. Built once by the compiler, read-only afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

use super::hints::QueryHint;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectNode {
    /// Full dotted path, empty for the root
    pub path: String,
    pub hidden: bool,
    /// Groups nested filters instead of terminating on an attribute
    pub namespace: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<QueryHint>,
    pub children: BTreeMap<String, SelectNode>,
}

impl SelectNode {
    pub fn root() -> Self {
        Self {
            namespace: true,
            ..Self::default()
        }
    }

    pub fn child(&self, segment: &str) -> Option<&SelectNode> {
        self.children.get(segment)
    }

    /// Inserts or returns the child for `segment`.
    pub(crate) fn child_mut(&mut self, segment: &str) -> &mut SelectNode {
        let path = if self.path.is_empty() {
            segment.to_string()
        } else {
            format!("{}.{}", self.path, segment)
        };
        self.children
            .entry(segment.to_string())
            .or_insert_with(|| SelectNode {
                path,
                ..SelectNode::default()
            })
    }

    /// Resolves a dotted path to its node.
    pub fn get(&self, path: &str) -> Option<&SelectNode> {
        path.split('.')
            .try_fold(self, |node, segment| node.child(segment))
    }

    /// Resolves every prefix of a dotted path, stopping at the first
    /// missing segment.
    pub fn chain<'a>(&'a self, path: &str) -> Vec<&'a SelectNode> {
        let mut nodes = Vec::new();
        let mut node = self;
        for segment in path.split('.') {
            match node.child(segment) {
                Some(next) => {
                    nodes.push(next);
                    node = next;
                }
                None => break,
            }
        }
        nodes
    }

    /// Paths hidden by default, including hidden nodes nested under a
    /// hidden ancestor.
    pub fn hidden_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_hidden(&mut out);
        out
    }

    fn collect_hidden(&self, out: &mut Vec<String>) {
        for node in self.children.values() {
            if node.hidden {
                out.push(node.path.clone());
            }
            node.collect_hidden(out);
        }
    }
}
