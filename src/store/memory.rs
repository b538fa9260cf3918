use std::collections::HashSet;

use serde_json::Value;

use crate::filter::Predicate;
use crate::schema::QueryHint;

use super::matcher::PredicateMatcher;
use super::sorter::{ResultSorter, SortSpec};
use super::ResultSet;

/// In-memory result set over JSON documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryResultSet {
    documents: Vec<Value>,
    hints: Vec<QueryHint>,
}

impl MemoryResultSet {
    pub fn new(documents: Vec<Value>) -> Self {
        Self {
            documents,
            hints: Vec::new(),
        }
    }

    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<Value> {
        self.documents
    }

    /// Hints received through [`ResultSet::optimize`], in order
    pub fn applied_hints(&self) -> &[QueryHint] {
        &self.hints
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl ResultSet for MemoryResultSet {
    fn filter(mut self, predicate: &Predicate) -> Self {
        if predicate.is_neutral() {
            return self;
        }
        let mut matcher = PredicateMatcher::new();
        self.documents.retain(|doc| matcher.matches(doc, predicate));
        self
    }

    fn distinct(mut self) -> Self {
        let mut seen = HashSet::new();
        self.documents.retain(|doc| seen.insert(doc.to_string()));
        self
    }

    fn order_by(mut self, keys: &[SortSpec]) -> Self {
        ResultSorter::sort(&mut self.documents, keys);
        self
    }

    fn optimize(mut self, hint: &QueryHint) -> Self {
        self.hints.push(hint.clone());
        self
    }

    fn paginate(mut self, offset: u64, limit: Option<u64>) -> Self {
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        self.documents = self
            .documents
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();
        self
    }
}
