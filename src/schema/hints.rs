//! Backing-store optimization hints
//!
//! A hint tells the result-set adapter which relations to fetch eagerly
//! when a selection subtree is kept. Hints declared under another hinted
//! namespace are re-parented at compile time, so every hint can be applied
//! against the root result set on its own.

use serde::{Deserialize, Serialize};

/// Hint as written in a declaration: `{"select_related": ["author"]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum HintDecl {
    SelectRelated(Vec<String>),
    PrefetchRelated(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    /// Single-valued relation, joined into the main fetch
    SelectRelated,
    /// Multi-valued relation, fetched separately
    PrefetchRelated,
}

impl HintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintKind::SelectRelated => "select_related",
            HintKind::PrefetchRelated => "prefetch_related",
        }
    }
}

/// Compiled hint attached to a selection node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryHint {
    pub kind: HintKind,
    relations: Vec<String>,
    /// Relation path of the enclosing hint, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
}

impl QueryHint {
    pub fn new(kind: HintKind, relations: Vec<String>) -> Self {
        Self {
            kind,
            relations,
            parent: None,
        }
    }

    pub fn from_decl(decl: &HintDecl) -> Self {
        match decl {
            HintDecl::SelectRelated(r) => Self::new(HintKind::SelectRelated, r.clone()),
            HintDecl::PrefetchRelated(r) => Self::new(HintKind::PrefetchRelated, r.clone()),
        }
    }

    /// Re-parents this hint under `parent`.
    ///
    /// Relations become relative to the deepest relation of the parent, so
    /// `prefetch_related(["books"])` under `select_related(["author"])`
    /// resolves to `author.books`.
    pub fn rebuild(&self, parent: Option<&QueryHint>) -> QueryHint {
        let prefix = match parent.and_then(|p| p.relations.last()) {
            Some(prefix) => prefix.clone(),
            None => return self.clone(),
        };

        QueryHint {
            kind: self.kind,
            relations: self
                .relations
                .iter()
                .map(|r| format!("{}.{}", prefix, r))
                .collect(),
            parent: Some(prefix),
        }
    }

    /// Relation paths, already resolved against the root
    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_format() {
        let decl: HintDecl = serde_json::from_str(r#"{"prefetch_related": ["books"]}"#).unwrap();
        assert_eq!(decl, HintDecl::PrefetchRelated(vec!["books".into()]));

        let bad: Result<HintDecl, _> = serde_json::from_str(r#"{"annotate": ["x"]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_rebuild_prefixes_parent() {
        let parent = QueryHint::new(HintKind::SelectRelated, vec!["author".into()]);
        let child = QueryHint::new(HintKind::PrefetchRelated, vec!["books".into()]);

        let rebuilt = child.rebuild(Some(&parent));
        assert_eq!(rebuilt.relations(), &["author.books".to_string()]);
        assert_eq!(rebuilt.parent(), Some("author"));
        assert_eq!(rebuilt.kind, HintKind::PrefetchRelated);
    }

    #[test]
    fn test_rebuild_without_parent() {
        let hint = QueryHint::new(HintKind::SelectRelated, vec!["author".into()]);
        assert_eq!(hint.rebuild(None), hint);
    }
}
