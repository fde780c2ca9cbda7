//! Suite registry: ordered `(name, case fn)` tables, one suite per probe
//! scenario. Each case sends its own HTTP traffic, checks status and body
//! shape, and may capture ids into the shared [`RunContext`] for later cases.

pub mod backend;
pub mod edge;
pub mod features;
pub mod profile;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::client::{ApiClient, CheckError};
use crate::runner::context::RunContext;

/// Pass verdict carrying the human-readable message and an optional
/// response snapshot for the result log.
pub struct CasePass {
    pub message: String,
    pub snapshot: Option<Value>,
}

impl CasePass {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Value) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}

/// A case either passes with a message or fails with a check error;
/// the executor converts errors into failure records and keeps going.
pub type CaseResult = Result<CasePass, CheckError>;

pub type CaseFuture<'a> = BoxFuture<'a, CaseResult>;

pub type CaseFn = for<'a> fn(&'a ApiClient, &'a mut RunContext) -> CaseFuture<'a>;

/// One registered test case
pub struct CaseDef {
    pub name: &'static str,
    pub run: CaseFn,
}

impl CaseDef {
    pub fn new(name: &'static str, run: CaseFn) -> Self {
        Self { name, run }
    }
}

/// An ordered group of cases sharing one run context
pub struct Suite {
    pub name: &'static str,
    pub title: &'static str,
    pub cases: Vec<CaseDef>,
}

/// All suites in their canonical run order
pub fn all() -> Vec<Suite> {
    vec![
        backend::suite(),
        edge::suite(),
        profile::suite(),
        features::suite(),
    ]
}

/// Resolve requested suite names; empty selection means everything.
pub fn select(names: &[String]) -> anyhow::Result<Vec<Suite>> {
    if names.is_empty() {
        return Ok(all());
    }

    let mut selected = Vec::new();
    for name in names {
        let found = all().into_iter().find(|s| s.name == name.to_lowercase());
        match found {
            Some(suite) => selected.push(suite),
            None => {
                anyhow::bail!(
                    "Suite '{}' not found. Available suites: {}",
                    name,
                    all()
                        .iter()
                        .map(|s| s.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_suites_nonempty() {
        for suite in all() {
            assert!(!suite.cases.is_empty(), "suite {} has no cases", suite.name);
        }
    }

    #[test]
    fn test_case_names_unique_within_suite() {
        for suite in all() {
            let mut names: Vec<_> = suite.cases.iter().map(|c| c.name).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), suite.cases.len(), "suite {}", suite.name);
        }
    }

    #[test]
    fn test_select_all_by_default() {
        assert_eq!(select(&[]).unwrap().len(), all().len());
    }

    #[test]
    fn test_select_unknown_suite() {
        assert!(select(&["nope".to_string()]).is_err());
    }

    #[test]
    fn test_select_by_name() {
        let suites = select(&["edge".to_string()]).unwrap();
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].name, "edge");
    }
}
