//! Transport collaborator.
//!
//! The core only talks to the remote management server through the
//! [`Transport`] trait. `rest::RestClient` is the production implementation;
//! tests use `mock::RecordingTransport`.

pub mod query;
pub mod rest;

#[cfg(test)]
pub mod mock;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;
pub use query::{Predicate, PredicateSet, QueryBuilder};

/// One remote resource as returned by the server (a flat JSON object).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Resource(pub Map<String, Value>);

impl Resource {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Resource(map)),
            _ => None,
        }
    }

    /// Attribute as display text; strings are unquoted, missing is empty.
    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    pub fn id(&self) -> String {
        self.text("id")
    }

    pub fn name(&self) -> String {
        self.text("name")
    }
}

/// Operations the core needs from the remote side.
///
/// All calls are blocking and at-most-once; failures surface as
/// `CliError::RemoteOperation`.
pub trait Transport {
    /// Every resource of `collection`, optionally with extra `attributes`.
    fn fetch_all(&self, collection: &str, attributes: &[String]) -> Result<Vec<Resource>>;

    /// Resources matching exactly one predicate.
    fn fetch_by_predicate(
        &self,
        collection: &str,
        predicate: &Predicate,
        attributes: &[String],
    ) -> Result<Vec<Resource>>;

    /// Resources matching all predicates of a compound query.
    fn fetch_by_predicates(
        &self,
        collection: &str,
        predicates: &PredicateSet,
        attributes: &[String],
    ) -> Result<Vec<Resource>>;

    /// A single resource by id; `Ok(None)` when the server does not know it.
    fn get(&self, collection: &str, id: &str, attributes: &[String]) -> Result<Option<Resource>>;

    /// Run a resource action (refresh, delete, ...) and return the task id.
    fn action(&self, collection: &str, id: &str, action: &str, payload: Option<Value>)
    -> Result<String>;

    /// Run a collection-level create and return the ids of the new resources.
    fn create(&self, collection: &str, payload: Value) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_text_accessors() {
        let r = Resource::from_value(json!({"id": 42, "name": "vm1", "vendor": null})).unwrap();
        assert_eq!(r.id(), "42");
        assert_eq!(r.name(), "vm1");
        assert_eq!(r.text("vendor"), "");
        assert_eq!(r.text("missing"), "");
        assert!(Resource::from_value(json!([1])).is_none());
    }
}
