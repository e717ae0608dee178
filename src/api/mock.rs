//! In-memory transport that records every call, for tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use super::{Predicate, PredicateSet, Resource, Transport};
use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchAll(String),
    FetchOne(String, Predicate),
    FetchMany(String, PredicateSet),
    Get(String, String),
    Action(String, String, String),
    Create(String, Value),
}

#[derive(Default)]
pub struct RecordingTransport {
    pub calls: RefCell<Vec<Call>>,
    /// Returned by every fetch.
    pub resources: Vec<Resource>,
    /// Make every call fail with this remote message.
    pub fail_with: Option<String>,
}

impl RecordingTransport {
    pub fn with_resources(resources: Vec<Value>) -> Self {
        RecordingTransport {
            resources: resources
                .into_iter()
                .filter_map(Resource::from_value)
                .collect(),
            ..Default::default()
        }
    }

    pub fn failing(msg: &str) -> Self {
        RecordingTransport {
            fail_with: Some(msg.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        match &self.fail_with {
            Some(msg) => Err(CliError::RemoteOperation(msg.clone())),
            None => Ok(()),
        }
    }
}

impl Transport for RecordingTransport {
    fn fetch_all(&self, collection: &str, _attributes: &[String]) -> Result<Vec<Resource>> {
        self.record(Call::FetchAll(collection.into()))?;
        Ok(self.resources.clone())
    }

    fn fetch_by_predicate(
        &self,
        collection: &str,
        predicate: &Predicate,
        _attributes: &[String],
    ) -> Result<Vec<Resource>> {
        self.record(Call::FetchOne(collection.into(), predicate.clone()))?;
        Ok(self.resources.clone())
    }

    fn fetch_by_predicates(
        &self,
        collection: &str,
        predicates: &PredicateSet,
        _attributes: &[String],
    ) -> Result<Vec<Resource>> {
        self.record(Call::FetchMany(collection.into(), predicates.clone()))?;
        Ok(self.resources.clone())
    }

    fn get(&self, collection: &str, id: &str, _attributes: &[String]) -> Result<Option<Resource>> {
        self.record(Call::Get(collection.into(), id.into()))?;
        Ok(self.resources.iter().find(|r| r.id() == id).cloned())
    }

    fn action(
        &self,
        collection: &str,
        id: &str,
        action: &str,
        _payload: Option<Value>,
    ) -> Result<String> {
        self.record(Call::Action(collection.into(), id.into(), action.into()))?;
        Ok(format!("task-{id}"))
    }

    fn create(&self, collection: &str, payload: Value) -> Result<Vec<String>> {
        self.record(Call::Create(collection.into(), payload))?;
        Ok(vec!["1000".to_string()])
    }
}

/// Lets a test keep a handle on the transport it gives away.
impl Transport for Rc<RecordingTransport> {
    fn fetch_all(&self, collection: &str, attributes: &[String]) -> Result<Vec<Resource>> {
        self.as_ref().fetch_all(collection, attributes)
    }

    fn fetch_by_predicate(
        &self,
        collection: &str,
        predicate: &Predicate,
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        self.as_ref().fetch_by_predicate(collection, predicate, attributes)
    }

    fn fetch_by_predicates(
        &self,
        collection: &str,
        predicates: &PredicateSet,
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        self.as_ref().fetch_by_predicates(collection, predicates, attributes)
    }

    fn get(&self, collection: &str, id: &str, attributes: &[String]) -> Result<Option<Resource>> {
        self.as_ref().get(collection, id, attributes)
    }

    fn action(
        &self,
        collection: &str,
        id: &str,
        action: &str,
        payload: Option<Value>,
    ) -> Result<String> {
        self.as_ref().action(collection, id, action, payload)
    }

    fn create(&self, collection: &str, payload: Value) -> Result<Vec<String>> {
        self.as_ref().create(collection, payload)
    }
}
