//! Filter predicates and query-strategy selection.
//!
//! A [`QueryBuilder`] turns optional criteria into an ordered, AND-ed
//! [`PredicateSet`]. The set then picks one of three remote calls:
//!
//! | predicates | strategy                 | transport call          |
//! |------------|--------------------------|-------------------------|
//! | 0          | [`QueryStrategy::Unfiltered`] | `fetch_all`        |
//! | 1          | [`QueryStrategy::Single`]     | `fetch_by_predicate` |
//! | 2+         | [`QueryStrategy::Compound`]   | `fetch_by_predicates` |
//!
//! The single and compound paths are distinct server calls and must not be
//! merged.

use std::fmt;

use serde::Serialize;

use super::{Resource, Transport};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
        }
    }
}

/// One `(field, operator, value)` filter condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    pub field: String,
    pub op: Operator,
    pub value: String,
}

impl Predicate {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<String>) -> Self {
        Predicate {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Ne, value)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.op.as_str(), self.value)
    }
}

/// Ordered predicates, implicitly AND-ed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PredicateSet(Vec<Predicate>);

/// Which remote call a [`PredicateSet`] maps to.
#[derive(Debug, PartialEq, Eq)]
pub enum QueryStrategy<'a> {
    Unfiltered,
    Single(&'a Predicate),
    Compound(&'a PredicateSet),
}

impl PredicateSet {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.0.iter()
    }

    pub fn strategy(&self) -> QueryStrategy<'_> {
        match self.0.as_slice() {
            [] => QueryStrategy::Unfiltered,
            [only] => QueryStrategy::Single(only),
            _ => QueryStrategy::Compound(self),
        }
    }

    /// Run the query against `transport` using the selected strategy.
    pub fn fetch(
        &self,
        transport: &dyn Transport,
        collection: &str,
        attributes: &[String],
    ) -> Result<Vec<Resource>> {
        match self.strategy() {
            QueryStrategy::Unfiltered => {
                crate::log_debug!("{collection}: unfiltered fetch");
                transport.fetch_all(collection, attributes)
            }
            QueryStrategy::Single(p) => {
                crate::log_debug!("{collection}: single-predicate fetch ({p})");
                transport.fetch_by_predicate(collection, p, attributes)
            }
            QueryStrategy::Compound(set) => {
                crate::log_debug!("{collection}: compound fetch ({set})");
                transport.fetch_by_predicates(collection, set, attributes)
            }
        }
    }
}

impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl From<Vec<Predicate>> for PredicateSet {
    fn from(v: Vec<Predicate>) -> Self {
        PredicateSet(v)
    }
}

/// Collects equality predicates from optional criteria, skipping empty ones.
#[derive(Debug, Default)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `field = value` when `value` is present and non-blank.
    pub fn eq(self, field: &str, value: Option<&str>) -> Self {
        self.eq_with(field, value, str::to_string)
    }

    /// Like [`QueryBuilder::eq`] but passes the value through `transform`
    /// first (lower-casing a vendor, expanding a type template, ...).
    pub fn eq_with(
        mut self,
        field: &str,
        value: Option<&str>,
        transform: impl FnOnce(&str) -> String,
    ) -> Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::eq(field, transform(v)));
        }
        self
    }

    pub fn build(self) -> PredicateSet {
        PredicateSet(self.predicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_criteria_is_unfiltered() {
        let set = QueryBuilder::new().eq("name", None).eq("vendor", Some("  ")).build();
        assert!(set.is_empty());
        assert_eq!(set.strategy(), QueryStrategy::Unfiltered);
    }

    #[test]
    fn one_criterion_uses_single_path() {
        let set = QueryBuilder::new().eq("name", Some("vm1")).build();
        assert_eq!(
            set.strategy(),
            QueryStrategy::Single(&Predicate::eq("name", "vm1"))
        );
    }

    #[test]
    fn several_criteria_keep_input_order() {
        let set = QueryBuilder::new()
            .eq("name", Some("vm1"))
            .eq("ext_management_system.name", Some("osp"))
            .build();
        assert!(matches!(set.strategy(), QueryStrategy::Compound(_)));
        let fields: Vec<&str> = set.iter().map(|p| p.field.as_str()).collect();
        assert_eq!(fields, ["name", "ext_management_system.name"]);
        assert_eq!(set.to_string(), "name=vm1 & ext_management_system.name=osp");
    }

    #[test]
    fn transform_applies_only_to_its_criterion() {
        let set = QueryBuilder::new()
            .eq("name", Some("MyVM"))
            .eq_with("vendor", Some("OpenStack"), str::to_lowercase)
            .build();
        let values: Vec<&str> = set.iter().map(|p| p.value.as_str()).collect();
        assert_eq!(values, ["MyVM", "openstack"]);
    }

    #[test]
    fn operator_rendering() {
        assert_eq!(
            Predicate::ne("request_state", "finished").to_string(),
            "request_state!=finished"
        );
    }
}
