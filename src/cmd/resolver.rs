/*!
Collection resolver.

The catalog is the compiled registry of collection constructors, keyed by
command name. It answers the two questions the dispatcher asks:

  - `list_collections()` : which top-level commands exist, sorted
  - `resolve(name)`      : a fresh instance of one collection plus its help

A collection's parameter declarations are attached to the shared
[`MetadataRegistry`] the first time that collection is resolved, so asking for
an unknown name never touches any other collection.
*/

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use super::introspect::list_methods;
use super::params::MetadataRegistry;
use super::synth::{SubCommand, split_help, synthesize};
use crate::collections::{Collection, Collections};
use crate::error::{CliError, Result};

/// Registration record for one collection type.
#[derive(Clone, Copy)]
pub struct CollectionEntry {
    pub name: &'static str,
    pub doc: &'static str,
    construct: fn() -> Rc<dyn Collection>,
    declare: fn(&mut MetadataRegistry),
}

impl CollectionEntry {
    pub fn of<T: Collections>() -> Self {
        CollectionEntry {
            name: T::NAME,
            doc: T::DOC,
            construct: || -> Rc<dyn Collection> { Rc::new(T::default()) },
            declare: T::declare,
        }
    }
}

/// A resolved collection: one instance and the help text of its type.
/// Built fresh on every resolve, never cached.
pub struct CollectionHandle {
    instance: Rc<dyn Collection>,
    help: String,
}

impl CollectionHandle {
    pub fn name(&self) -> &'static str {
        self.instance.name()
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn sub_commands(&self) -> Vec<String> {
        list_methods(self.instance.as_ref())
    }

    pub fn synthesize(&self, method: &str, metadata: &MetadataRegistry) -> Result<SubCommand> {
        synthesize(&self.instance, method, metadata)
    }
}

#[derive(Default)]
pub struct Catalog {
    entries: BTreeMap<&'static str, CollectionEntry>,
    metadata: MetadataRegistry,
    declared: BTreeSet<&'static str>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every collection compiled into the binary.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        crate::collections::register_builtin(&mut catalog);
        catalog
    }

    pub fn register(&mut self, entry: CollectionEntry) -> Result<()> {
        if entry.name.trim().is_empty() {
            return Err(CliError::Discovery("collection with an empty name".into()));
        }
        if self.entries.contains_key(entry.name) {
            return Err(CliError::Discovery(format!(
                "collection '{}' registered twice",
                entry.name
            )));
        }
        crate::log_trace!("registered collection {}", entry.name);
        self.entries.insert(entry.name, entry);
        Ok(())
    }

    /// Top-level command names in sorted order. Names with a leading
    /// underscore are internal and never listed.
    pub fn list_collections(&self) -> Vec<String> {
        self.entries
            .keys()
            .filter(|name| !name.starts_with('_'))
            .map(|name| name.to_string())
            .collect()
    }

    /// `(name, help)` of every listed collection, for the root help screen.
    pub fn summaries(&self) -> Vec<(&'static str, String)> {
        self.entries
            .values()
            .filter(|e| !e.name.starts_with('_'))
            .map(|e| (e.name, split_help(e.doc)))
            .collect()
    }

    pub fn resolve(&mut self, name: &str) -> Result<CollectionHandle> {
        let entry = self
            .entries
            .get(name)
            .filter(|e| !e.name.starts_with('_'))
            .copied()
            .ok_or_else(|| CliError::not_found(format!("No such command '{name}'.")))?;

        if self.declared.insert(entry.name) {
            crate::log_debug!("loading parameter declarations for {}", entry.name);
            (entry.declare)(&mut self.metadata);
        }

        let instance = (entry.construct)();
        let help = split_help(instance.doc());
        Ok(CollectionHandle { instance, help })
    }

    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    /// Collections whose declarations have been loaded so far.
    #[cfg(test)]
    pub fn declared(&self) -> Vec<&'static str> {
        self.declared.iter().copied().collect()
    }
}
