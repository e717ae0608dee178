/*!
Resource collections.

Each collection is a type implementing [`Collections`]: a name, a class-level
doc string and a static method table. The blanket [`Collection`] impl turns
that table into the object-safe capability the command layer works with:

  - `methods()`  : what the introspector enumerates
  - `invoke()`   : forward a call to the method's handler

Doc strings follow one convention: text before a `::` line is user-facing
help, text after it is internal parameter documentation.

Parameter declarations are not stored on the method table; each collection
attaches them to the process-wide `MetadataRegistry` in `declare()`, which
the catalog runs once, the first time the collection is resolved.
*/

pub mod automation_requests;
pub mod providers;
pub mod vms;

use serde::Serialize;

use crate::api::{Resource, Transport};
use crate::cmd::introspect::{MethodInfo, Origin};
use crate::cmd::params::{Invocation, MetadataRegistry};
use crate::cmd::resolver::{Catalog, CollectionEntry};
use crate::config::Settings;
use crate::error::{CliError, Result};

/// What a handler gets to work with besides its arguments.
pub struct Session<'a> {
    pub transport: &'a dyn Transport,
    pub settings: &'a Settings,
}

/// Result of a sub-command, rendered by `cmd::render`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Resources {
        title: String,
        columns: Vec<String>,
        items: Vec<Resource>,
    },
    Task {
        id: String,
        message: String,
    },
    Created {
        ids: Vec<String>,
        message: String,
    },
}

impl Outcome {
    pub fn resources(title: &str, columns: Vec<String>, items: Vec<Resource>) -> Self {
        Outcome::Resources {
            title: title.to_string(),
            columns,
            items,
        }
    }
}

pub type Handler<C> = fn(&C, &Session<'_>, &Invocation) -> Result<Outcome>;

/// One entry of a collection's method table.
pub struct Method<C> {
    pub name: &'static str,
    pub doc: &'static str,
    pub origin: Origin,
    /// `None` for declared operations this client does not implement.
    pub handler: Option<Handler<C>>,
}

impl<C> Method<C> {
    pub const fn own(name: &'static str, doc: &'static str, handler: Handler<C>) -> Self {
        Method {
            name,
            doc,
            origin: Origin::Own,
            handler: Some(handler),
        }
    }

    pub const fn unsupported(name: &'static str, doc: &'static str) -> Self {
        Method {
            name,
            doc,
            origin: Origin::Own,
            handler: None,
        }
    }
}

/// Object-safe capability used by the command layer.
pub trait Collection {
    fn name(&self) -> &'static str;
    fn doc(&self) -> &'static str;
    fn methods(&self) -> Vec<MethodInfo>;
    fn invoke(&self, method: &str, session: &Session<'_>, args: &Invocation) -> Result<Outcome>;
}

/// Static description of a collection type.
pub trait Collections: Default + 'static {
    const NAME: &'static str;
    const DOC: &'static str;
    const METHODS: &'static [Method<Self>];

    /// Attach parameter declarations for this collection's methods.
    fn declare(meta: &mut MetadataRegistry);
}

impl<T: Collections> Collection for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn doc(&self) -> &'static str {
        T::DOC
    }

    fn methods(&self) -> Vec<MethodInfo> {
        T::METHODS
            .iter()
            .map(|m| MethodInfo {
                name: m.name,
                doc: m.doc,
                origin: m.origin,
            })
            .collect()
    }

    fn invoke(&self, method: &str, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let entry = T::METHODS
            .iter()
            .find(|m| m.name == method)
            .ok_or_else(|| {
                CliError::not_found(format!("No such command '{method}' in '{}'.", T::NAME))
            })?;
        match entry.handler {
            Some(handler) => handler(self, session, args),
            None => Err(CliError::Unsupported(format!("{} {}", T::NAME, method))),
        }
    }
}

/// Prefix a remote failure with what was being attempted; other kinds pass through.
pub fn remote_context(err: CliError, what: &str) -> CliError {
    match err {
        CliError::RemoteOperation(msg) => CliError::RemoteOperation(format!("{what}: {msg}")),
        other => other,
    }
}

/// Register every collection compiled into this binary.
pub fn register_builtin(catalog: &mut Catalog) {
    let entries = [
        CollectionEntry::of::<automation_requests::AutomationRequests>(),
        CollectionEntry::of::<providers::Providers>(),
        CollectionEntry::of::<vms::Vms>(),
    ];
    for entry in entries {
        let name = entry.name;
        if let Err(e) = catalog.register(entry) {
            crate::log_warn!("skipping collection '{name}': {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::RecordingTransport;
    use crate::config::{FileConfig, Overrides};

    #[test]
    fn builtin_catalog_lists_all_collections() {
        let mut catalog = Catalog::new();
        register_builtin(&mut catalog);
        assert_eq!(
            catalog.list_collections(),
            ["automation_requests", "providers", "vms"]
        );
    }

    #[test]
    fn unsupported_method_reports_its_name() {
        let settings = Settings::resolve(FileConfig::default(), &Overrides::default()).unwrap();
        let transport = RecordingTransport::default();
        let session = Session {
            transport: &transport,
            settings: &settings,
        };
        let err = vms::Vms::default()
            .invoke("stop", &session, &Invocation::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "'vms stop' is not implemented yet");
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn remote_context_only_wraps_remote_errors() {
        let e = remote_context(CliError::RemoteOperation("boom".into()), "refresh provider 3");
        assert_eq!(e.to_string(), "refresh provider 3: boom");
        let e = remote_context(CliError::not_found("gone"), "refresh provider 3");
        assert_eq!(e.to_string(), "gone");
    }
}
