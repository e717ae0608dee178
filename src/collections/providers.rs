//! Providers.

use crate::cmd::params::{Invocation, MetadataRegistry, MethodKey, ParamDecl};
use crate::collections::{Collections, Method, Outcome, Session, remote_context};
use crate::error::{CliError, Result};

const COLLECTION: &str = "providers";

#[derive(Default)]
pub struct Providers;

impl Providers {
    fn refresh(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let id = args
            .integer("prov_id")
            .ok_or_else(|| CliError::validation("Set a provider ID to be refreshed."))?
            .to_string();

        let provider = session
            .transport
            .get(COLLECTION, &id, &[])?
            .ok_or_else(|| CliError::not_found(format!("Provider with ID: {id} not found!")))?;
        crate::log_debug!("refreshing provider {} ({id})", provider.name());

        let task_id = session
            .transport
            .action(COLLECTION, &id, "refresh", None)
            .map_err(|e| {
                remote_context(
                    e,
                    &format!("Unable to create a task: refresh provider with ID: {id}"),
                )
            })?;
        crate::log_info!("Task to refresh provider with ID: {id} created: {task_id}");
        Ok(Outcome::Task {
            id: task_id,
            message: format!("Task to refresh provider with ID: {id} created"),
        })
    }
}

impl Collections for Providers {
    const NAME: &'static str = COLLECTION;
    const DOC: &'static str = "Providers collections.";
    const METHODS: &'static [Method<Self>] = &[
        Method::unsupported("query", "Query."),
        Method::unsupported("create", "Create."),
        Method::unsupported("edit", "Edit."),
        Method::own(
            "refresh",
            "Refresh provider.\n\n::\nReturns the id of the task created to refresh the provider.",
            Providers::refresh,
        ),
        Method::unsupported("delete", "Delete."),
    ];

    fn declare(meta: &mut MetadataRegistry) {
        meta.attach(
            MethodKey::new(COLLECTION, "refresh"),
            vec![
                ParamDecl::argument("prov_id")
                    .integer()
                    .metavar("PROV_ID")
                    .help("id of the provider"),
            ],
        );
    }
}
