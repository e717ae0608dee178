//! Automation requests.

use crate::api::{Predicate, PredicateSet};
use crate::cmd::params::{Invocation, MetadataRegistry, MethodKey, ParamDecl};
use crate::collections::{Collections, Method, Outcome, Session, remote_context};
use crate::error::{CliError, Result};
use crate::utils::input::load_input_data;

const COLLECTION: &str = "automation_requests";

/// Request methods `create` knows how to build a payload for.
pub const SUPPORTED_METHODS: &[&str] = &["generic"];

const STATUS_COLUMNS: [&str; 4] = ["id", "request_state", "status", "message"];

#[derive(Default)]
pub struct AutomationRequests;

impl AutomationRequests {
    fn create(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let method = args
            .text("method")
            .ok_or_else(|| CliError::validation("Set an automation request method."))?;
        crate::log_info!("Attempt to create an automation request ({method})");

        // generic: the user's payload is sent as is
        let payload = load_input_data(args.text("payload"), args.text("payload_file"))
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let ids = session
            .transport
            .create(COLLECTION, payload)
            .map_err(|e| remote_context(e, "Unable to create automation request"))?;
        crate::log_info!("Automation request created: {}", ids.join(", "));
        Ok(Outcome::Created {
            ids,
            message: "Automation request created".to_string(),
        })
    }

    fn status(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let columns = STATUS_COLUMNS.iter().map(|c| c.to_string()).collect();
        match args.text("req_id") {
            Some(id) => {
                let requests = PredicateSet::from(vec![Predicate::eq("id", id)]).fetch(
                    session.transport,
                    COLLECTION,
                    &[],
                )?;
                if requests.is_empty() {
                    return Err(CliError::not_found(format!(
                        "Automation request id: {id} not found!"
                    )));
                }
                Ok(Outcome::resources("Automation request", columns, requests))
            }
            None => {
                let active = PredicateSet::from(vec![Predicate::ne("request_state", "finished")])
                    .fetch(session.transport, COLLECTION, &[])?;
                if active.is_empty() {
                    crate::log_warn!("No active automation requests at this time.");
                }
                Ok(Outcome::resources("Active automation requests", columns, active))
            }
        }
    }
}

impl Collections for AutomationRequests {
    const NAME: &'static str = COLLECTION;
    const DOC: &'static str = "Automation requests collections.";
    const METHODS: &'static [Method<Self>] = &[
        Method::own(
            "create",
            "Create an automation request.\n\n::\nSubmits the payload for the chosen request \
             method to the server and returns the new request id.",
            AutomationRequests::create,
        ),
        Method::unsupported("approve", "Approve."),
        Method::unsupported("deny", "Deny."),
        Method::own(
            "status",
            "Print the status for a automation request.\n\n::\nWithout an ID every request \
             that has not finished is listed.",
            AutomationRequests::status,
        ),
    ];

    fn declare(meta: &mut MetadataRegistry) {
        meta.attach(
            MethodKey::new(COLLECTION, "create"),
            vec![
                ParamDecl::option("method")
                    .choice(SUPPORTED_METHODS)
                    .required()
                    .help("automation request method."),
                ParamDecl::option("payload").help("automation request payload data."),
                ParamDecl::option("payload_file").metavar("PATH").help(
                    "filename containing JSON (or YAML) formatted payload data for \
                     automation request.",
                ),
            ],
        );
        meta.attach(
            MethodKey::new(COLLECTION, "status"),
            vec![ParamDecl::argument("req_id").metavar("ID")],
        );
    }
}
