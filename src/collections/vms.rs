//! Virtual machines.

use crate::api::{PredicateSet, QueryBuilder, Resource};
use crate::cmd::params::{Invocation, MetadataRegistry, MethodKey, ParamDecl};
use crate::collections::{Collections, Method, Outcome, Session, remote_context};
use crate::config::Settings;
use crate::error::{CliError, Result};

const COLLECTION: &str = "vms";

#[derive(Default)]
pub struct Vms;

/// Optional filters shared by `query` and `delete`.
#[derive(Debug)]
struct VmCriteria<'a> {
    name: Option<&'a str>,
    provider: Option<&'a str>,
    network: Option<&'a str>,
    tenant: Option<&'a str>,
    subnet: Option<&'a str>,
    vendor: Option<&'a str>,
    vtype: Option<&'a str>,
}

impl<'a> VmCriteria<'a> {
    fn from_args(args: &'a Invocation) -> Self {
        VmCriteria {
            name: args.text("vm_name"),
            provider: args.text("provider"),
            network: args.text("network"),
            tenant: args.text("tenant"),
            subnet: args.text("subnet"),
            vendor: args.text("vendor"),
            vtype: args.text("vtype"),
        }
    }

    fn predicates(&self, settings: &Settings) -> PredicateSet {
        QueryBuilder::new()
            .eq("name", self.name)
            .eq("ext_management_system.name", self.provider)
            .eq("cloud_networks.name", self.network)
            .eq("cloud_tenant.name", self.tenant)
            .eq("cloud_subnets.name", self.subnet)
            .eq_with("vendor", self.vendor, str::to_lowercase)
            .eq_with("type", self.vtype, |t| settings.vm_type(t))
            .build()
    }
}

impl Vms {
    fn by_id(&self, session: &Session<'_>, id: &str, attrs: &[String]) -> Result<Resource> {
        session
            .transport
            .get(COLLECTION, id, attrs)?
            .ok_or_else(|| {
                CliError::not_found(format!("Cannot find Vm with ID:{id} in {COLLECTION}"))
            })
    }

    fn find(
        &self,
        session: &Session<'_>,
        args: &Invocation,
        attrs: &[String],
    ) -> Result<Vec<Resource>> {
        let predicates = VmCriteria::from_args(args).predicates(session.settings);
        let vms = predicates.fetch(session.transport, COLLECTION, attrs)?;
        if vms.is_empty() {
            return Err(CliError::not_found("No Vm(s) found for given parameters"));
        }
        Ok(vms)
    }

    fn query(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let attrs = args.list("attr");
        let vms = if args.flag("by_id") {
            let id = args
                .text("vm_name")
                .ok_or_else(|| CliError::validation("No Vm ID given"))?;
            vec![self.by_id(session, id, &attrs)?]
        } else {
            self.find(session, args, &attrs)?
        };
        crate::log_debug!("{} vm(s) matched", vms.len());

        let columns = ["id", "name"]
            .into_iter()
            .map(str::to_string)
            .chain(attrs)
            .collect();
        Ok(Outcome::resources("Vms", columns, vms))
    }

    fn delete(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        let name = args
            .text("vm_name")
            .ok_or_else(|| CliError::validation("Set a vm to be deleted."))?;

        let vm = if args.flag("by_id") {
            self.by_id(session, name, &[])?
        } else {
            let mut vms = self.find(session, args, &[])?;
            if vms.len() > 1 {
                return Err(CliError::validation(
                    "Multiple vms found. Supply more options to narrow.",
                ));
            }
            vms.remove(0)
        };

        let task_id = session
            .transport
            .action(COLLECTION, &vm.id(), "delete", None)
            .map_err(|e| {
                remote_context(e, &format!("Unable to create a task: delete vm: {name}"))
            })?;
        crate::log_info!("Task to delete {name} created: {task_id}");
        Ok(Outcome::Task {
            id: task_id,
            message: format!("Task to delete {name} created"),
        })
    }
}

fn filters(noun: &str) -> Vec<ParamDecl> {
    vec![
        ParamDecl::argument("vm_name")
            .metavar("VM_NAME")
            .help("name of the vm (its ID with --by_id)"),
        ParamDecl::option("by_id")
            .boolean()
            .default_value("false")
            .help("name given as ID of vm"),
        ParamDecl::option("provider").help(&format!("provider of {noun}")),
        ParamDecl::option("network").help(&format!("cloud network of {noun}")),
        ParamDecl::option("tenant").help(&format!("cloud tenant of {noun}")),
        ParamDecl::option("subnet").help(&format!("cloud subnet of {noun}")),
        ParamDecl::option("vendor").help(&format!("vendor of {noun}")),
        ParamDecl::option("vtype").help(&format!(
            "type of {noun} - ex. \"Openstack\", \"Amazon\"..."
        )),
    ]
}

impl Collections for Vms {
    const NAME: &'static str = COLLECTION;
    const DOC: &'static str = "Virtual machines collections.";
    const METHODS: &'static [Method<Self>] = &[
        Method::own(
            "query",
            "Query vms.\n\n::\nAllows querying vms based on name, provider and attributes.\n\
             Zero filters list every vm, one filter uses a simple query, more\n\
             filters are AND-ed into a compound query.",
            Vms::query,
        ),
        Method::own(
            "delete",
            "Delete.\n\n::\nThe filters must narrow the match down to one vm.\n\
             Returns the id of the task that deletes it.",
            Vms::delete,
        ),
        Method::unsupported("edit", "Edit."),
        Method::unsupported("add_lifecycle_event", "Add lifecycle event."),
        Method::unsupported("add_event", "Add event."),
        Method::unsupported("refresh", "Refresh."),
        Method::unsupported("shutdown_guest", "Shutdown guest."),
        Method::unsupported("reboot_guest", "Reboot guest."),
        Method::unsupported("start", "Start."),
        Method::unsupported("stop", "Stop."),
        Method::unsupported("suspend", "Suspend."),
        Method::unsupported("shelve", "Shelve."),
        Method::unsupported("shelve_offload", "Shelve offload."),
        Method::unsupported("pause", "Pause."),
        Method::unsupported("request_console", "Request console."),
        Method::unsupported("reset", "Reset."),
        Method::unsupported("retire", "Retire."),
        Method::unsupported("set_owner", "Set owner."),
        Method::unsupported("set_ownership", "Set ownership."),
        Method::unsupported("scan", "Scan."),
        Method::unsupported("assign_tags", "Assign tags."),
        Method::unsupported("unassign_tags", "Unassign tags."),
    ];

    fn declare(meta: &mut MetadataRegistry) {
        let mut query = filters("vm(s)");
        query.push(
            ParamDecl::option("attr")
                .multiple()
                .metavar("ATTR")
                .help("attribute of a vm(s), repeatable"),
        );
        meta.attach(MethodKey::new(COLLECTION, "query"), query);
        meta.attach(MethodKey::new(COLLECTION, "delete"), filters("a vm"));
    }
}
