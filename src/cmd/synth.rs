/*!
Command synthesis: one collection method → one runnable sub-command.

`synthesize` looks the method up on the instance, copies the parameter
declarations attached to the method's key (never a reference into the
registry), derives the help text from the method doc, and wraps the call in a
closure that forwards arguments to the instance unchanged.
*/

use std::fmt;
use std::rc::Rc;

use clap::{ArgMatches, Command};

use super::params::{Invocation, MetadataRegistry, MethodKey, ParameterSpec};
use crate::collections::{Collection, Outcome, Session};
use crate::error::{CliError, Result};

/// Line separating user help from internal parameter docs.
pub const HELP_DELIMITER: &str = "::";

/// User-facing part of a doc string: everything before the delimiter, trimmed.
pub fn split_help(doc: &str) -> String {
    doc.split(HELP_DELIMITER).next().unwrap_or_default().trim().to_string()
}

type Forward = Box<dyn Fn(&Session<'_>, &Invocation) -> Result<Outcome>>;

/// A synthesized sub-command. Owns its copy of the parameter declarations.
pub struct SubCommand {
    name: String,
    help: String,
    params: ParameterSpec,
    call: Forward,
}

impl SubCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn help(&self) -> &str {
        &self.help
    }

    #[cfg(test)]
    pub fn params(&self) -> &ParameterSpec {
        &self.params
    }

    #[cfg(test)]
    pub fn params_mut(&mut self) -> &mut ParameterSpec {
        &mut self.params
    }

    /// clap definition used for parsing and for help/usage text.
    pub fn command(&self) -> Command {
        self.params.iter().fold(
            Command::new(self.name.clone()).about(self.help.clone()),
            |cmd, decl| cmd.arg(decl.to_arg()),
        )
    }

    pub fn bind(&self, matches: &ArgMatches) -> Result<Invocation> {
        Invocation::bind(&self.params, matches)
    }

    pub fn call(&self, session: &Session<'_>, args: &Invocation) -> Result<Outcome> {
        (self.call)(session, args)
    }
}

impl fmt::Debug for SubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubCommand")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Build the sub-command `method_name` of `instance`.
pub fn synthesize(
    instance: &Rc<dyn Collection>,
    method_name: &str,
    metadata: &MetadataRegistry,
) -> Result<SubCommand> {
    let collection = instance.name();
    let info = instance
        .methods()
        .into_iter()
        .find(|m| m.name == method_name && m.is_command())
        .ok_or_else(|| {
            CliError::not_found(format!("No such command '{method_name}' in '{collection}'."))
        })?;

    let params = metadata.read(&MethodKey::new(collection, info.name)).clone();
    crate::log_trace!(
        "synthesized {collection} {}: params={:?}",
        info.name,
        params.names()
    );

    let target = Rc::clone(instance);
    let method = info.name;
    let call: Forward = Box::new(move |session: &Session<'_>, args: &Invocation| {
        target.invoke(method, session, args)
    });

    Ok(SubCommand {
        name: info.name.to_string(),
        help: split_help(info.doc),
        params,
        call,
    })
}
