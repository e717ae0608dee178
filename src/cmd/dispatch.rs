/*!
Top-level dispatcher.

Parsing happens in two phases because the second command level only exists
once a collection has been resolved:

  1. root: global flags, `--version`, and one placeholder per collection that
     swallows everything after the collection name
  2. collection: the resolved collection's synthesized sub-commands, parsed
     from `<collection> <rest...>`

`--version` is checked right after phase 1, before any collection is
resolved. Nothing connects to the server until a sub-command has been
synthesized and its arguments bound.
*/

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, Args, Command, FromArgMatches};

use super::resolver::{Catalog, CollectionHandle};
use super::synth::SubCommand;
use crate::api::Transport;
use crate::collections::{Outcome, Session};
use crate::config::{Overrides, PACKAGE, Settings, VERSION};
use crate::error::{CliError, Result};
use crate::utils::{derive_level, init_logging};
use crate::version::{ReleaseIndex, VersionReport, classify};

pub const BIN_NAME: &str = "miqcli";

const REST: &str = "rest";

/// Flags accepted at every command level.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// API token (takes precedence over username/password)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,

    /// ManageIQ server URL
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Username for basic authentication
    #[arg(long, global = true, value_name = "USERNAME")]
    pub username: Option<String>,

    /// Password for basic authentication
    #[arg(long, global = true, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Verify the server's TLS certificate
    #[arg(long, global = true, overrides_with = "disable_ssl_verify")]
    pub enable_ssl_verify: bool,

    /// Skip TLS certificate verification
    #[arg(long, global = true, overrides_with = "enable_ssl_verify")]
    pub disable_ssl_verify: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Read settings from this file instead of searching for one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Fold in flags seen by a later parse phase; later values win.
    fn absorb(&mut self, later: GlobalArgs) {
        self.token = later.token.or(self.token.take());
        self.url = later.url.or(self.url.take());
        self.username = later.username.or(self.username.take());
        self.password = later.password.or(self.password.take());
        if later.enable_ssl_verify || later.disable_ssl_verify {
            self.enable_ssl_verify = later.enable_ssl_verify;
            self.disable_ssl_verify = later.disable_ssl_verify;
        }
        self.verbose = self.verbose.saturating_add(later.verbose);
        self.quiet |= later.quiet;
        self.json |= later.json;
        self.config = later.config.or(self.config.take());
    }

    pub fn overrides(&self) -> Overrides {
        let enable_ssl_verify = match (self.enable_ssl_verify, self.disable_ssl_verify) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            token: self.token.clone(),
            enable_ssl_verify,
        }
    }
}

#[derive(Debug)]
pub enum Output {
    Version(VersionReport),
    Outcome(Outcome),
}

#[derive(Debug)]
pub struct Dispatched {
    pub output: Output,
    pub json: bool,
}

/// Opens the transport once settings are known.
pub type Connector = Box<dyn Fn(&Settings) -> Result<Box<dyn Transport>>>;

pub struct Dispatcher {
    catalog: Catalog,
    index: Box<dyn ReleaseIndex>,
    connect: Connector,
}

impl Dispatcher {
    pub fn new(catalog: Catalog, index: Box<dyn ReleaseIndex>, connect: Connector) -> Self {
        Dispatcher {
            catalog,
            index,
            connect,
        }
    }

    fn root_command(&self) -> Command {
        // augment first: the derived impl sets its own about text
        let root = GlobalArgs::augment_args(Command::new(BIN_NAME))
            .about("ManageIQ command line interface.")
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .allow_external_subcommands(true)
            .arg_required_else_help(true)
            .arg(
                Arg::new("version")
                    .long("version")
                    .action(ArgAction::SetTrue)
                    .help("Show version and exit"),
            );
        crate::log_trace!(
            "collections: {}",
            self.catalog.list_collections().join(", ")
        );

        self.catalog
            .summaries()
            .into_iter()
            .fold(root, |root, (name, help)| {
                root.subcommand(
                    Command::new(name).about(help).disable_help_flag(true).arg(
                        Arg::new(REST)
                            .num_args(0..)
                            .trailing_var_arg(true)
                            .allow_hyphen_values(true),
                    ),
                )
            })
    }

    fn collection_command(&self, handle: &CollectionHandle) -> Result<(Command, Vec<SubCommand>)> {
        let commands = handle
            .sub_commands()
            .iter()
            .map(|method| handle.synthesize(method, self.catalog.metadata()))
            .collect::<Result<Vec<_>>>()?;

        let cmd = GlobalArgs::augment_args(Command::new(handle.name()))
            .bin_name(format!("{BIN_NAME} {}", handle.name()))
            .about(handle.help().to_string())
            .disable_help_subcommand(true)
            .allow_external_subcommands(true)
            .arg_required_else_help(true);
        let cmd = commands
            .iter()
            .fold(cmd, |cmd, sub| cmd.subcommand(sub.command()));
        Ok((cmd, commands))
    }

    fn check_version(&self) -> Result<VersionReport> {
        crate::log_debug!("looking up published releases of {PACKAGE}");
        let published = self.index.releases(PACKAGE)?;
        Ok(classify(VERSION, &published))
    }

    /// Parse `argv` (program name first) and run what it selects.
    pub fn run<I, T>(&mut self, argv: I) -> Result<Dispatched>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut root = self.root_command();
        let matches = root.try_get_matches_from_mut(argv)?;
        let mut globals = GlobalArgs::from_arg_matches(&matches)?;
        init_logging(derive_level(globals.verbose, globals.quiet));

        if matches.get_flag("version") {
            return Ok(Dispatched {
                output: Output::Version(self.check_version()?),
                json: globals.json,
            });
        }

        let Some((name, placeholder)) = matches.subcommand() else {
            return Err(root
                .error(ErrorKind::MissingSubcommand, "a collection is required")
                .into());
        };

        let handle = self.catalog.resolve(name)?;
        let rest: Vec<String> = placeholder
            .get_many::<String>(REST)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        crate::log_debug!("dispatching {name} {rest:?}");

        let (mut collection, commands) = self.collection_command(&handle)?;
        if commands.is_empty() {
            return Err(collection
                .error(
                    ErrorKind::MissingSubcommand,
                    format!("'{name}' has no sub-commands"),
                )
                .into());
        }

        let matches =
            collection.try_get_matches_from_mut(std::iter::once(name.to_string()).chain(rest))?;
        globals.absorb(GlobalArgs::from_arg_matches(&matches)?);
        init_logging(derive_level(globals.verbose, globals.quiet));

        let Some((method, sub_matches)) = matches.subcommand() else {
            return Err(collection
                .error(ErrorKind::MissingSubcommand, "a sub-command is required")
                .into());
        };
        let command = commands
            .iter()
            .find(|c| c.name() == method)
            .ok_or_else(|| CliError::not_found(format!("No such command '{method}' in '{name}'.")))?;
        let args = command.bind(sub_matches)?;

        let settings = Settings::load(&globals.overrides(), globals.config.as_deref())?;
        let transport = (self.connect)(&settings)?;
        let session = Session {
            transport: transport.as_ref(),
            settings: &settings,
        };

        let outcome = command.call(&session, &args)?;
        Ok(Dispatched {
            output: Output::Outcome(outcome),
            json: globals.json,
        })
    }
}
