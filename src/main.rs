mod utils;

mod api;
mod cmd;
mod collections;
mod config;
mod error;
mod version;

use api::Transport;
use api::rest::RestClient;
use cmd::dispatch::Connector;
use cmd::format::StyleOptions;
use cmd::render::render;
use cmd::{Catalog, Dispatcher};
use config::Settings;
use error::CliError;
use version::CratesIoIndex;

/// miqcli - ManageIQ command line interface
///
///   miqcli [GLOBAL FLAGS] <collection> <sub-command> [ARGS...]
///   miqcli --version
///
/// Collections and their sub-commands are listed by `miqcli --help` and
/// `miqcli <collection> --help`.
fn main() {
    let connect: Connector = Box::new(|settings: &Settings| {
        Ok(Box::new(RestClient::connect(settings)?) as Box<dyn Transport>)
    });
    let mut dispatcher = Dispatcher::new(
        Catalog::builtin(),
        Box::new(CratesIoIndex::new()),
        connect,
    );

    match dispatcher.run(std::env::args_os()) {
        Ok(result) => match render(&result, &StyleOptions::detect()) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                log_error!("failed to render output: {e}");
                std::process::exit(1);
            }
        },
        // clap prints help/usage itself and picks the exit code
        Err(CliError::Usage(e)) => e.exit(),
        Err(e) => {
            log_error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
