use std::path::{Path, PathBuf};

use clap::{Arg, ArgMatches, Command, value_parser};

use super::{Environ, Plugin, PluginKind};
use crate::error::InvalidInput;

pub const KIND: PluginKind = PluginKind("path-supplier");

/// Supplies the path the run is restricted to (positional `path`, default: the working directory).
#[derive(Debug, Default)]
pub struct PathSupplier {
    path: Option<PathBuf>,
}

impl PathSupplier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for PathSupplier {
    fn kind(&self) -> PluginKind {
        KIND
    }

    fn setup_parser(&self, command: Command) -> Command {
        command.arg(
            Arg::new("path")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .default_value(".")
                .help("File or directory whose suites should run"),
        )
    }

    fn initialise(&mut self, args: &ArgMatches, _: &Environ) -> Result<bool, InvalidInput> {
        let requested = args
            .try_get_one::<PathBuf>("path")
            .ok()
            .flatten()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("."));
        let resolved = requested.canonicalize().map_err(|err| {
            InvalidInput::new(KIND, format!("path '{}' does not exist ({err})", requested.display()))
        })?;
        tracing::debug!(path = %resolved.display(), "object to run");
        self.path = Some(resolved);
        Ok(true)
    }

    fn get_object_to_run(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
