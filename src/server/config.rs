use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: &str = "3000";

const ABOUT: &str = "Waiter is a static website server to quickly prototype static sites.";

const AFTER_HELP: &str = "When run with no arguments, Waiter looks for a './public' directory and then, \
if './public' does not exist, a './static' directory, and serves its contents on port 3000.

The first argument passed to Waiter tells Waiter which directory to serve; any further \
arguments are ignored. Use the '--port' or '-p' option to choose which port to serve the \
directory on.";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "waiter", version, about = ABOUT, after_help = AFTER_HELP)]
pub struct Cli {
    /// Directory to serve (defaults to ./public, then ./static)
    #[arg(value_name = "DIRECTORY")]
    pub paths: Vec<PathBuf>,

    /// The port to serve on
    #[arg(short, long, default_value = DEFAULT_PORT)]
    pub port: String,
}

impl Cli {
    /// Parses command-line arguments without exiting the process.
    ///
    /// Help and version requests come back as a `clap::Error` whose kind is
    /// `DisplayHelp` / `DisplayVersion`; `clap::Error::exit` prints them to
    /// stdout and exits with status 0.
    pub fn parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args)
    }

    /// The first positional argument, if any.
    pub fn directory(&self) -> Option<&Path> {
        self.paths.first().map(PathBuf::as_path)
    }
}

/// Validated settings handed to the HTTP server once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub directory: PathBuf,
    pub port: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
