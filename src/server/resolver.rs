//! Picks the directory to serve.

use log::debug;
use std::path::{Path, PathBuf};

use super::config::{Cli, ServerConfig};
use super::error::ServerError;

/// Directories looked up, in order, when no directory argument is given.
pub const DEFAULT_DIRS: [&str; 2] = ["public", "static"];

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    base: PathBuf,
}

impl Resolver {
    /// Resolves relative names against `base`. The default (empty) base means
    /// the process working directory, and names come back exactly as given.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve(&self, cli: &Cli) -> Result<ServerConfig, ServerError> {
        let directory = match cli.directory() {
            Some(dir) => self.explicit_dir(dir)?,
            None => self.default_dir().ok_or(ServerError::NoDefaultDirectory)?,
        };

        Ok(ServerConfig {
            directory,
            port: cli.port.clone(),
        })
    }

    /// First entry of `DEFAULT_DIRS` that is an existing directory.
    pub fn default_dir(&self) -> Option<PathBuf> {
        DEFAULT_DIRS
            .iter()
            .map(|name| self.base.join(name))
            .inspect(|path| debug!("Probing {:?}", path))
            .find(|path| path.is_dir())
    }

    fn explicit_dir(&self, dir: &Path) -> Result<PathBuf, ServerError> {
        let path = self.base.join(dir);
        match path.metadata() {
            Ok(meta) if meta.is_dir() => Ok(path),
            Ok(_) => Err(ServerError::NotADirectory(path)),
            Err(_) => Err(ServerError::DirectoryNotFound(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Scratch(PathBuf);

    impl Scratch {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "waiter-resolver-{}-{}",
                name,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&path);
            fs::create_dir_all(&path).unwrap();
            Scratch(path)
        }

        fn mkdir(&self, name: &str) -> &Self {
            fs::create_dir_all(self.0.join(name)).unwrap();
            self
        }
    }

    impl Drop for Scratch {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn cli(directory: Option<&str>) -> Cli {
        Cli {
            paths: directory.map(PathBuf::from).into_iter().collect(),
            port: "3000".to_string(),
        }
    }

    #[test]
    fn public_wins_over_static() {
        let scratch = Scratch::new("priority");
        scratch.mkdir("static").mkdir("public");

        let config = Resolver::new(&scratch.0).resolve(&cli(None)).unwrap();
        assert_eq!(config.directory, scratch.0.join("public"));
    }

    #[test]
    fn falls_back_to_static() {
        let scratch = Scratch::new("fallback");
        scratch.mkdir("static");

        let config = Resolver::new(&scratch.0).resolve(&cli(None)).unwrap();
        assert_eq!(config.directory, scratch.0.join("static"));
    }

    #[test]
    fn no_default_directory_is_an_error() {
        let scratch = Scratch::new("none");

        let err = Resolver::new(&scratch.0).resolve(&cli(None)).unwrap_err();
        assert!(matches!(err, ServerError::NoDefaultDirectory));
    }

    #[test]
    fn plain_file_named_public_is_skipped() {
        let scratch = Scratch::new("file-public");
        fs::write(scratch.0.join("public"), b"not a dir").unwrap();
        scratch.mkdir("static");

        let config = Resolver::new(&scratch.0).resolve(&cli(None)).unwrap();
        assert_eq!(config.directory, scratch.0.join("static"));
    }

    #[test]
    fn explicit_directory_wins() {
        let scratch = Scratch::new("explicit");
        scratch.mkdir("public").mkdir("static").mkdir("assets");

        let config = Resolver::new(&scratch.0)
            .resolve(&cli(Some("assets")))
            .unwrap();
        assert_eq!(config.directory, scratch.0.join("assets"));
        assert_eq!(config.port, "3000");
    }

    #[test]
    fn explicit_missing_directory_is_an_error() {
        let scratch = Scratch::new("missing");
        scratch.mkdir("public");

        let err = Resolver::new(&scratch.0)
            .resolve(&cli(Some("nope")))
            .unwrap_err();
        match err {
            ServerError::DirectoryNotFound(path) => assert_eq!(path, scratch.0.join("nope")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn explicit_file_is_not_a_directory() {
        let scratch = Scratch::new("explicit-file");
        fs::write(scratch.0.join("index.html"), b"<h1>hi</h1>").unwrap();

        let err = Resolver::new(&scratch.0)
            .resolve(&cli(Some("index.html")))
            .unwrap_err();
        assert!(matches!(err, ServerError::NotADirectory(_)));
    }

    #[test]
    fn default_base_returns_names_unchanged() {
        let resolver = Resolver::default();
        assert_eq!(resolver.base.join(DEFAULT_DIRS[0]), PathBuf::from("public"));
    }

    #[test]
    fn port_is_carried_through() {
        let scratch = Scratch::new("port");
        scratch.mkdir("public");

        let mut args = cli(None);
        args.port = "8080".to_string();
        let config = Resolver::new(&scratch.0).resolve(&args).unwrap();
        assert_eq!(config.port, "8080");
    }
}
