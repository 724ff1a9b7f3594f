//! Command-line parsing.

use std::path::PathBuf;

use clap::Parser;

use burrow_core::config::Config;
use burrow_types::error::Result;

/// A terminal Gopher and Gopher-over-TLS client.
#[derive(Debug, Parser)]
#[command(name = "burrow", version, about)]
pub struct Cli {
    /// gopher:// or gophers:// location to open at startup.
    pub uri: Option<String>,

    /// Command run with non-navigable item URIs.
    #[arg(short, long, value_name = "CMD")]
    pub plumber: Option<String>,

    /// Command receiving yanked URIs on stdin.
    #[arg(short, long, value_name = "CMD")]
    pub yanker: Option<String>,

    /// Detach the plumber instead of waiting for it.
    #[arg(short = 'P', long)]
    pub parallel_plumb: bool,

    /// Accept any TLS certificate.
    #[arg(long)]
    pub insecure: bool,

    /// Read configuration from FILE instead of the default location.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The effective configuration: the file (or defaults), with
    /// command-line flags layered on top. Also returns the start URI
    /// if one was given.
    pub fn into_config(self) -> Result<(Config, Option<String>)> {
        let mut config = Config::load(self.config.as_deref())?;
        let uri = self.apply(&mut config);
        Ok((config, uri))
    }

    fn apply(self, config: &mut Config) -> Option<String> {
        if let Some(plumber) = self.plumber {
            config.plumber = plumber;
        }
        if let Some(yanker) = self.yanker {
            config.yanker = yanker;
        }
        if self.parallel_plumb {
            config.parallel_plumb = true;
        }
        if self.insecure {
            config.tls_verify = false;
        }
        self.uri
    }
}

// ---- tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_parses() {
        let cli = Cli::try_parse_from(["burrow"]).unwrap();
        assert!(cli.uri.is_none());
        assert!(cli.plumber.is_none());
        assert!(!cli.parallel_plumb);
        assert!(!cli.insecure);
    }

    #[test]
    fn all_flags_parse() {
        let cli = Cli::try_parse_from([
            "burrow",
            "-p",
            "open",
            "-y",
            "wl-copy",
            "-P",
            "--insecure",
            "gophers://example.org",
        ])
        .unwrap();
        assert_eq!(cli.uri.as_deref(), Some("gophers://example.org"));
        assert_eq!(cli.plumber.as_deref(), Some("open"));
        assert_eq!(cli.yanker.as_deref(), Some("wl-copy"));
        assert!(cli.parallel_plumb);
        assert!(cli.insecure);
    }

    #[test]
    fn flags_override_the_configuration() {
        let cli = Cli::try_parse_from(["burrow", "-p", "open", "--insecure"]).unwrap();
        let mut config = Config::default();
        let uri = cli.apply(&mut config);
        assert!(uri.is_none());
        assert_eq!(config.plumber, "open");
        assert_eq!(config.yanker, "xclip");
        assert!(!config.tls_verify);
    }

    #[test]
    fn absent_flags_leave_the_configuration_alone() {
        let cli = Cli::try_parse_from(["burrow", "gopher://example.org"]).unwrap();
        let mut config = Config {
            plumber: "from-file".into(),
            ..Config::default()
        };
        let uri = cli.apply(&mut config);
        assert_eq!(uri.as_deref(), Some("gopher://example.org"));
        assert_eq!(config.plumber, "from-file");
        assert!(config.tls_verify);
    }
}
