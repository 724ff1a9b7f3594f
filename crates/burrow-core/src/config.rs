//! Runtime configuration, loaded from a TOML file.
//!
//! Every field has a default, so an empty (or absent) file yields a
//! usable configuration. Command-line flags override the file in the
//! application crate.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use burrow_types::error::{BurrowError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Command handed non-navigable item URIs, run via `sh -c`.
    #[serde(default = "default_plumber")]
    pub plumber: String,

    /// Command that receives yanked URIs on stdin.
    #[serde(default = "default_yanker")]
    pub yanker: String,

    /// Run the plumber detached instead of in the foreground.
    #[serde(default)]
    pub parallel_plumb: bool,

    /// Try TLS first when connecting to a new server.
    #[serde(default)]
    pub auto_tls: bool,

    /// Verify server certificates against the webpki roots.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Compile in-page search patterns case-insensitively.
    #[serde(default = "default_true")]
    pub search_ignore_case: bool,

    /// Color `#`-prefixed info lines like Markdown headers.
    #[serde(default)]
    pub markdown_headers: bool,

    /// Location to open when none is given on the command line.
    #[serde(default = "default_start_uri")]
    pub start_uri: String,

    /// How long confirmation prompts wait before giving up.
    #[serde(default = "default_timeout_secs")]
    pub prompt_timeout_secs: u64,

    /// TCP connect and read timeout.
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_plumber() -> String {
    "xdg-open".into()
}

fn default_yanker() -> String {
    "xclip".into()
}

fn default_true() -> bool {
    true
}

fn default_start_uri() -> String {
    "gopher://gopher.floodgap.com".into()
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plumber: default_plumber(),
            yanker: default_yanker(),
            parallel_plumb: false,
            auto_tls: false,
            tls_verify: default_true(),
            search_ignore_case: default_true(),
            markdown_headers: false,
            start_uri: default_start_uri(),
            prompt_timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from `path` if given, otherwise from the default location.
    /// A missing default file is not an error; a missing explicit path is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_path(path),
            None => match default_path() {
                Some(path) if path.exists() => Self::load_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| BurrowError::Config(format!("{}: {err}", path.display())))?;
        Ok(toml::from_str(&text)?)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_secs(self.prompt_timeout_secs)
    }
}

/// `$XDG_CONFIG_HOME/burrow/config.toml`, falling back to `~/.config`.
fn default_path() -> Option<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir).join("burrow/config.toml"));
        }
    }
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".config/burrow/config.toml"))
}

// ---- tests ----
