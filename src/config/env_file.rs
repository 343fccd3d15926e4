//! .env file writing and parsing.
//!
//! Each provisioned service reads its runtime settings from a plain
//! `KEY=value` file in its checkout. [`EnvFile`] renders those files in a
//! stable key order and writes them with permissions matching their
//! contents; [`EnvFileParser`] reads them back.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SwarmError};

/// An ordered set of environment variables destined for a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFile {
    vars: Vec<(String, String)>,
    secret: bool,
}

impl EnvFile {
    /// Create an empty env file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variable. A later value for the same key replaces the earlier one.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.vars.push((key, value)),
        }
        self
    }

    /// Append a variable holding a credential; the file is written owner-only.
    pub fn set_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secret = true;
        self.set(key, value)
    }

    /// Whether the file holds a credential.
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over variables in insertion order.
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `KEY=value` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.vars {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Write to `path`: mode 0600 when secret, 0644 otherwise.
    ///
    /// An existing file is truncated and its mode reset.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mode = if self.secret { 0o600 } else { 0o644 };
        write_with_mode(path, self.render().as_bytes(), mode)
    }
}

/// Write `contents` to `path` with Unix permission bits `mode`.
pub fn write_with_mode(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let mut file = open_with_mode(path, mode)?;
    file.write_all(contents).map_err(|e| config_write_error(path, e))
}

/// Open `path` truncated, with permissions already set to `mode`.
///
/// `mode` only applies on create, so pre-existing files are tightened
/// here, before anything is written to them.
fn open_with_mode(path: &Path, mode: u32) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let file = options.open(path).map_err(|e| config_write_error(path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| config_write_error(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(file)
}

fn config_write_error(path: &Path, e: std::io::Error) -> SwarmError {
    SwarmError::ConfigWriteFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Parses .env files into a map of environment variables.
///
/// # Supported Formats
///
/// - Simple: `KEY=value`
/// - Quoted: `KEY="value with spaces"` or `KEY='single quoted'`
/// - Empty: `KEY=`
/// - Comments: `# This is a comment`
///
/// # Example
///
/// ```
/// use reposwarm::config::EnvFileParser;
///
/// let vars = EnvFileParser::parse("PORT=3000\nAUTH_MODE=\"local\"\n");
/// assert_eq!(vars.get("PORT"), Some(&"3000".to_string()));
/// assert_eq!(vars.get("AUTH_MODE"), Some(&"local".to_string()));
/// ```
pub struct EnvFileParser;

impl EnvFileParser {
    /// Parse an env file content string into a map of variables.
    pub fn parse(content: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = Self::parse_line(line) {
                vars.insert(key, value);
            }
        }

        vars
    }

    fn parse_line(line: &str) -> Option<(String, String)> {
        let (key, value) = line.split_once('=')?;
        Some((key.trim().to_string(), Self::unquote(value.trim())))
    }

    fn unquote(value: &str) -> String {
        let quoted = value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')));
        if quoted {
            value[1..value.len() - 1].to_string()
        } else {
            value.to_string()
        }
    }

    /// Load and parse an env file from a path.
    pub fn load(path: &Path) -> Result<HashMap<String, String>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }
}
