//! Lookup of the latest published versions of the HoTT tools.
//!
//! The versions are published as a Java-style properties document, one
//! `tool=version` entry per line. [`LatestVersions`] downloads that document
//! on first use and keeps it for the rest of the process. A failed download is
//! not an error: the lookup switches to offline mode, records `offline=true`,
//! and every version query answers `None`.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;
use std::sync::OnceLock;
use std::time::Duration;

use log::{debug, warn};

use crate::config::Settings;
use crate::error::Result;

/// Key under which the lookup records whether it is offline.
pub const OFFLINE_KEY: &str = "offline";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Version of this library, formatted like `v1.0.1`.
pub fn source_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}

/// A parsed properties document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses properties text.
    ///
    /// Supports `#` and `!` comments, `=`, `:` or whitespace between key and
    /// value, backslash line continuations and the usual escapes including
    /// `\uXXXX`. Later duplicates win.
    pub fn parse(text: &str) -> Self {
        let mut properties = Self::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            properties.entries.insert(key, value);
        }
        properties
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Joins continued lines and drops blanks and comments.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim_start();

        let mut current = match pending.take() {
            Some(acc) => acc,
            None if line.is_empty() || line.starts_with('#') || line.starts_with('!') => continue,
            None => String::new(),
        };

        if continues(line) {
            current.push_str(&line[..line.len() - 1]);
            pending = Some(current);
        } else {
            current.push_str(line);
            lines.push(current);
        }
    }

    if let Some(acc) = pending {
        lines.push(acc);
    }
    lines
}

fn push_escaped(out: &mut String, escaped: char, chars: &mut Peekable<Chars<'_>>) {
    match escaped {
        't' => out.push('\t'),
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        'f' => out.push('\u{000c}'),
        'u' => {
            let hex: String = chars.by_ref().take(4).collect();
            let decoded = u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER);
            out.push(decoded);
        }
        other => out.push(other),
    }
}

fn split_entry(line: &str) -> (String, String) {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    push_escaped(&mut key, escaped, &mut chars);
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                chars.next_if(|&c| c == '=' || c == ':');
                break;
            }
            c => key.push(c),
        }
    }

    while chars.next_if(|c| c.is_whitespace()).is_some() {}

    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                push_escaped(&mut value, escaped, &mut chars);
            }
        } else {
            value.push(c);
        }
    }

    (key, value)
}

/// Where the versions document comes from.
pub trait PropertiesSource {
    /// Returns the raw properties text.
    fn fetch(&self) -> Result<String>;
}

/// Fetches the versions document over HTTP(S).
pub struct HttpSource {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PropertiesSource for HttpSource {
    fn fetch(&self) -> Result<String> {
        debug!("Fetching latest versions from {}", self.url);
        let text = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .text()?;
        Ok(text)
    }
}

/// Lazily downloaded table of the latest published versions.
pub struct LatestVersions<S> {
    source: S,
    offline: bool,
    cache: OnceLock<Properties>,
}

impl LatestVersions<HttpSource> {
    /// Builds a lookup against the URL configured in `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = HttpSource::new(settings.versions_url.clone())?;
        Ok(Self::new(source, settings.offline))
    }
}

impl<S: PropertiesSource> LatestVersions<S> {
    /// Creates a lookup. With `offline` set the source is never contacted.
    pub fn new(source: S, offline: bool) -> Self {
        Self {
            source,
            offline,
            cache: OnceLock::new(),
        }
    }

    fn properties(&self) -> &Properties {
        self.cache.get_or_init(|| {
            let mut properties = if self.offline {
                debug!("Offline mode configured, skipping version lookup");
                Properties::new()
            } else {
                match self.source.fetch() {
                    Ok(text) => {
                        let mut fetched = Properties::parse(&text);
                        fetched.set(OFFLINE_KEY, "false");
                        debug!("Loaded {} version entries", fetched.len() - 1);
                        return fetched;
                    }
                    Err(e) => {
                        warn!("Cannot fetch latest versions, continuing offline: {e}");
                        Properties::new()
                    }
                }
            };
            properties.set(OFFLINE_KEY, "true");
            properties
        })
    }

    /// Returns the latest version published for `key`.
    ///
    /// The first call fetches the document; later calls use the cached copy.
    pub fn get(&self, key: &str) -> Option<String> {
        self.properties().get(key).map(str::to_owned)
    }

    /// Returns `true` if the versions could not be fetched or offline mode
    /// was configured. Triggers the fetch if it has not happened yet.
    pub fn is_offline(&self) -> bool {
        self.properties().get(OFFLINE_KEY) == Some("true")
    }
}
