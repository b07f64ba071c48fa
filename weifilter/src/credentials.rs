//! Suppliers of the `cookie` header attached to every API request.
//!
//! The export never logs in by itself; it borrows the session of a browser
//! that is already logged in to weibo.com, either as a raw header string or
//! as a cookie export file.
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::{debug, warn};
use serde::Deserialize;

use crate::error::{Context, Result};

pub trait CredentialProvider: Send + Sync {
    fn cookie_header(&self) -> Result<Option<String>>;
}

#[derive(Debug, Clone, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn cookie_header(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A cookie header copied verbatim from the browser.
#[derive(Debug, Clone)]
pub struct StaticCookie(pub String);

impl CredentialProvider for StaticCookie {
    fn cookie_header(&self) -> Result<Option<String>> {
        let cookie = self.0.trim();
        Ok((!cookie.is_empty()).then(|| cookie.to_string()))
    }
}

/// Browser cookie export: a JSON array of `{domain, name, value}` records.
/// Only cookies of `domain` are sent. A file that is not JSON is taken as a
/// raw header string.
#[derive(Debug, Clone)]
pub struct CookieFile {
    path: PathBuf,
    domain: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CookieRecord {
    #[serde(default)]
    domain: String,
    name: String,
    value: String,
}

impl CookieFile {
    pub fn new(path: impl AsRef<Path>, domain: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            domain: domain.into(),
        }
    }
}

impl CredentialProvider for CookieFile {
    fn cookie_header(&self) -> Result<Option<String>> {
        let content = std::fs::read_to_string(&self.path).context("reading cookie file")?;
        let content = content.trim();
        let Ok(records) = serde_json::from_str::<Vec<CookieRecord>>(content) else {
            debug!("cookie file {:?} is not a JSON export, using it raw", self.path);
            return StaticCookie(content.to_string()).cookie_header();
        };
        let domain = self.domain.trim_start_matches('.');
        let header = records
            .iter()
            .filter(|c| c.domain.trim_start_matches('.') == domain)
            .map(|c| format!("{}={}", c.name, c.value))
            .join("; ");
        if header.is_empty() {
            warn!("no cookie of domain {} in {:?}", self.domain, self.path);
            return Ok(None);
        }
        Ok(Some(header))
    }
}
