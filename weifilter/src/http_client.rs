#![allow(async_fn_in_trait)]
use log::{debug, trace};
use reqwest::{
    Client, StatusCode,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde_json::Value;
use url::Url;

use crate::config::Config;
use crate::credentials::CredentialProvider;
use crate::error::Result;

/// Status and decoded body of one GET request.
///
/// A non-200 status is not an error at this level: the body is decoded when
/// possible and left as `Value::Null` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl JsonResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

pub trait HttpClient: Send + Sync {
    /// `Err` only for transport failures and undecodable 200 bodies.
    async fn get_json(&self, url: &Url, referer: &str) -> Result<JsonResponse>;
}

#[derive(Debug, Clone)]
pub struct WebClient {
    inner: Client,
}

impl WebClient {
    pub fn new(config: &Config, credentials: &dyn CredentialProvider) -> Result<Self> {
        let mut web_headers = HeaderMap::from_iter([
            (
                header::ACCEPT,
                HeaderValue::from_static("application/json, text/plain, */*"),
            ),
            (
                header::ACCEPT_LANGUAGE,
                HeaderValue::from_str(&config.accept_language)?,
            ),
            (
                HeaderName::from_static("client-version"),
                HeaderValue::from_str(&config.client_version)?,
            ),
            (
                HeaderName::from_static("server-version"),
                HeaderValue::from_str(&config.server_version)?,
            ),
            (
                HeaderName::from_static("sec-ch-ua"),
                HeaderValue::from_static(
                    r#""Chromium";v="112", "Google Chrome";v="112", "Not:A-Brand";v="99""#,
                ),
            ),
            (
                HeaderName::from_static("sec-ch-ua-mobile"),
                HeaderValue::from_static("?0"),
            ),
            (
                HeaderName::from_static("sec-ch-ua-platform"),
                HeaderValue::from_static(r#""Windows""#),
            ),
            (
                HeaderName::from_static("sec-fetch-dest"),
                HeaderValue::from_static("empty"),
            ),
            (
                HeaderName::from_static("sec-fetch-mode"),
                HeaderValue::from_static("cors"),
            ),
            (
                HeaderName::from_static("sec-fetch-site"),
                HeaderValue::from_static("same-origin"),
            ),
            (
                HeaderName::from_static("x-requested-with"),
                HeaderValue::from_static("XMLHttpRequest"),
            ),
        ]);
        if let Some(cookie) = credentials.cookie_header()? {
            let mut value = HeaderValue::from_str(&cookie)?;
            value.set_sensitive(true);
            web_headers.insert(header::COOKIE, value);
        } else {
            debug!("no credentials supplied, requests are sent without cookie");
        }

        let mut builder = Client::builder().default_headers(web_headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }
}

impl HttpClient for WebClient {
    async fn get_json(&self, url: &Url, referer: &str) -> Result<JsonResponse> {
        trace!("GET {url}");
        let response = self
            .inner
            .get(url.to_owned())
            .header(header::REFERER, referer)
            .send()
            .await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if status == StatusCode::OK {
            serde_json::from_slice(&bytes)?
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Ok(JsonResponse { status, body })
    }
}
