pub mod filtered_users;
pub mod profile_info;

use std::collections::HashSet;
use std::time::Duration;

use url::Url;

use crate::config::Config;
use crate::error::Result;
use crate::http_client::{HttpClient, WebClient};
use crate::retry::RetryPolicy;

pub use filtered_users::FilteredUsersApi;
pub use profile_info::ProfileInfoApi;

pub trait ApiClient: FilteredUsersApi + ProfileInfoApi + Send + Sync {}

#[derive(Debug, Clone)]
pub struct ApiClientImpl<C: HttpClient> {
    pub client: C,
    retry: RetryPolicy,
    filtered_users_url: Url,
    profile_info_url: Url,
    referer: String,
    page_interval: Duration,
    terminal_error_types: HashSet<String>,
}

impl<C: HttpClient> ApiClientImpl<C> {
    pub fn new(client: C, config: &Config) -> Result<Self> {
        Ok(ApiClientImpl {
            client,
            retry: RetryPolicy::new(config.initial_backoff),
            filtered_users_url: Url::parse(&config.filtered_users_url)?,
            profile_info_url: Url::parse(&config.profile_info_url)?,
            referer: config.referer.clone(),
            page_interval: config.page_interval,
            terminal_error_types: config.terminal_error_types.iter().cloned().collect(),
        })
    }

    fn endpoint(base: &Url, key: &str, value: &str) -> Url {
        let mut url = base.clone();
        url.query_pairs_mut().append_pair(key, value);
        url
    }
}

impl<C: HttpClient> ApiClient for ApiClientImpl<C> {}

pub type DefaultApiClient = ApiClientImpl<WebClient>;
