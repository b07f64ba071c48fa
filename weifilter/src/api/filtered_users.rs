#![allow(async_fn_in_trait)]
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{DefaultOnNull, serde_as};
use tokio::time::sleep;

use super::ApiClientImpl;
use crate::{
    error::{Error, Result},
    http_client::{HttpClient, JsonResponse},
    models::{
        FilteredUserEntry, Page, common::deserialize_ok, filtered_user::CardInternal,
    },
    retry::Attempt,
};

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
struct FilteredUsersResponse {
    #[serde(default, deserialize_with = "deserialize_ok")]
    ok: bool,
    // cards are parsed one by one so a broken card only drops itself
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    card_group: Vec<Value>,
    #[serde(default)]
    next_cursor: Value,
}

pub trait FilteredUsersApi {
    /// Fetches one page, retrying until the API answers with `ok`.
    async fn filtered_users_page(&self, page: u32) -> Page;
    /// Follows the cursor from page 1 until it runs out.
    async fn filtered_users(&self) -> Vec<FilteredUserEntry>;
}

impl<C: HttpClient> FilteredUsersApi for ApiClientImpl<C> {
    async fn filtered_users_page(&self, page: u32) -> Page {
        let url = Self::endpoint(&self.filtered_users_url, "page", &page.to_string());
        let label = format!("filtered users page {page}");
        let (client, url, referer) = (&self.client, &url, self.referer.as_str());
        self.retry
            .run(&label, move || async move {
                info!("Calling API... Page: {page}");
                let res = client.get_json(url, referer).await;
                classify_page(page, res)
            })
            .await
    }

    async fn filtered_users(&self) -> Vec<FilteredUserEntry> {
        let mut entries = Vec::new();
        let mut page = 1;
        loop {
            let result = self.filtered_users_page(page).await;
            info!("Page: {page} Users: {}", result.entries.len());
            let has_next = result.has_next();
            entries.extend(result.entries);
            if !has_next {
                break;
            }
            page += 1;
            if !self.page_interval.is_zero() {
                sleep(self.page_interval).await;
            }
        }
        info!("Fetched {} filtered users in {page} pages", entries.len());
        entries
    }
}

fn classify_page(page: u32, res: Result<JsonResponse>) -> Attempt<Page> {
    let res = match res {
        Ok(res) => res,
        Err(e) => return Attempt::Retryable(format!("request failed: {e}")),
    };
    if !res.is_ok() {
        return Attempt::Retryable(format!("http status {}", res.status));
    }
    let body = match FilteredUsersResponse::deserialize(&res.body) {
        Ok(body) => body,
        Err(e) => return Attempt::Retryable(format!("malformed response: {e}")),
    };
    if !body.ok {
        return Attempt::Retryable(format!("api error: {}", res.body));
    }

    let entries = body
        .card_group
        .into_iter()
        .filter_map(|card| {
            let entry = CardInternal::deserialize(&card)
                .map_err(Error::from)
                .and_then(FilteredUserEntry::try_from);
            match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("skipping entry on page {page}: {e}");
                    None
                }
            }
        })
        .collect();
    Attempt::Success(Page {
        entries,
        next_cursor: body.next_cursor,
    })
}
