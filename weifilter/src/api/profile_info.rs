#![allow(async_fn_in_trait)]
use std::collections::HashSet;

use log::{debug, warn};
use serde::Deserialize;
use serde_aux::prelude::*;

use super::ApiClientImpl;
use crate::{
    error::Result,
    http_client::{HttpClient, JsonResponse},
    models::{UserProfile, common::deserialize_ok},
    retry::Attempt,
};

#[derive(Debug, Clone, Deserialize)]
struct ProfileInfoResponse {
    #[serde(default, deserialize_with = "deserialize_ok")]
    ok: bool,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    data: Option<ProfileInfoData>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    error_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProfileInfoData {
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    user: Option<UserProfile>,
}

pub trait ProfileInfoApi {
    /// Profile of `uid`. Accounts the API refuses to show permanently
    /// (deleted, suspended, ...) yield an empty profile without retrying.
    async fn profile_info(&self, uid: &str) -> UserProfile;
}

impl<C: HttpClient> ProfileInfoApi for ApiClientImpl<C> {
    async fn profile_info(&self, uid: &str) -> UserProfile {
        let url = Self::endpoint(&self.profile_info_url, "uid", uid);
        let label = format!("profile of uid {uid}");
        let (client, url, referer) = (&self.client, &url, self.referer.as_str());
        let terminal = &self.terminal_error_types;
        self.retry
            .run(&label, move || async move {
                debug!("fetching profile of uid {uid}");
                let res = client.get_json(url, referer).await;
                classify_profile(uid, res, terminal)
            })
            .await
    }
}

fn classify_profile(
    uid: &str,
    res: Result<JsonResponse>,
    terminal_error_types: &HashSet<String>,
) -> Attempt<UserProfile> {
    let res = match res {
        Ok(res) => res,
        Err(e) => return Attempt::Retryable(format!("request failed: {e}")),
    };
    if !res.is_ok() {
        return Attempt::Retryable(format!("http status {}", res.status));
    }
    let body = match ProfileInfoResponse::deserialize(&res.body) {
        Ok(body) => body,
        Err(e) => return Attempt::Retryable(format!("malformed response: {e}")),
    };
    if !body.ok {
        return match body.error_type {
            Some(error_type) if terminal_error_types.contains(&error_type) => {
                warn!("profile of uid {uid} unavailable ({error_type}): {}", res.body);
                Attempt::Terminal(UserProfile::default())
            }
            _ => Attempt::Retryable(format!("api error: {}", res.body)),
        };
    }
    match body.data.and_then(|data| data.user) {
        Some(profile) => Attempt::Success(profile),
        None => {
            warn!("profile of uid {uid} has no user payload: {}", res.body);
            Attempt::Terminal(UserProfile::default())
        }
    }
}
