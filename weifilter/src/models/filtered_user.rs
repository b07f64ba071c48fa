use serde::Deserialize;
use serde_aux::prelude::*;
use serde_json::Value;
use url::Url;

use super::common::is_truthy;
use crate::error::{Error, Result};

const SCHEME_BASE: &str = "https://weibo.com/";

/// One muted account as listed on the filtered-users setting page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredUserEntry {
    pub uid: String,
    pub screen_name: String,
}

/// Raw item of `card_group`. The uid only appears inside `scheme`, e.g.
/// `https://m.weibo.cn/p/index?containerid=230283&uid=1234567890`.
/// Null or mistyped fields read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CardInternal {
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub scheme: Option<String>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub title_sub: Option<String>,
}

impl TryFrom<CardInternal> for FilteredUserEntry {
    type Error = Error;

    fn try_from(card: CardInternal) -> Result<Self> {
        let scheme = card
            .scheme
            .ok_or_else(|| Error::Other("card without scheme".into()))?;
        let url = Url::parse(SCHEME_BASE)?.join(&scheme)?;
        let uid = url
            .query_pairs()
            .find(|(key, _)| key == "uid")
            .map(|(_, value)| value.into_owned())
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| Error::Other(format!("no uid in scheme {scheme:?}")))?;
        Ok(FilteredUserEntry {
            uid,
            screen_name: card.title_sub.unwrap_or_default(),
        })
    }
}

/// One page of the filtered-users list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub entries: Vec<FilteredUserEntry>,
    pub next_cursor: Value,
}

impl Page {
    /// A falsy cursor marks the last page.
    pub fn has_next(&self) -> bool {
        is_truthy(&self.next_cursor)
    }
}
