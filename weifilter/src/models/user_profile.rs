use std::fmt;

use serde::{Deserialize, Serialize};
use serde_aux::prelude::*;

/// A scalar whose JSON type is not stable across accounts (`is_star` is
/// `"0"` for most users and a number for some, counts occasionally come as
/// strings). Kept as received so the export shows the raw value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// Profile details of one user, from `data.user` of `/ajax/profile/info`.
///
/// Every field is optional. Numeric and boolean fields accept any JSON
/// scalar; a text field holding a non-string, or any field holding an
/// array or object, is dropped instead of failing the whole profile. `UserProfile::default()` is the empty profile
/// used for accounts that cannot be looked up.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub statuses_count: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub followers_count: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub friends_count: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub user_type: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub is_star: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub is_muteuser: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub verified: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub verified_type: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub mbrank: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub mbtype: Option<Scalar>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_to_type_or_none")]
    pub svip: Option<Scalar>,
}

impl UserProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod local_tests {
    use super::*;
    use serde_json::{from_value, json};

    #[test]
    fn test_parse_profile() {
        let profile: UserProfile = from_value(json!({
            "id": 1234567890,
            "screen_name": "someone",
            "gender": "f",
            "location": "北京 朝阳区",
            "statuses_count": 1024,
            "followers_count": 12,
            "friends_count": 300,
            "user_type": 0,
            "is_star": "0",
            "is_muteuser": true,
            "verified": false,
            "verified_type": -1,
            "mbrank": 6,
            "mbtype": 12,
            "description": "hello, world",
            "svip": 0
        }))
        .unwrap();
        assert_eq!(profile.gender.as_deref(), Some("f"));
        assert_eq!(profile.statuses_count, Some(Scalar::Int(1024)));
        assert_eq!(profile.is_star, Some(Scalar::Str("0".into())));
        assert_eq!(profile.is_muteuser, Some(Scalar::Bool(true)));
        assert_eq!(profile.verified_type, Some(Scalar::Int(-1)));
        assert_eq!(profile.description.as_deref(), Some("hello, world"));
        assert!(!profile.is_empty());
    }

    #[test]
    fn test_mistyped_and_missing_fields_are_none() {
        let profile: UserProfile = from_value(json!({
            "gender": "m",
            "friends_count": [1, 2],
            "verified": null,
            "location": {"city": "x"}
        }))
        .unwrap();
        assert_eq!(profile.gender.as_deref(), Some("m"));
        assert_eq!(profile.friends_count, None);
        assert_eq!(profile.verified, None);
        assert_eq!(profile.location, None);
        assert_eq!(profile.svip, None);
    }

    #[test]
    fn test_drifting_scalar_types_are_kept() {
        let profile: UserProfile = from_value(json!({
            "followers_count": "123",
            "svip": "1",
            "statuses_count": 5.0,
            "mbrank": 2.5,
            "verified": 1,
            "is_muteuser": "false"
        }))
        .unwrap();
        assert_eq!(profile.followers_count, Some(Scalar::Str("123".into())));
        assert_eq!(profile.svip, Some(Scalar::Str("1".into())));
        assert_eq!(profile.statuses_count, Some(Scalar::Float(5.0)));
        assert_eq!(profile.verified, Some(Scalar::Int(1)));
        assert_eq!(profile.is_muteuser, Some(Scalar::Str("false".into())));

        let cells: Vec<String> = [
            &profile.followers_count,
            &profile.svip,
            &profile.statuses_count,
            &profile.mbrank,
        ]
        .iter()
        .map(|v| v.as_ref().map(ToString::to_string).unwrap_or_default())
        .collect();
        assert_eq!(cells, vec!["123", "1", "5", "2.5"]);
    }

    #[test]
    fn test_empty_profile() {
        let profile: UserProfile = from_value(json!({})).unwrap();
        assert!(profile.is_empty());
        assert!(UserProfile::default().is_empty());
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Bool(true).to_string(), "true");
        assert_eq!(Scalar::Int(3).to_string(), "3");
        assert_eq!(Scalar::Str("0".into()).to_string(), "0");
    }
}
