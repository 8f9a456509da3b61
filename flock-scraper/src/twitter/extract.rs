//! Helpers for walking the nested user-lookup response.
use crate::twitter::types::{LegacyProfile, UserResponse};

/// Walk `data.user.result.legacy.followers_count`. `None` when any level of
/// the path is absent.
pub fn followers_count(resp: &UserResponse) -> Option<u64> {
    legacy(resp)?.followers_count
}

/// The screen name, when present. Used only for log context.
pub fn screen_name(resp: &UserResponse) -> Option<&str> {
    legacy(resp)?.screen_name.as_deref()
}

fn legacy(resp: &UserResponse) -> Option<&LegacyProfile> {
    resp.data.as_ref()?.user.as_ref()?.result.as_ref()?.legacy.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resp(v: serde_json::Value) -> UserResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn extracts_count_from_full_path() {
        let r = resp(json!({
            "data": { "user": { "result": { "legacy": { "followers_count": 42 } } } }
        }));
        assert_eq!(followers_count(&r), Some(42));
    }

    #[test]
    fn zero_followers_is_a_real_value() {
        let r = resp(json!({
            "data": { "user": { "result": { "legacy": { "followers_count": 0 } } } }
        }));
        assert_eq!(followers_count(&r), Some(0));
    }

    #[test]
    fn missing_data_level_yields_none() {
        assert_eq!(followers_count(&resp(json!({}))), None);
    }

    #[test]
    fn missing_user_level_yields_none() {
        assert_eq!(followers_count(&resp(json!({ "data": {} }))), None);
    }

    #[test]
    fn missing_result_level_yields_none() {
        assert_eq!(
            followers_count(&resp(json!({ "data": { "user": {} } }))),
            None
        );
    }

    #[test]
    fn missing_legacy_level_yields_none() {
        assert_eq!(
            followers_count(&resp(json!({ "data": { "user": { "result": {} } } }))),
            None
        );
    }

    #[test]
    fn missing_count_field_yields_none() {
        let r = resp(json!({
            "data": { "user": { "result": { "legacy": { "screen_name": "flockbot" } } } }
        }));
        assert_eq!(followers_count(&r), None);
        assert_eq!(screen_name(&r), Some("flockbot"));
    }
}
