use serde::{Deserialize, Serialize};

/// One user lookup result: `{data:{user:{result:{legacy:{...}}}}}`.
///
/// Every level is optional so a hole anywhere in the path deserializes
/// cleanly and surfaces as a missing field during extraction instead of a
/// decode error.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserResponse {
    #[serde(default)]
    pub data: Option<UserData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserData {
    #[serde(default)]
    pub user: Option<UserEnvelope>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserEnvelope {
    #[serde(default)]
    pub result: Option<UserRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserRecord {
    #[serde(default)]
    pub rest_id: Option<String>,
    #[serde(default)]
    pub legacy: Option<LegacyProfile>,
}

/// The "legacy" profile record carrying the follower metric. Adjacent fields
/// are kept for log context; only `followers_count` is contractual.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LegacyProfile {
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub friends_count: Option<u64>,
    #[serde(default)]
    pub statuses_count: Option<u64>,
    #[serde(default)]
    pub screen_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

// ----- login flow wire types -----

#[derive(Debug, Deserialize)]
pub struct GuestTokenResponse {
    pub guest_token: String,
}

#[derive(Debug, Deserialize)]
pub struct FlowResponse {
    pub flow_token: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

#[derive(Debug, Deserialize)]
pub struct Subtask {
    pub subtask_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn full_response_deserializes() {
        let v = json!({
            "data": { "user": { "result": {
                "rest_id": "44196397",
                "legacy": {
                    "followers_count": 1234,
                    "friends_count": 10,
                    "screen_name": "flockbot"
                }
            }}}
        });
        let resp: UserResponse = serde_json::from_value(v).unwrap();
        let legacy = resp.data.unwrap().user.unwrap().result.unwrap().legacy.unwrap();
        assert_eq!(legacy.followers_count, Some(1234));
        assert_eq!(legacy.screen_name.as_deref(), Some("flockbot"));
    }

    #[test]
    fn empty_object_deserializes_to_all_none() {
        let resp: UserResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.data.is_none());
    }
}
