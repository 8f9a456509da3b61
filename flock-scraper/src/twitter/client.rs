//! Authenticated scraper client for user lookups.
//!
//! Login drives the unofficial onboarding flow: guest-token activation, then
//! the identifier/password/duplication-check subtask sequence, accumulating
//! the `auth_token` and `ct0` session cookies from response headers. Lookups
//! hit the GraphQL user-by-rest-id endpoint with the session cookie and csrf
//! header. There is no token refresh; an expired session surfaces as an
//! upstream error.
use std::collections::HashMap;

use async_trait::async_trait;
use flock_http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use flock_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::json;

use crate::source::FollowerSource;
use crate::twitter::extract;
use crate::twitter::types::{FlowResponse, GuestTokenResponse, UserResponse};
use crate::ScrapeError;

/// Public bearer used by the platform's own web client; required on every
/// request alongside the session cookies.
const PUBLIC_BEARER: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";

const ONBOARDING_TASK: &str = "1.1/onboarding/task.json";
const USER_BY_REST_ID: &str = "graphql/GazOglcBvgLigl3ywt6b3Q/UserByRestId";

/// Feature flags the GraphQL endpoint insists on receiving.
const GRAPHQL_FEATURES: &str = r#"{"hidden_profile_likes_enabled":false,"highlights_tweets_tab_ui_enabled":true,"creator_subscriptions_tweet_preview_api_enabled":true,"responsive_web_graphql_exclude_directive_enabled":true,"verified_phone_label_enabled":false,"responsive_web_graphql_skip_user_profile_image_extensions_enabled":false,"responsive_web_graphql_timeline_navigation_enabled":true}"#;

#[derive(Clone)]
struct Session {
    auth_token: String,
    ct0: String,
}

/// Long-lived authenticated client, constructed once at startup and shared
/// across requests.
#[derive(Clone)]
pub struct Scraper {
    http: HttpClient,
    session: Session,
}

impl Scraper {
    /// Authenticate with username/password and return a ready client. Any
    /// flow failure is fatal to the caller.
    pub async fn login(
        http: HttpClient,
        username: &str,
        password: &str,
    ) -> Result<Self, ScrapeError> {
        let guest: GuestTokenResponse = http
            .post_json(
                "1.1/guest/activate.json",
                &json!({}),
                RequestOpts {
                    auth: Some(Auth::Bearer(PUBLIC_BEARER)),
                    ..Default::default()
                },
            )
            .await?;

        let flow_headers = guest_headers(&guest.guest_token)?;
        let mut jar: HashMap<String, String> = HashMap::new();

        // Start the login flow, then walk the fixed subtask sequence the web
        // client performs.
        let (headers, mut flow) = http
            .post_json_full::<_, FlowResponse>(
                ONBOARDING_TASK,
                &flow_start_body(),
                RequestOpts {
                    auth: Some(Auth::Bearer(PUBLIC_BEARER)),
                    headers: Some(flow_headers.clone()),
                    query: Some(vec![("flow_name", "login".into())]),
                    ..Default::default()
                },
            )
            .await?;
        collect_cookies(&headers, &mut jar);
        check_flow_not_blocked(&flow)?;

        for body in [
            enter_identifier_body(&flow.flow_token, username),
            enter_password_body(&flow.flow_token, password),
            duplication_check_body(&flow.flow_token),
        ] {
            // Each step consumes the previous flow token; bodies are built
            // lazily below against the latest one.
            let body = refresh_flow_token(body, &flow.flow_token);
            let (headers, next) = http
                .post_json_full::<_, FlowResponse>(
                    ONBOARDING_TASK,
                    &body,
                    RequestOpts {
                        auth: Some(Auth::Bearer(PUBLIC_BEARER)),
                        headers: Some(flow_headers.clone()),
                        ..Default::default()
                    },
                )
                .await?;
            collect_cookies(&headers, &mut jar);
            check_flow_not_blocked(&next)?;
            flow = next;
        }

        let auth_token = jar
            .remove("auth_token")
            .ok_or_else(|| ScrapeError::Login("no auth_token cookie after flow".into()))?;
        let ct0 = jar
            .remove("ct0")
            .ok_or_else(|| ScrapeError::Login("no ct0 cookie after flow".into()))?;

        tracing::info!(username, "scraper login complete");

        Ok(Self {
            http,
            session: Session { auth_token, ct0 },
        })
    }

    async fn user_by_rest_id(&self, id: &str) -> Result<UserResponse, ScrapeError> {
        let variables = json!({
            "userId": id,
            "withSafetyModeUserFields": true,
        })
        .to_string();

        let resp: UserResponse = self
            .http
            .get_json(
                USER_BY_REST_ID,
                RequestOpts {
                    auth: Some(Auth::Bearer(PUBLIC_BEARER)),
                    headers: Some(self.session_headers()?),
                    query: Some(vec![
                        ("variables", variables.into()),
                        ("features", GRAPHQL_FEATURES.into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        tracing::debug!(
            user_id = %id,
            screen_name = ?extract::screen_name(&resp),
            followers = ?extract::followers_count(&resp),
            "user lookup response"
        );
        Ok(resp)
    }

    fn session_headers(&self) -> Result<HeaderMap, ScrapeError> {
        let cookie = format!(
            "auth_token={}; ct0={}",
            self.session.auth_token, self.session.ct0
        );
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&cookie)
                .map_err(|e| HttpError::Build(format!("invalid session cookie: {e}")))?,
        );
        headers.insert(
            "x-csrf-token",
            HeaderValue::from_str(&self.session.ct0)
                .map_err(|e| HttpError::Build(format!("invalid csrf token: {e}")))?,
        );
        Ok(headers)
    }
}

#[async_trait]
impl FollowerSource for Scraper {
    async fn users_by_rest_ids(&self, ids: &[String]) -> Result<Vec<UserResponse>, ScrapeError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.user_by_rest_id(id).await?);
        }
        Ok(out)
    }
}

fn guest_headers(guest_token: &str) -> Result<HeaderMap, ScrapeError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-guest-token",
        HeaderValue::from_str(guest_token)
            .map_err(|e| HttpError::Build(format!("invalid guest token: {e}")))?,
    );
    Ok(headers)
}

/// Subtasks that mean the flow cannot proceed with credentials alone:
/// outright denial, a confirmation challenge, or a locked account.
const BLOCKING_SUBTASKS: [&str; 3] = ["DenyLoginSubtask", "LoginAcid", "AccountLockedSubtask"];

/// Fail fast when the flow advertises a subtask we cannot answer; otherwise
/// the sequence would run to the end and die on the missing cookies.
fn check_flow_not_blocked(flow: &FlowResponse) -> Result<(), ScrapeError> {
    if let Some(sub) = flow
        .subtasks
        .iter()
        .find(|s| BLOCKING_SUBTASKS.contains(&s.subtask_id.as_str()))
    {
        return Err(ScrapeError::Login(format!(
            "flow halted by subtask {}",
            sub.subtask_id
        )));
    }
    tracing::debug!(subtasks = ?flow.subtasks.iter().map(|s| s.subtask_id.as_str()).collect::<Vec<_>>(), "flow step");
    Ok(())
}

/// Gather cookies from `Set-Cookie` response headers into the jar. Later
/// values win, matching how the flow rotates `ct0`.
fn collect_cookies(headers: &HeaderMap, jar: &mut HashMap<String, String>) {
    for value in headers.get_all(SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        if let Some((name, rest)) = raw.split_once('=') {
            let val = rest.split(';').next().unwrap_or("").trim();
            jar.insert(name.trim().to_string(), val.to_string());
        }
    }
}

// ----- flow subtask bodies -----

fn flow_start_body() -> serde_json::Value {
    json!({
        "input_flow_data": {
            "flow_context": {
                "debug_overrides": {},
                "start_location": { "location": "splash_screen" }
            }
        }
    })
}

fn enter_identifier_body(flow_token: &str, username: &str) -> serde_json::Value {
    json!({
        "flow_token": flow_token,
        "subtask_inputs": [{
            "subtask_id": "LoginEnterUserIdentifierSSO",
            "settings_list": {
                "setting_responses": [{
                    "key": "user_identifier",
                    "response_data": { "text_data": { "result": username } }
                }],
                "link": "next_link"
            }
        }]
    })
}

fn enter_password_body(flow_token: &str, password: &str) -> serde_json::Value {
    json!({
        "flow_token": flow_token,
        "subtask_inputs": [{
            "subtask_id": "LoginEnterPassword",
            "enter_password": { "password": password, "link": "next_link" }
        }]
    })
}

fn duplication_check_body(flow_token: &str) -> serde_json::Value {
    json!({
        "flow_token": flow_token,
        "subtask_inputs": [{
            "subtask_id": "AccountDuplicationCheck",
            "check_logged_in_account": { "link": "AccountDuplicationCheck_false" }
        }]
    })
}

/// The bodies above are built eagerly against a stale token when the flow
/// advances; rewrite it to the current one before sending.
fn refresh_flow_token(mut body: serde_json::Value, flow_token: &str) -> serde_json::Value {
    if let Some(obj) = body.as_object_mut() {
        obj.insert("flow_token".into(), json!(flow_token));
    }
    body
}
