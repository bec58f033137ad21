use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

use super::api::{ApiCall, HttpMethod};
use super::query::QueryParams;
use super::response::ApiResponse;
use super::session::SessionManager;
use crate::error::{NotifierError, Result};

/// Turns logical [`ApiCall`]s into HTTP requests against the chat server.
///
/// The session lives behind one mutex which is held from the session check
/// until the request is fully built, so concurrent calls never log in twice
/// or read a token that is being replaced.
pub struct CallDispatcher {
    http: Client,
    api_url: Url,
    session: Mutex<SessionManager>,
}

impl CallDispatcher {
    pub fn new(server_url: &str, user: &str, password: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("rocketchat-notifier/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| NotifierError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = api_base_url(server_url)?;
        let session = SessionManager::new(http.clone(), api_url.clone(), user, password);

        Ok(Self {
            http,
            api_url,
            session: Mutex::new(session),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn session(&self) -> &Mutex<SessionManager> {
        &self.session
    }

    /// Performs one request/response cycle for `call`.
    ///
    /// Query parameters go on the URL for both verbs; `body` is only sent with
    /// POST, as JSON with null members removed. The reply is decoded whatever
    /// the HTTP status, so backend rejections surface through `success`.
    pub async fn dispatch(
        &self,
        call: &ApiCall,
        params: &QueryParams,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        let url = self.call_url(call, params)?;

        let request = {
            let mut session = self.session.lock().await;

            let mut request = match call.method {
                HttpMethod::Get => self.http.get(url),
                HttpMethod::Post => {
                    let request = self.http.post(url).header(CONTENT_TYPE, "application/json");
                    match body {
                        Some(mut body) => {
                            drop_nulls(&mut body);
                            request.body(serde_json::to_vec(&body)?)
                        }
                        None => request,
                    }
                }
                other => {
                    return Err(NotifierError::Config(format!(
                        "HTTP method {other} is not supported (call {call})"
                    )))
                }
            };

            if call.requires_auth {
                request = session.ensure_session().await?.authorize(request);
            }

            if !params.is_empty() {
                request = request.query(&params.iter().collect::<Vec<_>>());
            }

            request
        };

        debug!("{} {}", call.method, call);
        let response = request
            .send()
            .await
            .map_err(|e| NotifierError::io(call.path, e))?;

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| NotifierError::io(call.path, e))
    }

    fn call_url(&self, call: &ApiCall, params: &QueryParams) -> Result<Url> {
        let path = if call.has_placeholders() {
            call.resolve_path(params.method_args()).ok_or_else(|| {
                NotifierError::Config(format!(
                    "Call {call} needs more method arguments than the {} given",
                    params.method_args().len()
                ))
            })?
        } else {
            call.path.to_string()
        };

        self.api_url
            .join(&path)
            .map_err(|e| NotifierError::Config(format!("Invalid URL for call {call}: {e}")))
    }
}

/// Normalises a server URL so that it ends in `/api/`.
///
/// `http://host`, `http://host/`, `http://host/api` and `http://host/api/`
/// all become `http://host/api/`.
pub fn api_base_url(server_url: &str) -> Result<Url> {
    let trimmed = server_url.trim().trim_end_matches('/');
    let base = trimmed.strip_suffix("/api").unwrap_or(trimmed);

    Url::parse(&format!("{base}/api/"))
        .map_err(|e| NotifierError::Config(format!("Invalid API URL '{server_url}': {e}")))
}

fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(drop_nulls),
        _ => {}
    }
}
