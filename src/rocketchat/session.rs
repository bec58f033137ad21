use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use sha2::{Digest, Sha256};
use std::fmt;
use url::Url;

use super::response::ApiResponse;
use crate::error::{NotifierError, Result};

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const USER_ID_HEADER: &str = "X-User-Id";
const TWO_FACTOR_METHOD_HEADER: &str = "x-2fa-method";
const TWO_FACTOR_CODE_HEADER: &str = "x-2fa-code";

/// Credentials obtained from a successful login.
#[derive(Clone)]
pub struct AuthToken {
    token: String,
    user_id: String,
    /// Hex SHA-256 of the password, sent as the two-factor code
    password_digest: String,
}

impl AuthToken {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Adds the auth and two-factor headers the backend expects on protected calls.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTH_TOKEN_HEADER, &self.token)
            .header(USER_ID_HEADER, &self.user_id)
            .header(TWO_FACTOR_METHOD_HEADER, "password")
            .header(TWO_FACTOR_CODE_HEADER, &self.password_digest)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated(AuthToken),
}

/// Owns the login / logout lifecycle against the chat server.
///
/// Not synchronised itself; the dispatcher keeps it behind a mutex so that
/// checking, logging in and reading the token happen as one step.
pub struct SessionManager {
    http: Client,
    api_url: Url,
    user: String,
    password: String,
    state: SessionState,
}

impl SessionManager {
    pub fn new(http: Client, api_url: Url, user: &str, password: &str) -> Self {
        Self {
            http,
            api_url,
            user: user.to_string(),
            password: password.to_string(),
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Logs in unless a session is already established, then returns its token.
    ///
    /// A rejected login leaves the manager unauthenticated; nothing is retried.
    pub async fn ensure_session(&mut self) -> Result<&AuthToken> {
        if !self.is_authenticated() {
            self.state = SessionState::Authenticating;
            match self.login().await {
                Ok(token) => self.state = SessionState::Authenticated(token),
                Err(e) => {
                    self.state = SessionState::Unauthenticated;
                    return Err(e);
                }
            }
        }

        match &self.state {
            SessionState::Authenticated(token) => Ok(token),
            SessionState::Unauthenticated | SessionState::Authenticating => Err(
                NotifierError::Authentication("session was not established".to_string()),
            ),
        }
    }

    /// Ends the remote session. Local credentials are dropped even when the
    /// remote call fails.
    pub async fn logout(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, SessionState::Unauthenticated);
        let SessionState::Authenticated(token) = previous else {
            debug!("Logout requested without an active session");
            return Ok(());
        };

        let url = self.endpoint("v1/logout")?;
        let response = token
            .authorize(self.http.post(url))
            .send()
            .await
            .map_err(|e| NotifierError::io("logout", e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response_text(response).await;
            warn!("Logout returned status {status}: {message}");
            return Err(NotifierError::Session {
                operation: "logout",
                status: status.as_u16(),
                message,
            });
        }

        info!("Logged out of {}", self.api_url);
        Ok(())
    }

    async fn login(&self) -> Result<AuthToken> {
        let url = self.endpoint("v1/login")?;
        debug!("Logging in to {url} as {}", self.user);

        let response = self
            .http
            .post(url)
            .form(&[
                ("username", self.user.as_str()),
                ("ldapPass", self.password.as_str()),
                ("ldap", "true"),
                ("ldapOptions", "[]"),
            ])
            .send()
            .await
            .map_err(|e| NotifierError::io("login", e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(NotifierError::Authentication(
                "The username and password provided are incorrect.".to_string(),
            ));
        }
        if status != StatusCode::OK {
            return Err(NotifierError::Session {
                operation: "login",
                status: status.as_u16(),
                message: response_text(response).await,
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| NotifierError::io("login", e))?;
        let data = body.data.ok_or_else(|| NotifierError::Session {
            operation: "login",
            status: status.as_u16(),
            message: "response carried no auth data".to_string(),
        })?;

        info!("Logged in to {} as user {}", self.api_url, data.user_id);
        Ok(AuthToken {
            token: data.auth_token,
            user_id: data.user_id,
            password_digest: password_digest(&self.password),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| NotifierError::Config(format!("Invalid endpoint URL '{path}': {e}")))
    }
}

/// Hex-encoded SHA-256 of the trimmed password.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.trim().as_bytes()))
}

async fn response_text(response: reqwest::Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string();
    match response.text().await {
        Ok(text) if !text.trim().is_empty() => text,
        _ => reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_OK: &str = r#"{"status": "success", "data": {"authToken": "tok-1", "userId": "uid-1"}}"#;

    fn manager(server: &mockito::Server) -> SessionManager {
        let api_url = Url::parse(&format!("{}/api/", server.url())).unwrap();
        SessionManager::new(Client::new(), api_url, "bot", " secret ")
    }

    #[test]
    fn test_password_digest_is_sha256_hex_of_trimmed_password() {
        assert_eq!(
            password_digest(" password "),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[tokio::test]
    async fn test_ensure_session_logs_in_once() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/v1/login")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("username".into(), "bot".into()),
                mockito::Matcher::UrlEncoded("ldapPass".into(), " secret ".into()),
                mockito::Matcher::UrlEncoded("ldap".into(), "true".into()),
                mockito::Matcher::UrlEncoded("ldapOptions".into(), "[]".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LOGIN_OK)
            .expect(1)
            .create_async()
            .await;

        let mut session = manager(&server);
        assert!(matches!(session.state(), SessionState::Unauthenticated));

        let user_id = session.ensure_session().await.unwrap().user_id().to_string();
        assert_eq!(user_id, "uid-1");
        session.ensure_session().await.unwrap();

        assert!(session.is_authenticated());
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_login_is_an_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/login")
            .with_status(401)
            .with_body(r#"{"status": "error", "message": "Unauthorized"}"#)
            .create_async()
            .await;

        let mut session = manager(&server);
        let result = session.ensure_session().await;

        assert!(matches!(result, Err(NotifierError::Authentication(_))));
        assert!(matches!(session.state(), SessionState::Unauthenticated));
    }

    #[tokio::test]
    async fn test_other_login_failure_is_a_session_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/login")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let mut session = manager(&server);
        match session.ensure_session().await {
            Err(NotifierError::Session {
                operation,
                status,
                message,
            }) => {
                assert_eq!(operation, "login");
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_session_even_when_remote_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/login")
            .with_status(200)
            .with_body(LOGIN_OK)
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/api/v1/logout")
            .match_header("x-auth-token", "tok-1")
            .match_header("x-user-id", "uid-1")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let mut session = manager(&server);
        session.ensure_session().await.unwrap();

        let result = session.logout().await;
        assert!(matches!(
            result,
            Err(NotifierError::Session { status: 500, .. })
        ));
        assert!(matches!(session.state(), SessionState::Unauthenticated));
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_again_after_logout() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/v1/login")
            .with_status(200)
            .with_body(LOGIN_OK)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/api/v1/logout")
            .with_status(200)
            .with_body(r#"{"status": "success"}"#)
            .create_async()
            .await;

        let mut session = manager(&server);
        session.ensure_session().await.unwrap();
        session.logout().await.unwrap();
        session.ensure_session().await.unwrap();

        login.assert_async().await;
    }
}
