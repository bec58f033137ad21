use log::info;
use std::time::Duration;

use super::api::ApiCall;
use super::dispatcher::CallDispatcher;
use super::message::{ChatMessage, PostMessageRequest};
use super::query::QueryParams;
use super::response::{ApiResponse, Room, ServerInfo, User};
use crate::error::{NotifierError, Result};

const USER_ID_PARAM: &str = "userId";
const ROOM_NAME_PARAM: &str = "roomName";

/// Rocket.Chat REST client.
pub struct RocketChatClient {
    dispatcher: CallDispatcher,
}

impl RocketChatClient {
    /// Creates a client for the server at `server_url`.
    ///
    /// # Arguments
    ///
    /// * `server_url` - Server URL, with or without the `/api/` suffix
    /// * `user` - Account used to log in and post
    /// * `password` - Password for `user`
    /// * `timeout` - Upper bound for each request
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is not absolute or the HTTP
    /// client cannot be built. No request is made until the first call.
    pub fn new(server_url: &str, user: &str, password: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            dispatcher: CallDispatcher::new(server_url, user, password, timeout)?,
        })
    }

    pub fn dispatcher(&self) -> &CallDispatcher {
        &self.dispatcher
    }

    /// Posts `message` to `room` (a `#channel`, `@user` or room id).
    pub async fn post_message(&self, room: &str, message: &ChatMessage) -> Result<()> {
        let body = serde_json::to_value(PostMessageRequest {
            channel: room,
            message,
        })?;

        self.call("post message", &ApiCall::CHAT_POST_MESSAGE, &QueryParams::new(), Some(body))
            .await?;

        info!("Posted message to {room}");
        Ok(())
    }

    /// The account the client is logged in as.
    pub async fn me(&self) -> Result<User> {
        let response = self
            .call("get own user", &ApiCall::ME, &QueryParams::new(), None)
            .await?;

        let id = response.id.ok_or_else(|| NotifierError::Api {
            operation: "get own user".to_string(),
            message: "response carried no user id".to_string(),
        })?;
        Ok(User {
            id,
            username: response.username,
            name: None,
        })
    }

    /// Public server information; does not log in.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        let response = self
            .call("get server info", &ApiCall::SERVER_INFO, &QueryParams::new(), None)
            .await?;
        missing(response.info, "get server info", "server info")
    }

    pub async fn user_info(&self, user_id: &str) -> Result<User> {
        let params = QueryParams::new().with(USER_ID_PARAM, user_id);
        let response = self
            .call("get user info", &ApiCall::USERS_INFO, &params, None)
            .await?;
        missing(response.user, "get user info", "user")
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        let response = self
            .call("list users", &ApiCall::USERS_LIST, &QueryParams::new(), None)
            .await?;
        missing(response.users, "list users", "users")
    }

    pub async fn channel_info(&self, room_name: &str) -> Result<Room> {
        let params = QueryParams::new().with(ROOM_NAME_PARAM, room_name.trim_start_matches('#'));
        let response = self
            .call("get channel info", &ApiCall::CHANNELS_INFO, &params, None)
            .await?;
        let room = response.room();
        missing(room, "get channel info", "channel")
    }

    pub async fn logout(&self) -> Result<()> {
        self.dispatcher.session().lock().await.logout().await
    }

    async fn call(
        &self,
        operation: &str,
        call: &ApiCall,
        params: &QueryParams,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let response = self.dispatcher.dispatch(call, params, body).await?;
        if !response.success {
            return Err(NotifierError::Api {
                operation: operation.to_string(),
                message: response.error_message(),
            });
        }
        Ok(response)
    }
}

fn missing<T>(value: Option<T>, operation: &str, what: &str) -> Result<T> {
    value.ok_or_else(|| NotifierError::Api {
        operation: operation.to_string(),
        message: format!("response carried no {what}"),
    })
}
