use serde::Deserialize;

/// Generic Rocket.Chat REST reply.
///
/// Every endpoint answers with a `success` flag and an optional `error`;
/// the payload sits under an endpoint-specific key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiResponse {
    pub success: bool,
    pub error: Option<String>,
    pub message: Option<serde_json::Value>,
    pub user: Option<User>,
    pub users: Option<Vec<User>>,
    /// A room object from `channels.info`, a plain name from `chat.postMessage`
    pub channel: Option<serde_json::Value>,
    pub info: Option<ServerInfo>,
    pub data: Option<AuthData>,
    /// `me` returns the user fields at the top level
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub auth_token: String,
    pub user_id: String,
}

impl ApiResponse {
    pub fn room(&self) -> Option<Room> {
        self.channel
            .as_ref()
            .filter(|channel| channel.is_object())
            .and_then(|channel| serde_json::from_value(channel.clone()).ok())
    }

    /// The backend's error text, or a placeholder when it sent none.
    ///
    /// Authorization failures carry their text in `message` rather than `error`.
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| {
                self.message
                    .as_ref()
                    .and_then(|message| message.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "no error message returned".to_string())
    }
}
