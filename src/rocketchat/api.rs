use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Static description of one REST operation.
///
/// `path` is relative to the `/api/` base and may contain positional
/// placeholders (`{0}`, `{1}`, ...) filled from the call's method arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiCall {
    pub path: &'static str,
    pub method: HttpMethod,
    pub requires_auth: bool,
}

impl ApiCall {
    pub const CHAT_POST_MESSAGE: Self = Self::post("v1/chat.postMessage");
    pub const ME: Self = Self::get("v1/me");
    pub const SERVER_INFO: Self = Self {
        requires_auth: false,
        ..Self::get("v1/info")
    };
    pub const USERS_INFO: Self = Self::get("v1/users.info");
    pub const USERS_LIST: Self = Self::get("v1/users.list");
    pub const CHANNELS_INFO: Self = Self::get("v1/channels.info");

    const fn get(path: &'static str) -> Self {
        Self {
            path,
            method: HttpMethod::Get,
            requires_auth: true,
        }
    }

    const fn post(path: &'static str) -> Self {
        Self {
            path,
            method: HttpMethod::Post,
            requires_auth: true,
        }
    }

    pub fn has_placeholders(&self) -> bool {
        self.path.contains('{') && self.path.contains('}')
    }

    /// Fills `{n}` placeholders from `args` by position.
    ///
    /// Returns `None` when a placeholder has no matching argument.
    pub fn resolve_path(&self, args: &[String]) -> Option<String> {
        let mut resolved = String::with_capacity(self.path.len());
        let mut rest = self.path;

        while let Some(open) = rest.find('{') {
            let close = open + rest[open..].find('}')?;
            let index: usize = rest[open + 1..close].trim().parse().ok()?;
            resolved.push_str(&rest[..open]);
            resolved.push_str(args.get(index)?);
            rest = &rest[close + 1..];
        }
        resolved.push_str(rest);

        Some(resolved)
    }
}

impl fmt::Display for ApiCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}
