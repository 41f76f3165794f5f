//! 身份认证委托 — 登录/登出/回调/用户信息全部交给外部身份提供方。
//!
//! Authentication is delegated. This module only maps the four routes under
//! the mount point (`/api/auth` by default) onto an [`IdentityProvider`];
//! sessions, tokens and credentials stay with the provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Error;

pub const DEFAULT_MOUNT: &str = "/api/auth";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRoute {
    Login,
    Logout,
    Callback,
    Me,
}

impl AuthRoute {
    pub const ALL: [AuthRoute; 4] = [Self::Login, Self::Logout, Self::Callback, Self::Me];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Callback => "callback",
            Self::Me => "me",
        }
    }
}

impl fmt::Display for AuthRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthRoute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            "callback" => Ok(Self::Callback),
            "me" => Ok(Self::Me),
            other => Err(Error::NotFound(format!("auth route '{}'", other))),
        }
    }
}

/// Incoming request data passed through to the provider untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthRequest {
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
}

/// Profile returned by the provider's `me` route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Avatar fallback: first character of the name.
    pub fn initial(&self) -> Option<char> {
        self.name.as_deref().and_then(|n| n.trim().chars().next())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResponse {
    Redirect { location: String },
    Profile(UserProfile),
    Unauthorized,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn handle(&self, route: AuthRoute, request: &AuthRequest) -> crate::Result<AuthResponse>;
}

/// Routes `<mount>/<route>` paths to an identity provider.
#[derive(Clone)]
pub struct AuthRouter {
    mount: String,
    provider: Arc<dyn IdentityProvider>,
}

impl AuthRouter {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_mount(DEFAULT_MOUNT, provider)
    }

    pub fn with_mount(mount: impl Into<String>, provider: Arc<dyn IdentityProvider>) -> Self {
        let mount = mount.into().trim_end_matches('/').to_string();
        Self { mount, provider }
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Full path for `route`, e.g. `/api/auth/login`.
    pub fn path_for(&self, route: AuthRoute) -> String {
        format!("{}/{}", self.mount, route)
    }

    /// Resolve `path` (query string allowed) to a route.
    pub fn resolve(&self, path: &str) -> crate::Result<AuthRoute> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let rest = path
            .strip_prefix(self.mount.as_str())
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| Error::NotFound(format!("path '{}' is outside {}", path, self.mount)))?;
        rest.trim_end_matches('/').parse()
    }

    pub async fn dispatch(&self, path: &str, request: &AuthRequest) -> crate::Result<AuthResponse> {
        let route = self.resolve(path)?;
        tracing::debug!(%route, "delegating auth route to identity provider");
        self.provider.handle(route, request).await
    }
}

impl fmt::Debug for AuthRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthRouter")
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_round_trip() {
        for route in AuthRoute::ALL {
            assert_eq!(route.as_str().parse::<AuthRoute>().unwrap(), route);
        }
        assert!(matches!("signup".parse::<AuthRoute>(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_profile_initial() {
        let profile = UserProfile {
            name: Some("Patricia".into()),
            ..UserProfile::default()
        };
        assert_eq!(profile.initial(), Some('P'));
        assert_eq!(UserProfile::default().initial(), None);
        let blank = UserProfile {
            name: Some("  ".into()),
            ..UserProfile::default()
        };
        assert_eq!(blank.initial(), None);
    }

    #[test]
    fn test_profile_deserializes_provider_payload() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"name":"Paul","picture":"https://cdn.example/p.png","sub":"auth0|1"}"#,
        )
        .unwrap();
        assert_eq!(profile.name.as_deref(), Some("Paul"));
        assert!(profile.email.is_none());
    }
}
