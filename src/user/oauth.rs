use reqwest::Url;
use serde::Deserialize;

use crate::config::DiscordConfig;
use crate::user::model::DiscordUser;
use crate::utils::error::CustomError;

const AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const ME_URL: &str = "https://discord.com/api/users/@me";
const SCOPE: &str = "identify";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// Minimal OAuth2 authorization-code client for Discord's `identify` scope.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    config: DiscordConfig,
    client: reqwest::Client,
}

impl DiscordClient {
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn authorize_url(&self) -> Result<String, CustomError> {
        let url = Url::parse_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| CustomError::InternalServerError(format!("Bad authorize URL: {}", e)))?;
        Ok(url.to_string())
    }

    /// Trade an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, CustomError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", SCOPE),
        ];

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| CustomError::BadRequestError(format!("OAuth failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(CustomError::BadRequestError("OAuth failed".to_string()));
        }

        response
            .json::<TokenResponse>()
            .await
            .ok()
            .and_then(|t| t.access_token)
            .ok_or_else(|| CustomError::BadRequestError("OAuth failed".to_string()))
    }

    pub async fn fetch_user(&self, access_token: &str) -> Result<DiscordUser, CustomError> {
        let response = self
            .client
            .get(ME_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CustomError::BadRequestError(format!("OAuth user fetch failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(CustomError::BadRequestError(
                "OAuth user fetch failed".to_string(),
            ));
        }

        response
            .json::<DiscordUser>()
            .await
            .map_err(|e| CustomError::BadRequestError(format!("OAuth user fetch failed: {}", e)))
    }
}
