use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADMIN_SECRET: &str = "changeme";

/// Discord OAuth2 application credentials.
#[derive(Debug, Clone, Default)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl DiscordConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.redirect_uri.is_empty()
    }
}

/// Runtime configuration, loaded once at startup and handed to each service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Root for `posts/posts.json`, `posts/site.json` and `users/users.json`.
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub admin_secret: String,
    pub session_secret: String,
    pub discord: DiscordConfig,
    pub preview_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5173,
            data_dir: PathBuf::from("."),
            static_dir: PathBuf::from("static"),
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            session_secret: "dev".to_string(),
            discord: DiscordConfig {
                redirect_uri: "http://localhost:5173/callback".to_string(),
                ..DiscordConfig::default()
            },
            preview_timeout: Duration::from_secs(6),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Parse a `MAX_UPLOAD_MB` value into bytes.
fn upload_cap_bytes(raw: &str) -> Result<usize, String> {
    let mb: usize = raw
        .trim()
        .parse()
        .map_err(|_| "MAX_UPLOAD_MB must be a whole number".to_string())?;
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| format!("MAX_UPLOAD_MB is too large: {}", mb))
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, String> {
        let defaults = AppConfig::default();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT must be a valid port number, got {:?}", raw))?,
            Err(_) => defaults.port,
        };
        let preview_timeout = match env::var("PREVIEW_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .map_err(|_| "PREVIEW_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            Err(_) => defaults.preview_timeout,
        };
        let max_upload_bytes = match env::var("MAX_UPLOAD_MB") {
            Ok(raw) => upload_cap_bytes(&raw)?,
            Err(_) => defaults.max_upload_bytes,
        };

        Ok(AppConfig {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            admin_secret: env::var("ADMIN_SECRET").unwrap_or(defaults.admin_secret),
            session_secret: env::var("SECRET_KEY").unwrap_or(defaults.session_secret),
            discord: DiscordConfig {
                client_id: env::var("DISCORD_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("DISCORD_CLIENT_SECRET").unwrap_or_default(),
                redirect_uri: env::var("DISCORD_REDIRECT_URI")
                    .unwrap_or(defaults.discord.redirect_uri),
            },
            preview_timeout,
            max_upload_bytes,
        })
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.static_dir.join("uploads")
    }

    pub fn uses_default_admin_secret(&self) -> bool {
        self.admin_secret == DEFAULT_ADMIN_SECRET
    }
}
