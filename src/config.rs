use std::env;
use std::time::Duration;
use anyhow::{Context, Result};

pub const DEFAULT_PHOTO_BUCKET: &str = "gambarkeluhan";

#[derive(Clone, Debug)]
pub struct Settings {
    pub supabase_url: String,
    pub service_role_key: String,
    pub anon_key: Option<String>,
    pub photo_bucket: String,
    pub session_secret: String,
    pub session_ttl: chrono::Duration,
    pub http_timeout: Duration,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Read settings from the process environment. Call `dotenv` first if a
    /// `.env` file should be honoured.
    pub fn from_env() -> Result<Self> {
        let supabase_url = env::var("SUPABASE_URL")
            .context("SUPABASE_URL not set")?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let service_role_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .context("SUPABASE_SERVICE_ROLE_KEY not set")?
            .trim()
            .to_string();
        let anon_key = env::var("SUPABASE_ANON_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let session_secret = env::var("SESSION_SECRET").context("SESSION_SECRET not set")?;

        let photo_bucket = env::var("PHOTO_BUCKET")
            .unwrap_or_else(|_| DEFAULT_PHOTO_BUCKET.to_string());

        let ttl_hours: i64 = parse_or("SESSION_TTL_HOURS", 12)?;
        let timeout_secs: u64 = parse_or("HTTP_TIMEOUT_SECS", 10)?;
        let port: u16 = parse_or("PORT", 8080)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            supabase_url,
            service_role_key,
            anon_key,
            photo_bucket,
            session_secret,
            session_ttl: chrono::Duration::hours(ttl_hours),
            http_timeout: Duration::from_secs(timeout_secs),
            port,
            allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        _ => Ok(default),
    }
}

/// Shorten a secret for log output.
pub fn mask_key(k: &str) -> String {
    let chars: Vec<char> = k.chars().collect();
    if chars.len() <= 8 { return "[REDACTED]".to_string(); }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}
