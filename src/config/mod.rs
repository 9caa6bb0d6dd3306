use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_server: ServerConfig,
    pub redirect_server: ServerConfig,
    pub store: StoreConfig,
    #[serde(skip)]
    pub sweep: Option<SweepConfig>,
    /// Request header carrying a visitor location tag (e.g. Cloudflare's `cf-ipcountry`)
    pub location_header: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// TTL applied when a caller gives none, in minutes
    pub default_ttl_minutes: f64,
    /// Length of generated short codes
    pub code_length: usize,
    /// Longest code accepted or generated
    pub max_code_length: usize,
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub interval: std::time::Duration,
    /// How long an expired link stays listed before it may be swept. Never negative.
    pub retention: chrono::Duration,
}

impl StoreConfig {
    pub const DEFAULT_TTL_MINUTES: f64 = 30.0;
    pub const DEFAULT_CODE_LENGTH: usize = 6;
    pub const DEFAULT_MAX_CODE_LENGTH: usize = 32;

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.default_ttl_minutes.is_finite() || self.default_ttl_minutes <= 0.0 {
            bail!(
                "default TTL must be a positive number of minutes, got {}",
                self.default_ttl_minutes
            );
        }
        if self.code_length == 0 || self.code_length > self.max_code_length {
            bail!(
                "short code length must be between 1 and {}, got {}",
                self.max_code_length,
                self.code_length
            );
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl_minutes: Self::DEFAULT_TTL_MINUTES,
            code_length: Self::DEFAULT_CODE_LENGTH,
            max_code_length: Self::DEFAULT_MAX_CODE_LENGTH,
        }
    }
}

impl SweepConfig {
    const fn default_retention_secs() -> u64 {
        3600
    }

    pub fn new(interval_secs: u64, retention_secs: u64) -> anyhow::Result<Self> {
        let retention = i64::try_from(retention_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .with_context(|| {
                format!("SWEEP_RETENTION_SECS value {retention_secs} is out of range")
            })?;

        Ok(Self {
            interval: std::time::Duration::from_secs(interval_secs),
            retention,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = env_or("API_PORT", 8080u16)?;

        let redirect_host =
            std::env::var("REDIRECT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let redirect_port = env_or("REDIRECT_PORT", 3000u16)?;

        let store = StoreConfig {
            default_ttl_minutes: env_or("DEFAULT_TTL_MINUTES", StoreConfig::DEFAULT_TTL_MINUTES)?,
            code_length: env_or("SHORT_CODE_LENGTH", StoreConfig::DEFAULT_CODE_LENGTH)?,
            max_code_length: env_or("SHORT_CODE_MAX_LENGTH", StoreConfig::DEFAULT_MAX_CODE_LENGTH)?,
        };
        store.validate()?;

        let sweep = match std::env::var("SWEEP_INTERVAL_SECS").ok() {
            Some(raw) => {
                let interval_secs = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("SWEEP_INTERVAL_SECS has an invalid value '{raw}'"))?;
                if interval_secs == 0 {
                    tracing::warn!("SWEEP_INTERVAL_SECS is 0, expiry sweeping disabled");
                    None
                } else {
                    let retention_secs =
                        env_or("SWEEP_RETENTION_SECS", SweepConfig::default_retention_secs())?;
                    Some(SweepConfig::new(interval_secs, retention_secs)?)
                }
            }
            None => None,
        };

        let location_header = std::env::var("LOCATION_HEADER")
            .unwrap_or_else(|_| "cf-ipcountry".to_string())
            .to_lowercase();

        Ok(Config {
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            redirect_server: ServerConfig {
                host: redirect_host,
                port: redirect_port,
            },
            store,
            sweep,
            location_header,
        })
    }
}
