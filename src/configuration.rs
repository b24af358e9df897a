use serde::Deserialize;

/// Shortest accepted HS256 secret, in bytes
pub const MIN_JWT_SECRET_LEN: usize = 32;
/// Refresh cache budget when none is configured (100 MiB)
pub const DEFAULT_CACHE_CAPACITY: usize = 100 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("jwt.secret is required")]
    MissingJwtSecret,
    #[error("jwt.secret must be at least {MIN_JWT_SECRET_LEN} bytes, got {0}")]
    JwtSecretTooShort(usize),
}

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    #[serde(default)]
    pub listen: ListenSettings,
    pub storage: StorageSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub is_debug: bool,
    #[serde(default)]
    pub refresh_cache: RefreshCacheSettings,
    #[serde(default)]
    pub password: PasswordSettings,
}

impl Settings {
    /// Default log level, used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        if self.is_debug {
            "debug"
        } else {
            "info"
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListenType {
    /// UNIX domain socket next to the executable
    Sock,
    #[default]
    Port,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ListenSettings {
    #[serde(rename = "type", default)]
    pub kind: ListenType,
    #[serde(default = "default_bind_ip")]
    pub bind_ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            kind: ListenType::default(),
            bind_ip: default_bind_ip(),
            port: default_port(),
        }
    }
}

impl ListenSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_ip, self.port)
    }
}

fn default_bind_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl StorageSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        )
    }
}

/// JWT signing settings
#[derive(Deserialize, Clone, Debug)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,
}

impl JwtSettings {
    /// Resolved HS256 key material
    pub fn signing_key(&self) -> Result<&[u8], ConfigError> {
        let secret = self.secret.as_bytes();
        if secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::JwtSecretTooShort(secret.len()));
        }
        Ok(secret)
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct RefreshCacheSettings {
    pub capacity_bytes: usize,
}

impl Default for RefreshCacheSettings {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct PasswordSettings {
    /// bcrypt work factor; production deployments should raise it
    pub cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            cost: crate::auth::MIN_COST,
        }
    }
}

/// Load settings from `config.yaml` (or the file named by `APP_CONFIG`),
/// then apply `APP__SECTION__KEY` environment overrides.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());

    let settings = config::Config::builder()
        .add_source(config::File::with_name(&path))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;
    Ok(settings.try_deserialize::<Settings>()?)
}

/// Parse settings from an in-memory YAML document
pub fn parse_configuration(yaml: &str) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()?;
    Ok(settings.try_deserialize::<Settings>()?)
}
