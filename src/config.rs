use std::env;
use std::fmt;

pub const DEFAULT_PORT: u16 = 443;

/// Construction parameters of a [`RequestDispatcher`](crate::RequestDispatcher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Hostname or IP of the API server.
    server: String,
    /// Bearer credential attached to every request.
    api_token: String,
    port: u16,
    /// Whether TLS certificates are validated. Off by default.
    ssl_check: bool,
    /// 0 = errors only, 1 = warnings, 2 = info, 3+ = debug.
    verbose: u8,
    /// Replace all network I/O with an echo of the payload.
    simulation: bool,
}

impl DispatcherConfig {
    pub fn new(server: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            api_token: api_token.into(),
            port: DEFAULT_PORT,
            ssl_check: false,
            verbose: 0,
            simulation: false,
        }
    }

    /// Reads the configuration from `REST_SERVER`, `REST_API_TOKEN`, `REST_PORT`,
    /// `REST_SSL_CHECK`, `REST_VERBOSE` and `REST_SIMULATION`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let server = lookup("REST_SERVER").ok_or(ConfigError::Missing("REST_SERVER"))?;
        let api_token = lookup("REST_API_TOKEN").ok_or(ConfigError::Missing("REST_API_TOKEN"))?;
        let mut config = Self::new(server.trim(), api_token.trim());
        if let Some(port) = lookup("REST_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("REST_PORT", port.clone()))?;
        }
        if let Some(verbose) = lookup("REST_VERBOSE") {
            config.verbose = verbose
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("REST_VERBOSE", verbose.clone()))?;
        }
        if let Some(flag) = lookup("REST_SSL_CHECK") {
            config.ssl_check = parse_flag("REST_SSL_CHECK", &flag)?;
        }
        if let Some(flag) = lookup("REST_SIMULATION") {
            config.simulation = parse_flag("REST_SIMULATION", &flag)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_ssl_check(mut self, ssl_check: bool) -> Self {
        self.ssl_check = ssl_check;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_simulation(mut self, simulation: bool) -> Self {
        self.simulation = simulation;
        self
    }

    pub fn server(&self) -> &str { &self.server }
    pub fn api_token(&self) -> &str { &self.api_token }
    pub fn port(&self) -> u16 { self.port }
    pub fn ssl_check(&self) -> bool { self.ssl_check }
    pub fn verbose(&self) -> u8 { self.verbose }
    pub fn simulation(&self) -> bool { self.simulation }

    /// `https://{server}:{port}`
    pub fn base_url(&self) -> String { format!("https://{}:{}", self.server, self.port) }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid(key, value.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing environment variable {key}"),
            ConfigError::Invalid(key, value) => write!(f, "invalid value {value:?} for {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}
