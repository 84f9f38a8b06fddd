//! Configuration for the ticket ledger

use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Actor mailbox capacity (bounded for backpressure)
    pub mailbox_capacity: usize,

    /// Proof-of-work configuration
    pub pow: PowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "ticket-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            mailbox_capacity: 1000,
            pow: PowConfig::default(),
        }
    }
}

/// Proof-of-work configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowConfig {
    /// Gate commits behind a proof-of-work search
    pub enabled: bool,

    /// Required number of leading hex zeros in the proof digest
    pub difficulty: usize,

    /// Upper bound on the proof search; exhaustion is a retryable error
    pub max_iterations: u64,
}

impl Default for PowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            difficulty: 4,           // four hex zeros, ~65k candidates on average
            max_iterations: 10_000_000,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(enabled) = std::env::var("TICKET_LEDGER_POW_ENABLED") {
            config.pow.enabled = enabled
                .parse()
                .map_err(|_| crate::Error::Config("TICKET_LEDGER_POW_ENABLED must be a bool".to_string()))?;
        }

        if let Ok(difficulty) = std::env::var("TICKET_LEDGER_POW_DIFFICULTY") {
            config.pow.difficulty = difficulty
                .parse()
                .map_err(|_| crate::Error::Config("TICKET_LEDGER_POW_DIFFICULTY must be an integer".to_string()))?;
        }

        if let Ok(max_iterations) = std::env::var("TICKET_LEDGER_POW_MAX_ITERATIONS") {
            config.pow.max_iterations = max_iterations
                .parse()
                .map_err(|_| crate::Error::Config("TICKET_LEDGER_POW_MAX_ITERATIONS must be an integer".to_string()))?;
        }

        if let Ok(capacity) = std::env::var("TICKET_LEDGER_MAILBOX_CAPACITY") {
            config.mailbox_capacity = capacity
                .parse()
                .map_err(|_| crate::Error::Config("TICKET_LEDGER_MAILBOX_CAPACITY must be an integer".to_string()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check bounds that would otherwise surface as panics deep in the core
    pub fn validate(&self) -> crate::Result<()> {
        if self.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "mailbox_capacity must be at least 1".to_string(),
            ));
        }

        // A SHA-256 digest is 64 hex chars; more leading zeros than that
        // can never be satisfied
        if self.pow.difficulty > 64 {
            return Err(crate::Error::Config(
                "pow.difficulty must be at most 64".to_string(),
            ));
        }

        if self.pow.max_iterations == 0 {
            return Err(crate::Error::Config(
                "pow.max_iterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
