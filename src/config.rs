use serde::{Deserialize, Serialize};
use crate::o_info;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Cargo usage below which a docked ship goes mining instead of selling
pub const DEFAULT_SELL_THRESHOLD: f64 = 10.0;

pub const DEFAULT_CONFIG_PATH: &str = "simeis_config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimeisConfig {
    pub server: ServerConfig,
    pub timing: TimingConfig,
    pub policy: PolicyConfig,
    pub market: MarketConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the game server, without trailing slash
    pub url: String,
    /// Upper bound for a single request, in seconds
    pub request_timeout_seconds: f64,
    /// Append every request/reply pair to `api_log_path`
    pub api_logging: bool,
    pub api_log_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Pause between two scheduler ticks
    pub tick_delay_seconds: f64,
    /// Pause after a tick that failed before reaching any ship
    pub error_retry_delay_seconds: f64,
    /// First poll interval while waiting for a ship to settle
    pub idle_poll_seconds: f64,
    /// Poll interval ceiling for the exponential backoff
    pub max_poll_seconds: f64,
    /// Give up waiting on a ship after this long (retried next tick)
    pub max_wait_seconds: f64,
    pub config_reload_interval_seconds: u64,
    /// How long worker tasks get to finish once a stop is requested
    pub shutdown_grace_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Docked ships with less cargo than this go mining, others sell first
    pub sell_threshold: f64,
    /// Shipyard upgrades worth buying, matched against the offered catalog
    pub ship_upgrades: Vec<String>,
    /// Buy the cheapest ship when the player owns none
    pub buy_first_ship: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub enabled: bool,
    pub poll_interval_seconds: f64,
    /// Report resources priced above this percentage of their base price
    pub high_percent: f64,
    /// Report resources priced below this percentage of their base price
    pub low_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `<username>.json` session records
    pub session_dir: String,
}

impl Default for SimeisConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                url: "http://127.0.0.1:8081".to_string(),
                request_timeout_seconds: 1.0,
                api_logging: false,
                api_log_path: "api_debug.log".to_string(),
            },
            timing: TimingConfig {
                tick_delay_seconds: 1.0,
                error_retry_delay_seconds: 5.0,
                idle_poll_seconds: 2.0,
                max_poll_seconds: 30.0,
                max_wait_seconds: 3600.0,
                config_reload_interval_seconds: 30,
                shutdown_grace_seconds: 5.0,
            },
            policy: PolicyConfig {
                sell_threshold: DEFAULT_SELL_THRESHOLD,
                ship_upgrades: vec!["ReactorUpgrade".to_string(), "CargoExpansion".to_string()],
                buy_first_ship: true,
            },
            market: MarketConfig {
                enabled: true,
                poll_interval_seconds: 5.0,
                high_percent: 110.0,
                low_percent: 90.0,
            },
            storage: StorageConfig {
                session_dir: ".".to_string(),
            },
        }
    }
}

impl TimingConfig {
    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs_f64(self.idle_poll_seconds)
    }

    pub fn max_poll(&self) -> Duration {
        Duration::from_secs_f64(self.max_poll_seconds)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs_f64(self.max_wait_seconds)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_secs_f64(self.tick_delay_seconds)
    }

    pub fn error_retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.error_retry_delay_seconds)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs_f64(self.shutdown_grace_seconds)
    }
}

impl SimeisConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(config_path).exists() {
            o_info!("📋 Loading configuration from {}", config_path);
            let config_str = fs::read_to_string(config_path)?;
            let config: SimeisConfig = toml::from_str(&config_str)?;
            Ok(config)
        } else {
            o_info!("📋 Creating default configuration at {}", config_path);
            let config = SimeisConfig::default();
            config.save(config_path)?;
            o_info!("💡 Edit {} to customize bot behavior", config_path);
            Ok(config)
        }
    }

    pub fn save(&self, config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = Path::new(config_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.url.trim().is_empty() {
            return Err("server.url must not be empty".to_string());
        }
        let timings = [
            ("request_timeout_seconds", self.server.request_timeout_seconds),
            ("tick_delay_seconds", self.timing.tick_delay_seconds),
            ("error_retry_delay_seconds", self.timing.error_retry_delay_seconds),
            ("idle_poll_seconds", self.timing.idle_poll_seconds),
            ("max_poll_seconds", self.timing.max_poll_seconds),
            ("max_wait_seconds", self.timing.max_wait_seconds),
            ("shutdown_grace_seconds", self.timing.shutdown_grace_seconds),
            ("poll_interval_seconds", self.market.poll_interval_seconds),
        ];
        for (name, value) in timings {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{} must be a positive number of seconds", name));
            }
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(format!("{} is too large", name));
            }
        }
        if self.timing.max_poll_seconds < self.timing.idle_poll_seconds {
            return Err("max_poll_seconds must not be below idle_poll_seconds".to_string());
        }

        if self.policy.sell_threshold < 0.0 {
            return Err("sell_threshold must not be negative".to_string());
        }
        if self.market.low_percent >= self.market.high_percent {
            return Err("market.low_percent must be below market.high_percent".to_string());
        }

        o_info!("✅ Configuration validation passed");
        Ok(())
    }

    pub fn print_summary(&self) {
        o_info!("📋 Configuration Summary:");
        o_info!("   🌐 Server: {} (timeout {:.1}s)", self.server.url, self.server.request_timeout_seconds);
        o_info!("   📦 Sell threshold: {} cargo units", self.policy.sell_threshold);
        o_info!("   🔧 Ship upgrades of interest: {:?}", self.policy.ship_upgrades);
        o_info!("   ⏰ Tick delay: {:.1}s, idle poll {:.1}s", self.timing.tick_delay_seconds, self.timing.idle_poll_seconds);
        o_info!("   📈 Price watch: {} every {:.1}s", if self.market.enabled { "on" } else { "off" }, self.market.poll_interval_seconds);
    }
}

/// Hot-reloadable configuration manager
#[derive(Debug)]
pub struct ConfigManager {
    config: SimeisConfig,
    config_path: Option<String>,
    last_modified: Option<SystemTime>,
    last_reload_check: SystemTime,
}

impl ConfigManager {
    pub fn new(config_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = SimeisConfig::load_or_create(config_path)?;
        config.validate()?;
        config.print_summary();

        let last_modified = fs::metadata(config_path)
            .and_then(|m| m.modified())
            .ok();

        Ok(Self {
            config,
            config_path: Some(config_path.to_string()),
            last_modified,
            last_reload_check: SystemTime::now(),
        })
    }

    /// Manager around a fixed config that never reloads
    pub fn in_memory(config: SimeisConfig) -> Self {
        Self {
            config,
            config_path: None,
            last_modified: None,
            last_reload_check: SystemTime::now(),
        }
    }

    pub fn config(&self) -> &SimeisConfig {
        &self.config
    }

    /// Check if config should be reloaded and do so if needed
    pub fn check_and_reload(&mut self) -> bool {
        let Some(config_path) = self.config_path.clone() else {
            return false;
        };

        let now = SystemTime::now();
        let reload_interval = Duration::from_secs(self.config.timing.config_reload_interval_seconds);
        if now.duration_since(self.last_reload_check).unwrap_or_default() < reload_interval {
            return false;
        }
        self.last_reload_check = now;

        if let Ok(modified) = fs::metadata(&config_path).and_then(|m| m.modified()) {
            if Some(modified) != self.last_modified {
                return self.reload_config(&config_path, modified);
            }
        }

        false
    }

    fn reload_config(&mut self, config_path: &str, new_modified_time: SystemTime) -> bool {
        let new_config = match SimeisConfig::load_or_create(config_path) {
            Ok(config) => config,
            Err(e) => {
                o_info!("⚠️ Failed to reload configuration, keeping current config: {}", e);
                return false;
            }
        };

        if let Err(e) = new_config.validate() {
            o_info!("⚠️ Invalid configuration detected, keeping current config: {}", e);
            return false;
        }

        let old_values = format!("threshold: {}, tick: {}s", self.config.policy.sell_threshold, self.config.timing.tick_delay_seconds);
        self.config = new_config;
        self.last_modified = Some(new_modified_time);
        let new_values = format!("threshold: {}, tick: {}s", self.config.policy.sell_threshold, self.config.timing.tick_delay_seconds);

        o_info!("🔄 Configuration reloaded successfully!");
        if old_values != new_values {
            o_info!("   📝 Changes: {} → {}", old_values, new_values);
        }
        true
    }
}
