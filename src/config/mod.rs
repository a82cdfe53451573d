//! Runtime configuration loaded from the environment (and `.env`).

pub mod thresholds;

pub use thresholds::{
    AlertConfig, IndicatorConfig, SignalPolicy, SignalThresholds, MAX_HIGH_LOOKBACK_DAYS,
};

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::models::signal::Recommendation;

/// Shortest refresh interval accepted for watchlist evaluation
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_WATCHLIST: &str = "AAPL, TSLA, NVDA, ZGLD.TO";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("history window {range}/{interval} yields ~{bars} bars, need at least {required}")]
    HistoryTooShort {
        range: String,
        interval: String,
        bars: usize,
        required: usize,
    },
}

/// Messaging transport credentials
#[derive(Debug, Clone, PartialEq)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Alert recipient and the only identity allowed to send commands
    pub chat_id: String,
    pub api_url: String,
}

/// Bounded history request sent to the market-data provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    pub range: String,
    pub interval: String,
}

impl HistoryWindow {
    /// Rough count of bars the window yields over regular trading sessions
    pub fn estimated_bars(&self) -> Option<usize> {
        let trading_days: f64 = match self.range.as_str() {
            "1d" => 1.0,
            "5d" => 5.0,
            "1mo" => 21.0,
            "3mo" => 63.0,
            "6mo" => 126.0,
            "1y" => 252.0,
            "2y" => 504.0,
            "5y" => 1260.0,
            _ => return None,
        };
        let bars_per_day: f64 = match self.interval.as_str() {
            "1m" => 390.0,
            "2m" => 195.0,
            "5m" => 78.0,
            "15m" => 26.0,
            "30m" => 13.0,
            "60m" | "1h" => 7.0,
            "1d" => 1.0,
            "5d" => 0.2,
            "1wk" => 0.2,
            _ => return None,
        };
        Some((trading_days * bars_per_day).floor() as usize)
    }

    pub fn validate(&self, required: usize) -> Result<(), ConfigError> {
        let bars = self.estimated_bars().ok_or_else(|| ConfigError::InvalidValue {
            key: "HISTORY_RANGE/BAR_INTERVAL".to_string(),
            reason: format!("unsupported window {}/{}", self.range, self.interval),
        })?;
        if bars < required {
            return Err(ConfigError::HistoryTooShort {
                range: self.range.clone(),
                interval: self.interval.clone(),
                bars,
                required,
            });
        }
        Ok(())
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self {
            range: "1mo".to_string(),
            interval: "1h".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    pub telegram: TelegramConfig,
    pub market_data_url: String,
    pub watchlist: Vec<String>,
    pub refresh_interval: Duration,
    pub history: HistoryWindow,
    pub indicators: IndicatorConfig,
    pub thresholds: SignalThresholds,
    pub policy: SignalPolicy,
    pub alerts: AlertConfig,
    pub start_active: bool,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let indicators = IndicatorConfig {
            rsi_period: vars.parse("RSI_PERIOD", 14)?,
            adx_period: vars.parse("ADX_PERIOD", 14)?,
            sma_period: vars.parse("SMA_PERIOD", 50)?,
            high_lookback_days: vars.parse("HIGH_LOOKBACK_DAYS", 3)?,
        };
        for (key, value) in [
            ("RSI_PERIOD", indicators.rsi_period),
            ("ADX_PERIOD", indicators.adx_period),
            ("SMA_PERIOD", indicators.sma_period),
            ("HIGH_LOOKBACK_DAYS", indicators.high_lookback_days),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        if indicators.high_lookback_days > MAX_HIGH_LOOKBACK_DAYS {
            return Err(ConfigError::InvalidValue {
                key: "HIGH_LOOKBACK_DAYS".to_string(),
                reason: format!("must be at most {}", MAX_HIGH_LOOKBACK_DAYS),
            });
        }

        let history = HistoryWindow {
            range: vars.string("HISTORY_RANGE", "1mo"),
            interval: vars.string("BAR_INTERVAL", "1h"),
        };
        history.validate(indicators.min_points())?;

        let thresholds = SignalThresholds {
            buy_drop_pct: vars.parse("BUY_DROP_PCT", 5.0)?,
            buy_rsi_ceiling: vars.parse("BUY_RSI_CEILING", 30.0)?,
            min_adx: vars.parse("MIN_ADX", 25.0)?,
            sell_gain_pct: vars.parse("SELL_GAIN_PCT", 5.0)?,
            sell_rsi_floor: vars.parse("SELL_RSI_FLOOR", 70.0)?,
            breakdown_buffer_pct: vars.parse("BREAKDOWN_BUFFER_PCT", 2.0)?,
        };

        let (triggers, on_drop) = parse_triggers(&vars.string("ALERT_ON", "BUY,STRONG_SELL"))?;
        let score_threshold: u8 = vars.parse("ALERT_SCORE_THRESHOLD", 7)?;
        let alerts = AlertConfig {
            triggers,
            on_drop,
            score_threshold,
            cooldown_seconds: vars.parse("ALERT_COOLDOWN_SECONDS", 0)?,
        };

        let refresh_secs: u64 = vars.parse("REFRESH_INTERVAL_SECONDS", 120)?;

        Ok(Self {
            environment: vars.string("ENVIRONMENT", "sandbox"),
            port: vars.parse("PORT", 8080)?,
            telegram: TelegramConfig {
                bot_token: vars.string("TELEGRAM_BOT_TOKEN", ""),
                chat_id: vars.string("TELEGRAM_CHAT_ID", "").trim().to_string(),
                api_url: vars.string("TELEGRAM_API_URL", "https://api.telegram.org"),
            },
            market_data_url: vars.string("MARKET_DATA_URL", "https://query1.finance.yahoo.com"),
            watchlist: parse_watchlist(&vars.string("WATCHLIST", DEFAULT_WATCHLIST)),
            refresh_interval: clamp_refresh_interval(Duration::from_secs(refresh_secs)),
            history,
            indicators,
            thresholds,
            policy: vars.parse("SIGNAL_POLICY", SignalPolicy::default())?,
            alerts,
            start_active: vars.parse("START_ACTIVE", false)?,
        })
    }

    pub fn messaging_enabled(&self) -> bool {
        !self.telegram.bot_token.is_empty() && !self.telegram.chat_id.is_empty()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: 8080,
            telegram: TelegramConfig {
                bot_token: String::new(),
                chat_id: String::new(),
                api_url: "https://api.telegram.org".to_string(),
            },
            market_data_url: "https://query1.finance.yahoo.com".to_string(),
            watchlist: parse_watchlist(DEFAULT_WATCHLIST),
            refresh_interval: Duration::from_secs(120),
            history: HistoryWindow::default(),
            indicators: IndicatorConfig::default(),
            thresholds: SignalThresholds::default(),
            policy: SignalPolicy::default(),
            alerts: AlertConfig::default(),
            start_active: false,
        }
    }
}

/// Split a comma separated watchlist into trimmed, upper-cased, unique symbols
pub fn parse_watchlist(raw: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for symbol in raw.split(',').map(|s| s.trim().to_uppercase()) {
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }
    symbols
}

pub fn clamp_refresh_interval(interval: Duration) -> Duration {
    interval.max(Duration::from_secs(MIN_REFRESH_INTERVAL_SECS))
}

/// `ALERT_ON` entries are recommendations, plus `DROP` for severe pullbacks
fn parse_triggers(raw: &str) -> Result<(Vec<Recommendation>, bool), ConfigError> {
    let mut triggers = Vec::new();
    let mut on_drop = false;
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if entry.eq_ignore_ascii_case("DROP") {
            on_drop = true;
            continue;
        }
        let recommendation =
            entry
                .parse::<Recommendation>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "ALERT_ON".to_string(),
                    reason,
                })?;
        triggers.push(recommendation);
    }
    Ok((triggers, on_drop))
}

struct Vars<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.0)(key)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.0)(key).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
