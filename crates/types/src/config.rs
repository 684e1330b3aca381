//! Configuration structs with serde defaults.
//!
//! Every field can be omitted from JSON; missing values fall back to the
//! `default_*` functions below.

use crate::error::CoreError;

// ============================================
// ENGINE
// ============================================

/// Decision-engine configuration (network, policy, confidence)
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Target-correction rate of the single-step training rule
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Exploration probability in [0,1]
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Minimum max(Q) required to act
    #[serde(default = "default_action_threshold")]
    pub action_threshold: f64,
    /// Hidden layer width
    #[serde(default = "default_hidden_units")]
    pub hidden_units: usize,
    /// Iterations after which the experience factor saturates
    #[serde(default = "default_experience_cap")]
    pub experience_cap: u64,
    /// RNG seed for weight init and exploration
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

fn default_learning_rate() -> f64 {
    0.1
}
fn default_epsilon() -> f64 {
    0.1
}
fn default_action_threshold() -> f64 {
    0.55
}
fn default_hidden_units() -> usize {
    16
}
fn default_experience_cap() -> u64 {
    500
}
fn default_rng_seed() -> u64 {
    42
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            epsilon: default_epsilon(),
            action_threshold: default_action_threshold(),
            hidden_units: default_hidden_units(),
            experience_cap: default_experience_cap(),
            rng_seed: default_rng_seed(),
        }
    }
}

impl EngineConfig {
    /// Validates ranges.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(CoreError::InvalidConfig(format!(
                "epsilon must be in [0, 1], got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.action_threshold) {
            return Err(CoreError::InvalidConfig(format!(
                "action_threshold must be in [0, 1], got {}",
                self.action_threshold
            )));
        }
        if self.hidden_units == 0 {
            return Err(CoreError::InvalidConfig(
                "hidden_units must be > 0".to_string(),
            ));
        }
        if self.experience_cap == 0 {
            return Err(CoreError::InvalidConfig(
                "experience_cap must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================
// FEATURES
// ============================================

/// Normalization parameters of the feature extractor
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureConfig {
    /// ATR/close ratio mapped to 1.0
    #[serde(default = "default_volatility_ceiling")]
    pub volatility_ceiling: f64,
    /// Bars back for the momentum reference close
    #[serde(default = "default_momentum_lookback")]
    pub momentum_lookback: usize,
    /// Multiplier applied to the rate of change around 0.5
    #[serde(default = "default_momentum_scale")]
    pub momentum_scale: f64,
}

fn default_volatility_ceiling() -> f64 {
    0.05
}
fn default_momentum_lookback() -> usize {
    10
}
fn default_momentum_scale() -> f64 {
    5.0
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            volatility_ceiling: default_volatility_ceiling(),
            momentum_lookback: default_momentum_lookback(),
            momentum_scale: default_momentum_scale(),
        }
    }
}

impl FeatureConfig {
    /// Validates the normalization constants.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] for a non-positive ceiling or scale,
    /// or a zero momentum lookback.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.volatility_ceiling.is_nan() || self.volatility_ceiling <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "volatility_ceiling must be > 0, got {}",
                self.volatility_ceiling
            )));
        }
        if self.momentum_lookback == 0 {
            return Err(CoreError::InvalidConfig(
                "momentum_lookback must be > 0".to_string(),
            ));
        }
        if self.momentum_scale.is_nan() || self.momentum_scale <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "momentum_scale must be > 0, got {}",
                self.momentum_scale
            )));
        }
        Ok(())
    }
}

// ============================================
// RISK
// ============================================

/// One rung of the break-even / trailing ladder (fractions of entry price)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrailingLevel {
    /// Favorable move that activates the rung
    pub trigger_pct: f64,
    /// New stop as offset from entry in the trade direction
    pub stop_offset_pct: f64,
    /// New target as offset from entry, if the rung moves it
    #[serde(default)]
    pub target_pct: Option<f64>,
}

/// Break-even / trailing stop configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrailingConfig {
    /// Enable the ladder
    #[serde(default)]
    pub enabled: bool,
    /// Rungs, ascending by trigger
    #[serde(default = "default_trailing_levels")]
    pub levels: Vec<TrailingLevel>,
}

fn default_trailing_levels() -> Vec<TrailingLevel> {
    vec![
        TrailingLevel {
            trigger_pct: 0.002,
            stop_offset_pct: 0.0,
            target_pct: None,
        },
        TrailingLevel {
            trigger_pct: 0.005,
            stop_offset_pct: 0.001,
            target_pct: Some(0.02),
        },
        TrailingLevel {
            trigger_pct: 0.01,
            stop_offset_pct: 0.005,
            target_pct: Some(0.03),
        },
    ]
}

impl Default for TrailingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            levels: default_trailing_levels(),
        }
    }
}

/// Risk / sizing configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskConfig {
    /// Fraction of balance risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
    /// ATR multiple used as stop distance
    #[serde(default = "default_stop_atr_multiple")]
    pub stop_atr_multiple: f64,
    /// Target distance as a multiple of stop distance
    #[serde(default = "default_reward_multiple")]
    pub reward_multiple: f64,
    /// Signals below this risk:reward are not accepted
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: f64,
    /// Stop distance as fraction of price when ATR is unavailable
    #[serde(default = "default_fallback_stop_pct")]
    pub fallback_stop_pct: f64,
    /// Break-even / trailing ladder
    #[serde(default)]
    pub trailing: TrailingConfig,
}

fn default_risk_per_trade() -> f64 {
    0.01
}
fn default_stop_atr_multiple() -> f64 {
    1.5
}
fn default_reward_multiple() -> f64 {
    3.0
}
fn default_min_risk_reward() -> f64 {
    1.0
}
fn default_fallback_stop_pct() -> f64 {
    0.005
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            stop_atr_multiple: default_stop_atr_multiple(),
            reward_multiple: default_reward_multiple(),
            min_risk_reward: default_min_risk_reward(),
            fallback_stop_pct: default_fallback_stop_pct(),
            trailing: TrailingConfig::default(),
        }
    }
}

impl RiskConfig {
    /// Validates ranges.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "risk_per_trade must be in (0, 1], got {}",
                self.risk_per_trade
            )));
        }
        if self.stop_atr_multiple <= 0.0 || self.reward_multiple <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "stop_atr_multiple and reward_multiple must be > 0".to_string(),
            ));
        }
        if !(self.fallback_stop_pct > 0.0 && self.fallback_stop_pct < 1.0) {
            return Err(CoreError::InvalidConfig(format!(
                "fallback_stop_pct must be in (0, 1), got {}",
                self.fallback_stop_pct
            )));
        }
        if self
            .trailing
            .levels
            .windows(2)
            .any(|w| w[1].trigger_pct <= w[0].trigger_pct)
        {
            return Err(CoreError::InvalidConfig(
                "trailing levels must be strictly ascending by trigger_pct".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================
// INDICATORS / PRE-FILTER
// ============================================

/// Indicator periods
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorConfig {
    /// RSI period
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,
    /// Fast EMA span
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,
    /// Slow EMA span
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,
    /// SMA window
    #[serde(default = "default_sma_period")]
    pub sma_period: usize,
    /// ATR period
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,
    /// Bollinger window
    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    /// Bollinger standard-deviation factor
    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,
    /// Rolling high/low window for support and resistance
    #[serde(default = "default_structure_lookback")]
    pub structure_lookback: usize,
}

fn default_rsi_period() -> usize {
    14
}
fn default_ema_fast() -> usize {
    20
}
fn default_ema_slow() -> usize {
    200
}
fn default_sma_period() -> usize {
    50
}
fn default_atr_period() -> usize {
    14
}
fn default_bollinger_period() -> usize {
    20
}
fn default_bollinger_std() -> f64 {
    2.0
}
fn default_structure_lookback() -> usize {
    50
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            sma_period: default_sma_period(),
            atr_period: default_atr_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_std: default_bollinger_std(),
            structure_lookback: default_structure_lookback(),
        }
    }
}

impl IndicatorConfig {
    /// Bars needed before every indicator produces a value.
    #[must_use]
    pub fn longest_window(&self) -> usize {
        [
            self.rsi_period + 1,
            self.ema_fast,
            self.ema_slow,
            self.sma_period,
            self.atr_period + 1,
            self.bollinger_period,
            self.structure_lookback,
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
    }

    /// Trailing window handed to indicator computation for one bar.
    #[must_use]
    pub fn history_window(&self) -> usize {
        self.longest_window() * 2
    }

    /// Validates periods.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.rsi_period < 2 {
            return Err(CoreError::InvalidConfig(
                "rsi_period must be >= 2".to_string(),
            ));
        }
        let periods = [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("sma_period", self.sma_period),
            ("atr_period", self.atr_period),
            ("bollinger_period", self.bollinger_period),
            ("structure_lookback", self.structure_lookback),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(CoreError::InvalidConfig(format!("{name} must be > 0")));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(CoreError::InvalidConfig(format!(
                "ema_fast ({}) must be shorter than ema_slow ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        if self.bollinger_std.is_nan() || self.bollinger_std <= 0.0 {
            return Err(CoreError::InvalidConfig(
                "bollinger_std must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cheap bar pre-filter applied before running the network
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PrefilterConfig {
    /// Max distance of close from the slow EMA, as fraction of the EMA
    #[serde(default = "default_ma_proximity_pct")]
    pub ma_proximity_pct: f64,
    /// RSI below this passes
    #[serde(default = "default_rsi_lower")]
    pub rsi_lower: f64,
    /// RSI above this passes
    #[serde(default = "default_rsi_upper")]
    pub rsi_upper: f64,
}

fn default_ma_proximity_pct() -> f64 {
    0.02
}
fn default_rsi_lower() -> f64 {
    30.0
}
fn default_rsi_upper() -> f64 {
    70.0
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            ma_proximity_pct: default_ma_proximity_pct(),
            rsi_lower: default_rsi_lower(),
            rsi_upper: default_rsi_upper(),
        }
    }
}

// ============================================
// BACKTEST
// ============================================

/// Main backtest configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BacktestConfig {
    /// Trading symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Candle file (`.parquet` or `.json`)
    #[serde(default)]
    pub data_path: Option<String>,
    /// Drop candles before this open time (epoch ns, inclusive)
    #[serde(default)]
    pub start_ns: Option<i64>,
    /// Drop candles after this open time (epoch ns, inclusive)
    #[serde(default)]
    pub end_ns: Option<i64>,
    /// Initial account balance
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    /// Warmup bars; defaults to the longest indicator window
    #[serde(default)]
    pub warmup_bars: Option<usize>,
    /// Constant sentiment in [-1,1] used for every bar
    #[serde(default)]
    pub sentiment: f64,
    /// Directory for persisted weights and pattern memory
    #[serde(default)]
    pub model_dir: Option<String>,
    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
    /// Feature normalization
    #[serde(default)]
    pub features: FeatureConfig,
    /// Risk configuration
    #[serde(default)]
    pub risk: RiskConfig,
    /// Indicator configuration
    #[serde(default)]
    pub indicators: IndicatorConfig,
    /// Pre-filter configuration
    #[serde(default)]
    pub prefilter: PrefilterConfig,
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_initial_balance() -> f64 {
    1000.0
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            data_path: None,
            start_ns: None,
            end_ns: None,
            initial_balance: default_initial_balance(),
            warmup_bars: None,
            sentiment: 0.0,
            model_dir: None,
            engine: EngineConfig::default(),
            features: FeatureConfig::default(),
            risk: RiskConfig::default(),
            indicators: IndicatorConfig::default(),
            prefilter: PrefilterConfig::default(),
        }
    }
}

impl BacktestConfig {
    /// Effective warmup: the configured value, never below the longest indicator window.
    #[must_use]
    pub fn effective_warmup(&self) -> usize {
        let longest = self.indicators.longest_window();
        self.warmup_bars.map_or(longest, |w| w.max(longest))
    }

    /// Validates this config and all nested configs.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.is_empty() {
            return Err(CoreError::InvalidConfig("symbol is required".to_string()));
        }
        if self.initial_balance.is_nan() || self.initial_balance <= 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "initial_balance must be > 0, got {}",
                self.initial_balance
            )));
        }
        if let (Some(start), Some(end)) = (self.start_ns, self.end_ns)
            && start > end
        {
            return Err(CoreError::InvalidConfig(format!(
                "start_ns ({start}) must not be after end_ns ({end})"
            )));
        }
        if !(-1.0..=1.0).contains(&self.sentiment) {
            return Err(CoreError::InvalidConfig(format!(
                "sentiment must be in [-1, 1], got {}",
                self.sentiment
            )));
        }
        self.engine.validate()?;
        self.features.validate()?;
        self.risk.validate()?;
        self.indicators.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: BacktestConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BacktestConfig::default());
        assert_eq!(config.engine.rng_seed, 42);
        assert!(!config.risk.trailing.enabled);
        assert_eq!(config.risk.trailing.levels.len(), 3);
    }

    #[test]
    fn test_partial_nested_override() {
        let json = serde_json::json!({
            "symbol": "ETHUSDT",
            "engine": { "epsilon": 0.0 },
            "indicators": { "ema_slow": 100 }
        });
        let config: BacktestConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.symbol, "ETHUSDT");
        assert!(config.engine.epsilon.abs() < f64::EPSILON);
        assert_eq!(config.engine.hidden_units, 16);
        assert_eq!(config.indicators.ema_slow, 100);
        assert_eq!(config.indicators.rsi_period, 14);
    }

    #[test]
    fn test_longest_window_and_warmup() {
        let mut config = BacktestConfig::default();
        assert_eq!(config.indicators.longest_window(), 200);
        assert_eq!(config.effective_warmup(), 200);

        config.warmup_bars = Some(50);
        assert_eq!(config.effective_warmup(), 200);

        config.warmup_bars = Some(300);
        assert_eq!(config.effective_warmup(), 300);
    }

    #[test]
    fn test_validate_rejects_bad_epsilon() {
        let mut config = BacktestConfig::default();
        config.engine.epsilon = 1.5;
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidConfig(msg)) if msg.contains("epsilon")
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_ema_spans() {
        let mut config = BacktestConfig::default();
        config.indicators.ema_fast = 250;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unordered_trailing_levels() {
        let mut config = RiskConfig::default();
        config.trailing.levels.reverse();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_date_range() {
        let config = BacktestConfig {
            start_ns: Some(20),
            end_ns: Some(10),
            ..BacktestConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("start_ns"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(BacktestConfig::default().validate().is_ok());
    }
}
