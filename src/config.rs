use std::env;

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Matchmaking and betting-room tunables.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Minimum wager, in wagering-token units.
    pub min_bet: f64,
    /// Platform fee rate applied to the base-currency value of a wager.
    pub fee_rate: f64,
    /// How long a wallet waits in the queue before a bot match is created (ms).
    pub queue_wait_ms: u64,
    /// How long an unfilled betting room stays open (seconds).
    pub room_ttl_secs: u64,
    /// How long a resolved room remains visible before deletion (seconds).
    pub resolve_grace_secs: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_bet: 0.01,
            fee_rate: 0.05,
            queue_wait_ms: 15_000,
            room_ttl_secs: 300,
            resolve_grace_secs: 10,
        }
    }
}

/// Price oracle configuration.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Mint address of the wagering token.
    pub token_mint: String,
    /// Cache TTL for fetched prices (seconds).
    pub price_ttl_secs: u64,
    /// Static rate returned when every source fails and no cache exists.
    pub static_price: Option<f64>,
    /// Conversion rate callers fall back to when the oracle returns nothing.
    /// Zero means fees are waived while the oracle is fully unavailable.
    pub default_conversion_rate: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            token_mint: "So11111111111111111111111111111111111111112".to_string(),
            price_ttl_secs: 60,
            static_price: None,
            default_conversion_rate: 0.0,
        }
    }
}

/// Competition epoch configuration.
#[derive(Debug, Clone)]
pub struct CompetitionConfig {
    /// Epoch duration (seconds).
    pub epoch_secs: u64,
    /// Interval between epoch-boundary checks (seconds).
    pub epoch_check_secs: u64,
}

impl Default for CompetitionConfig {
    fn default() -> Self {
        Self {
            epoch_secs: 7 * 24 * 3600,
            epoch_check_secs: 3600,
        }
    }
}

/// Reward distribution configuration.
#[derive(Debug, Clone)]
pub struct RewardConfig {
    /// Percentage of the pool paid to each leaderboard rank, best first.
    pub tier_percentages: Vec<f64>,
    /// Wallet receiving the remainder of the pool.
    pub distribution_wallet: String,
    /// Transfer service endpoint. Unset means transfers fail (recorded, not fatal).
    pub transfer_url: Option<String>,
    /// When set, transfers succeed locally without calling out. For development.
    pub transfer_dry_run: bool,
}

impl RewardConfig {
    /// Percentage of the pool left over for the distribution wallet.
    pub fn remainder_percentage(&self) -> f64 {
        100.0 - self.tier_percentages.iter().sum::<f64>()
    }
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tier_percentages: vec![20.0, 10.0, 5.0, 3.0, 2.0],
            distribution_wallet: String::new(),
            transfer_url: None,
            transfer_dry_run: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    pub game: GameConfig,
    pub oracle: OracleConfig,
    pub competition: CompetitionConfig,
    pub rewards: RewardConfig,
    /// Append-only event log endpoint (fire-and-forget). Unset means log-only.
    pub event_log_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let tier_percentages = env::var("REWARD_TIERS")
            .ok()
            .map(|s| {
                s.split(',')
                    .filter_map(|p| p.trim().parse::<f64>().ok())
                    .collect::<Vec<f64>>()
            })
            .filter(|tiers| !tiers.is_empty())
            .unwrap_or_else(|| RewardConfig::default().tier_percentages);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("PORT", 3001),
            game: GameConfig {
                min_bet: env_parse("MIN_BET", 0.01),
                fee_rate: env_parse("FEE_RATE", 0.05),
                queue_wait_ms: env_parse("QUEUE_WAIT_MS", 15_000),
                room_ttl_secs: env_parse("ROOM_TTL_SECS", 300),
                resolve_grace_secs: env_parse("RESOLVE_GRACE_SECS", 10),
            },
            oracle: OracleConfig {
                token_mint: env::var("TOKEN_MINT")
                    .unwrap_or_else(|_| OracleConfig::default().token_mint),
                price_ttl_secs: env_parse("PRICE_TTL_SECS", 60),
                static_price: env::var("STATIC_PRICE").ok().and_then(|v| v.parse().ok()),
                default_conversion_rate: env_parse("DEFAULT_CONVERSION_RATE", 0.0),
            },
            competition: CompetitionConfig {
                epoch_secs: env_parse("EPOCH_SECS", 7 * 24 * 3600),
                epoch_check_secs: env_parse("EPOCH_CHECK_SECS", 3600),
            },
            rewards: RewardConfig {
                tier_percentages,
                distribution_wallet: env::var("DISTRIBUTION_WALLET").unwrap_or_default(),
                transfer_url: env::var("TRANSFER_SERVICE_URL").ok(),
                transfer_dry_run: env::var("TRANSFER_DRY_RUN")
                    .map(|v| v == "true" || v == "1")
                    .unwrap_or(false),
            },
            event_log_url: env::var("EVENT_LOG_URL").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            game: GameConfig::default(),
            oracle: OracleConfig::default(),
            competition: CompetitionConfig::default(),
            rewards: RewardConfig::default(),
            event_log_url: None,
        }
    }
}
