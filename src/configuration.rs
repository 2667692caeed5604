use std::{env, fs, ops::Deref, path::Path, str::FromStr, sync::Arc};

use bigdecimal::BigDecimal;
use tracing::info;

use crate::{
    error::Error,
    helpers::{parse_tuple_string, MetricProfile, StoreKind, DEFAULT_DECIMALS},
    migration,
    provider::{DatabasePool, Storage, HTTP},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub store: Storage,
    pub http: HTTP,
}

impl State {
    pub async fn new(config: Config) -> Result<State, Error> {
        let store = match config.store {
            StoreKind::Memory => Storage::memory(),
            StoreKind::Postgres => {
                let database_url = config.database_url()?;
                migration::run_migrations(database_url).await?;
                Storage::Postgres(DatabasePool::new(database_url).await?)
            },
        };
        let http = HTTP::new(config.price_source_url.clone());

        info!("Entity store: {:?}", config.store);

        Ok(Self {
            config,
            store,
            http,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub price_source_url: Option<String>,
    pub settings: IndexerSettings,
}

impl Config {
    pub fn database_url(&self) -> Result<&str, Error> {
        self.database_url.as_deref().ok_or_else(|| {
            Error::ConfigurationError(String::from(
                "DATABASE_URL is required for the postgres store",
            ))
        })
    }
}

/// Domain settings consumed by the aggregation handlers.
#[derive(Debug, Clone)]
pub struct IndexerSettings {
    pub metric_profile: MetricProfile,
    pub track_position_owner: bool,
    pub protocol_id: String,
    pub protocol_name: String,
    pub protocol_slug: String,
    pub market_id: String,
    pub market_name: String,
    pub market_created_block: u64,
    pub market_created_timestamp: u64,
    pub maximum_ltv: BigDecimal,
    pub liquidation_penalty: BigDecimal,
    pub collateral_token: TokenSettings,
    pub minted_token: TokenSettings,
    pub schema_version: String,
    pub methodology_version: String,
    pub price_fallback_usd: BigDecimal,
}

impl IndexerSettings {
    pub fn indexer_version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            metric_profile: MetricProfile::Full,
            track_position_owner: true,
            protocol_id: String::from("cdp-manager"),
            protocol_name: String::from("eBTC"),
            protocol_slug: String::from("ebtc"),
            market_id: String::from("active-pool"),
            market_name: String::from("eBTC"),
            market_created_block: 0,
            market_created_timestamp: 0,
            maximum_ltv: BigDecimal::from_str("90.909090909090909090")
                .unwrap_or_default(),
            liquidation_penalty: BigDecimal::from_str("0.5").unwrap_or_default(),
            collateral_token: TokenSettings {
                address: String::from(
                    "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                ),
                name: String::from("Ether"),
                symbol: String::from("ETH"),
                decimals: DEFAULT_DECIMALS,
            },
            minted_token: TokenSettings {
                address: String::from("ebtc"),
                name: String::from("eBTC"),
                symbol: String::from("EBTC"),
                decimals: DEFAULT_DECIMALS,
            },
            schema_version: String::from("3.0.0"),
            methodology_version: String::from("1.0.0"),
            price_fallback_usd: BigDecimal::from(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenSettings {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl FromStr for TokenSettings {
    type Err = Error;

    /// `address,name,symbol,decimals`
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let items: Vec<&str> = value.split(',').map(str::trim).collect();
        if items.len() != 4 {
            return Err(Error::ConfigurationError(format!(
                "Token tuple must be (address,name,symbol,decimals): {}",
                value
            )));
        }

        Ok(TokenSettings {
            address: items[0].to_lowercase(),
            name: items[1].to_owned(),
            symbol: items[2].to_owned(),
            decimals: items[3].parse()?,
        })
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let store = StoreKind::from_str(&env_or("STORE", "memory"))
        .map_err(|e| Error::ConfigurationError(e.to_string()))?;
    let database_url = env::var("DATABASE_URL").ok();
    let server_host = env_or("SERVER_HOST", "127.0.0.1");
    let port: u16 = env_or("PORT", "8080").parse()?;
    let allowed_origins = env_or("ALLOWED_ORIGINS", "*")
        .split(',')
        .map(|item| item.trim().to_owned())
        .collect::<Vec<String>>();
    let price_source_url = env::var("PRICE_SOURCE_URL")
        .ok()
        .filter(|url| !url.is_empty());

    let settings = get_indexer_settings()?;

    let config = Config {
        store,
        database_url,
        server_host,
        port,
        allowed_origins,
        price_source_url,
        settings,
    };

    Ok(config)
}

fn get_indexer_settings() -> Result<IndexerSettings, Error> {
    let defaults = IndexerSettings::default();

    let metric_profile = match env::var("METRIC_PROFILE") {
        Ok(value) => MetricProfile::from_str(&value)
            .map_err(|e| Error::ConfigurationError(e.to_string()))?,
        Err(_) => defaults.metric_profile,
    };
    let track_position_owner = match env::var("TRACK_POSITION_OWNER") {
        Ok(value) => value.trim().parse()?,
        Err(_) => defaults.track_position_owner,
    };
    let market_created_block = match env::var("MARKET_CREATED_BLOCK") {
        Ok(value) => value.trim().parse()?,
        Err(_) => defaults.market_created_block,
    };
    let market_created_timestamp = match env::var("MARKET_CREATED_TIMESTAMP") {
        Ok(value) => value.trim().parse()?,
        Err(_) => defaults.market_created_timestamp,
    };
    let maximum_ltv = match env::var("MAXIMUM_LTV") {
        Ok(value) => BigDecimal::from_str(value.trim())?,
        Err(_) => defaults.maximum_ltv,
    };
    let liquidation_penalty = match env::var("LIQUIDATION_PENALTY") {
        Ok(value) => BigDecimal::from_str(value.trim())?,
        Err(_) => defaults.liquidation_penalty,
    };
    let price_fallback_usd = match env::var("PRICE_FALLBACK_USD") {
        Ok(value) => BigDecimal::from_str(value.trim())?,
        Err(_) => defaults.price_fallback_usd,
    };
    let collateral_token = match env::var("COLLATERAL_TOKEN") {
        Ok(value) => get_token(value)?,
        Err(_) => defaults.collateral_token,
    };
    let minted_token = match env::var("MINTED_TOKEN") {
        Ok(value) => get_token(value)?,
        Err(_) => defaults.minted_token,
    };

    Ok(IndexerSettings {
        metric_profile,
        track_position_owner,
        protocol_id: env_or("PROTOCOL_ID", &defaults.protocol_id),
        protocol_name: env_or("PROTOCOL_NAME", &defaults.protocol_name),
        protocol_slug: env_or("PROTOCOL_SLUG", &defaults.protocol_slug),
        market_id: env_or("MARKET_ID", &defaults.market_id),
        market_name: env_or("MARKET_NAME", &defaults.market_name),
        market_created_block,
        market_created_timestamp,
        maximum_ltv,
        liquidation_penalty,
        collateral_token,
        minted_token,
        schema_version: env_or("SCHEMA_VERSION", &defaults.schema_version),
        methodology_version: env_or(
            "METHODOLOGY_VERSION",
            &defaults.methodology_version,
        ),
        price_fallback_usd,
    })
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn get_token(value: String) -> Result<TokenSettings, Error> {
    let tuples = parse_tuple_string(value);
    let token = tuples.first().ok_or_else(|| {
        Error::ConfigurationError(String::from("Token tuple is empty"))
    })?;
    TokenSettings::from_str(token)
}

/// Loads `.env` and then `etl.conf` from the working directory into the
/// process environment. Missing files are skipped; variables that are
/// already set win over file values.
pub fn set_configuration() -> Result<(), Error> {
    for file in [".env", "etl.conf"] {
        let path = Path::new(file);
        if !path.exists() {
            continue;
        }
        let config_string = fs::read_to_string(path)?;
        for (key, value) in parse_config_string(&config_string) {
            if env::var_os(&key).is_none() {
                env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(String, String)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            line.split_once('=').map(|(k, v)| {
                (k.trim().to_owned(), v.trim().trim_matches('"').to_owned())
            })
        })
        .collect()
}
