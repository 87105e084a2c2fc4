use std::net::SocketAddr;

use anyhow::{anyhow, Context, Result};
use dayplan_allocation::{AllocationConfig, Strategy};

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub allocation: AllocationConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let listen_addr = std::env::var("DAYPLAN_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5267".to_string())
            .parse()
            .context("DAYPLAN_LISTEN_ADDR must be a socket address")?;

        let log_level = std::env::var("DAYPLAN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut allocation = AllocationConfig::default();

        if let Ok(value) = std::env::var("DAYPLAN_DISTRIBUTION") {
            let strategy: Strategy = value.parse().map_err(|e: String| anyhow!(e))?;
            allocation = allocation.with_strategy(strategy);
        }

        if let Ok(value) = std::env::var("DAYPLAN_MAX_REBALANCE_MOVES") {
            let moves: u32 = value
                .parse()
                .with_context(|| format!("invalid DAYPLAN_MAX_REBALANCE_MOVES '{value}'"))?;
            allocation = allocation.with_max_rebalance_moves(moves);
        }

        Ok(Self {
            listen_addr,
            log_level,
            allocation,
        })
    }
}
