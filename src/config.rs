//! Server configuration from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PROMPTS_FILE: &str = "/etc/promptparty/prompts.txt";
const DEFAULT_ROUNDS_PER_GAME: usize = 5;

/// Rules the round lifecycle runs by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameRules {
    /// Rounds played before advancing ends the game
    pub rounds_per_game: usize,
    pub code_length: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            rounds_per_game: DEFAULT_ROUNDS_PER_GAME,
            code_length: crate::ids::DEFAULT_CODE_LENGTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub prompts_file: PathBuf,
    pub bind_addr: SocketAddr,
    pub rules: GameRules,
}

impl ServerConfig {
    /// Load config from PROMPTS_FILE, BIND_ADDR, SESSION_CODE_LENGTH and
    /// ROUNDS_PER_GAME. Bad values fall back to defaults.
    pub fn from_env() -> Self {
        let defaults = GameRules::default();

        let prompts_file: PathBuf = std::env::var("PROMPTS_FILE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPTS_FILE.to_string())
            .into();

        let bind_addr =
            env_parse("BIND_ADDR", |_: &SocketAddr| true).unwrap_or_else(default_bind_addr);

        let rules = GameRules {
            rounds_per_game: env_parse("ROUNDS_PER_GAME", |n: &usize| *n >= 1)
                .unwrap_or(defaults.rounds_per_game),
            code_length: env_parse("SESSION_CODE_LENGTH", |n: &usize| *n >= 1)
                .unwrap_or(defaults.code_length),
        };

        tracing::info!(
            "Config: prompts={}, bind={}, rounds_per_game={}, code_length={}",
            prompts_file.display(),
            bind_addr,
            rules.rounds_per_game,
            rules.code_length
        );

        Self {
            prompts_file,
            bind_addr,
            rules,
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Parse an env var, warning and returning None when it is set but invalid
fn env_parse<T: FromStr>(key: &str, valid: impl Fn(&T) -> bool) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<T>() {
        Ok(value) if valid(&value) => Some(value),
        _ => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
