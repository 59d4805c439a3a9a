use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, loaded from defaults, an optional TOML file, and
/// `TALLY_`-prefixed environment variables (in that order of precedence).
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub listen: String,
    pub store: StoreConfig,
    pub pagination: PaginationConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sqlite_path: PathBuf,
    /// Load the demo chart of accounts, dimensions, and sample journals into
    /// an empty store on startup.
    pub seed_demo: bool,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl ServerConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("listen", "127.0.0.1:8000")?
            .set_default("store.backend", "memory")?
            .set_default("store.sqlite_path", "data/tally.db")?
            .set_default("store.seed_demo", false)?
            .set_default("pagination.default_limit", 50)?
            .set_default("pagination.max_limit", 200)?;
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl PaginationConfig {
    /// Clamps a caller-supplied limit into `[1, max_limit]`, falling back to
    /// the default when absent. A misconfigured `max_limit` of zero still
    /// yields a usable bound of one.
    pub fn clamp(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}
