use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::output::OutputMode;
use crate::config::Config;
use crate::error::{KataError, Result};
use crate::storage::Store;

pub struct AppContext {
    pub kata_root: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
    pub store: Arc<Store>,
    pub output_mode: OutputMode,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let kata_root = Self::find_kata_root()?;
        // Same selection order as Config::load, so repairs write where
        // loading reads.
        let config_path = cli
            .config
            .clone()
            .or_else(|| std::env::var("KATA_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| default_config_path(&kata_root));
        let config = Config::load(cli.config.as_deref(), &kata_root)?;

        Ok(Self {
            kata_root: kata_root.clone(),
            config_path,
            config,
            store: Arc::new(Store::open(kata_root.join("kata.db"))?),
            output_mode: cli.output_mode(),
            verbosity: cli.verbose,
        })
    }

    fn find_kata_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("KATA_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".kata")? {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| KataError::Config("data directory not found".to_string()))?;
        Ok(data_dir.join("kata"))
    }
}

fn default_config_path(kata_root: &Path) -> PathBuf {
    if kata_root.ends_with(".kata") {
        kata_root.join("config.toml")
    } else {
        dirs::config_dir()
            .unwrap_or_else(|| kata_root.to_path_buf())
            .join("kata/config.toml")
    }
}

fn find_upwards(start: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Ok(Some(candidate));
        }
        current = dir.parent();
    }
    Ok(None)
}
