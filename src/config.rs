use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{KataError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub judge: JudgeConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub robot: RobotConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, kata_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("KATA_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(kata_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        // No config directory (e.g. stripped-down containers) just means no
        // global config.
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("kata/config.toml"))
    }

    fn load_project(kata_root: &Path) -> Result<Option<ConfigPatch>> {
        let path = kata_root.join("config.toml");
        Self::load_patch(&path)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| KataError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| KataError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.server {
            self.server.merge(patch);
        }
        if let Some(patch) = patch.upstream {
            self.upstream.merge(patch);
        }
        if let Some(patch) = patch.judge {
            self.judge.merge(patch);
        }
        if let Some(patch) = patch.leaderboard {
            self.leaderboard.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
        if let Some(patch) = patch.robot {
            self.robot.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if env_bool("KATA_ROBOT").unwrap_or(false) {
            self.robot.format = "json".to_string();
            self.robot.include_metadata = true;
        }

        if let Some(value) = env_string("KATA_SERVER_ADDR") {
            self.server.addr = value;
        }
        if let Some(value) = env_u32("KATA_SERVER_QUEUE_DEPTH")? {
            self.server.queue_depth = value;
        }

        if let Some(value) = env_string("KATA_UPSTREAM_URL") {
            self.upstream.base_url = Some(value);
        }
        if let Some(value) = env_u32("KATA_UPSTREAM_COUNT")? {
            self.upstream.count = value;
        }
        if let Some(value) = env_u64("KATA_UPSTREAM_TIMEOUT_SECS")? {
            self.upstream.timeout_secs = value;
        }
        if let Some(value) = env_string("KATA_UPSTREAM_DIFFICULTY_EASY") {
            self.upstream.difficulty_easy = value;
        }
        if let Some(value) = env_string("KATA_UPSTREAM_DIFFICULTY_HARD") {
            self.upstream.difficulty_hard = value;
        }

        if let Some(value) = env_string("KATA_PYTHON_BIN") {
            self.judge.python_bin = value;
        }
        if let Some(value) = env_u64("KATA_JUDGE_TIMEOUT_SECS")? {
            self.judge.timeout_secs = value;
        }
        if let Some(value) = env_u64("KATA_JUDGE_MAX_CODE_BYTES")? {
            self.judge.max_code_bytes = value;
        }

        if let Some(value) = env_u32("KATA_LEADERBOARD_SIZE")? {
            self.leaderboard.size = value;
        }

        if let Some(value) = env_u32("KATA_CACHE_MAX_AGE_DAYS")? {
            self.cache.max_age_days = value;
        }

        if let Some(value) = env_string("KATA_ROBOT_FORMAT") {
            self.robot.format = value;
        }
        if let Some(value) = env_bool("KATA_ROBOT_INCLUDE_METADATA") {
            self.robot.include_metadata = value;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub addr: String,
    #[serde(default)]
    pub queue_depth: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:5000".to_string(),
            queue_depth: 64,
        }
    }
}

impl ServerConfig {
    fn merge(&mut self, patch: ServerPatch) {
        if let Some(value) = patch.addr {
            self.addr = value;
        }
        if let Some(value) = patch.queue_depth {
            self.queue_depth = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Question-source API root. No usable default exists, so fetching
    /// refuses to run until one is configured.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub difficulty_easy: String,
    #[serde(default)]
    pub difficulty_hard: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            count: 5,
            timeout_secs: 10,
            difficulty_easy: "introductory".to_string(),
            difficulty_hard: "interview".to_string(),
        }
    }
}

impl UpstreamConfig {
    fn merge(&mut self, patch: UpstreamPatch) {
        if let Some(value) = patch.base_url {
            self.base_url = Some(value);
        }
        if let Some(value) = patch.count {
            self.count = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.difficulty_easy {
            self.difficulty_easy = value;
        }
        if let Some(value) = patch.difficulty_hard {
            self.difficulty_hard = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    #[serde(default)]
    pub python_bin: String,
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_code_bytes: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            python_bin: "python3".to_string(),
            timeout_secs: 10,
            max_code_bytes: 65536,
        }
    }
}

impl JudgeConfig {
    fn merge(&mut self, patch: JudgePatch) {
        if let Some(value) = patch.python_bin {
            self.python_bin = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.max_code_bytes {
            self.max_code_bytes = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    #[serde(default)]
    pub size: u32,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self { size: 5 }
    }
}

impl LeaderboardConfig {
    fn merge(&mut self, patch: LeaderboardPatch) {
        if let Some(value) = patch.size {
            self.size = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub max_age_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_age_days: 7 }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.max_age_days {
            self.max_age_days = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub include_metadata: bool,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            include_metadata: true,
        }
    }
}

impl RobotConfig {
    fn merge(&mut self, patch: RobotPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.include_metadata {
            self.include_metadata = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub server: Option<ServerPatch>,
    pub upstream: Option<UpstreamPatch>,
    pub judge: Option<JudgePatch>,
    pub leaderboard: Option<LeaderboardPatch>,
    pub cache: Option<CachePatch>,
    pub robot: Option<RobotPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerPatch {
    pub addr: Option<String>,
    pub queue_depth: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UpstreamPatch {
    pub base_url: Option<String>,
    pub count: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub difficulty_easy: Option<String>,
    pub difficulty_hard: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct JudgePatch {
    pub python_bin: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_code_bytes: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LeaderboardPatch {
    pub size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CachePatch {
    pub max_age_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RobotPatch {
    pub format: Option<String>,
    pub include_metadata: Option<bool>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|err| KataError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| KataError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
