use config::{Config, ConfigError, Environment as ConfigEnvironment, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::types::ApplicationConfig;
use crate::config::validation::Validator;

/// 環境類型枚舉
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 從 `MARKET_ENV` 取得當前環境設定
    pub fn from_env() -> Self {
        match env::var("MARKET_ENV")
            .unwrap_or_else(|_| "development".into())
            .to_lowercase()
            .as_str()
        {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// 轉換為配置文件名
    pub fn as_filename(&self) -> &'static str {
        match self {
            Environment::Development => "development.toml",
            Environment::Production => "production.toml",
        }
    }
}

/// 配置加載器，負責根據環境加載適當的配置
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置目錄，可由 `CONFIG_DIR` 覆寫
    pub fn config_dir() -> PathBuf {
        PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into()))
    }

    /// 從指定目錄載入某環境的配置，環境變數 `MARKET__<SECTION>__<KEY>` 優先於文件
    pub fn load_from(dir: &Path, env: Environment) -> Result<Config, ConfigError> {
        let config_path = dir.join(env.as_filename());
        debug!("載入配置文件: {}", config_path.display());

        Config::builder()
            .add_source(File::from(config_path))
            .add_source(
                ConfigEnvironment::with_prefix("MARKET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }

    /// 載入指定環境的配置
    pub fn load(env: Environment) -> Result<Config, ConfigError> {
        Self::load_from(&Self::config_dir(), env)
    }

    /// 載入當前環境的配置
    pub fn load_current() -> Result<Config, ConfigError> {
        Self::load(Environment::from_env())
    }
}

impl ApplicationConfig {
    /// 從環境變數指定的環境加載配置
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let env = Environment::from_env();
        debug!("從環境加載配置: {:?}", env);
        Self::from_source(ConfigLoader::load(env)?)
    }

    /// 從指定目錄與環境加載配置
    pub fn load_from(dir: &Path, env: Environment) -> Result<Self, ConfigError> {
        Self::from_source(ConfigLoader::load_from(dir, env)?)
    }

    /// 反序列化並驗證
    fn from_source(source: Config) -> Result<Self, ConfigError> {
        let app_config: ApplicationConfig = source.try_deserialize()?;
        app_config
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        debug!("配置驗證通過");
        Ok(app_config)
    }
}
