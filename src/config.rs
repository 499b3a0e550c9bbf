use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::index::DEFAULT_CACHE_CAPACITY;

/// 进程配置（TOML；缺省字段取默认值）
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 表格数据源路径
    pub data_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// 允许的 CORS 来源
    pub cors_origins: Vec<String>,
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/locations.csv"),
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self> {
        toml::from_str(s).map_err(|e| CatalogError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s, path)
    }

    /// 默认配置文件位置：$CONFIG_DIR/roamy/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("roamy").join("config.toml"))
    }

    /// 显式路径必须可读；未指定时默认位置存在才读取，否则用内置默认值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::from_file(p);
        }
        match Self::default_path() {
            Some(p) if p.exists() => {
                tracing::info!("Using config file {:?}", p);
                Self::from_file(&p)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
