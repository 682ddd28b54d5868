use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// risk-lens 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// 预测 API 地址（客户端使用）
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// 请求超时（秒），未配置时不设超时
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// HTTP 代理地址（可选）
    /// 支持格式: http://host:port, https://host:port, socks5://host:port
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// 预测服务监听地址（serve 使用）
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// 流失模型权重文件
    #[serde(default = "default_churn_model_path")]
    pub churn_model_path: PathBuf,

    /// 额度模型权重文件
    #[serde(default = "default_allowance_model_path")]
    pub allowance_model_path: PathBuf,

    /// 配置文件路径（运行时元数据）
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_churn_model_path() -> PathBuf {
    PathBuf::from("models/churn_model.json")
}

fn default_allowance_model_path() -> PathBuf {
    PathBuf::from("models/allowance_model.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: None,
            proxy_url: None,
            host: default_host(),
            port: default_port(),
            churn_model_path: default_churn_model_path(),
            allowance_model_path: default_allowance_model_path(),
            config_path: None,
        }
    }
}

impl Config {
    /// 获取默认配置文件路径
    pub fn default_config_path() -> &'static str {
        "config.json"
    }

    /// 从文件加载配置
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            // 配置文件不存在，返回默认配置
            let mut config = Self::default();
            config.config_path = Some(path.to_path_buf());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let mut config: Config = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// 获取配置文件路径（如果有）
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// 去掉末尾斜杠的 API 地址
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// 服务监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
