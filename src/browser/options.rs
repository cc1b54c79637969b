//! 浏览器启动参数与页面参数
//!
//! 默认值面向容器内无头运行：关闭沙盒、固定视口、使用真实的 UA 和请求头以减少反爬拦截

use std::collections::BTreeMap;
use std::time::Duration;

/// 默认启动参数
pub const DEFAULT_ARGS: [&str; 6] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--disable-gpu",
    "--window-size=1920,1080",
];

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

const DEFAULT_EXTRA_HEADERS: [(&str, &str); 10] = [
    ("Accept-Language", "en-US,en;q=0.9"),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Encoding", "gzip, deflate, br"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Cache-Control", "max-age=0"),
];

/// 视口大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// 浏览器启动配置
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfig {
    pub headless: bool,
    pub args: Vec<String>,
    pub chrome_executable: Option<String>,
    pub window: Viewport,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            args: DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
            chrome_executable: None,
            window: Viewport::default(),
        }
    }
}

/// 调用方对启动配置的覆盖项
#[derive(Debug, Clone, Default)]
pub struct LaunchOverrides {
    pub headless: Option<bool>,
    pub args: Vec<String>,
    pub chrome_executable: Option<String>,
    pub window: Option<Viewport>,
}

impl LaunchConfig {
    /// 合并覆盖项：覆盖项优先，额外参数追加在默认参数之后并去重
    pub fn merged(overrides: LaunchOverrides) -> Self {
        let mut config = Self::default();
        if let Some(headless) = overrides.headless {
            config.headless = headless;
        }
        if overrides.chrome_executable.is_some() {
            config.chrome_executable = overrides.chrome_executable;
        }
        if let Some(window) = overrides.window {
            config.window = window;
        }
        for arg in overrides.args {
            if !config.args.contains(&arg) {
                config.args.push(arg);
            }
        }
        config
    }
}

/// 页面配置
#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub user_agent: String,
    pub extra_headers: BTreeMap<String, String>,
    pub viewport: Viewport,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra_headers: DEFAULT_EXTRA_HEADERS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            viewport: Viewport::default(),
        }
    }
}

/// 导航完成的判定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// 等到 load 事件
    Load,
    /// 等到网络基本空闲（最多两个连接持续 500ms），之后再额外静默 `idle`
    NetworkIdle { idle: Duration },
}

/// 导航参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub timeout: Duration,
    pub wait: WaitPolicy,
}

impl NavigateOptions {
    pub fn network_idle(timeout: Duration, idle: Duration) -> Self {
        Self {
            timeout,
            wait: WaitPolicy::NetworkIdle { idle },
        }
    }
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self::network_idle(Duration::from_secs(30), Duration::ZERO)
    }
}
