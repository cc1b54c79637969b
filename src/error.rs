use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 浏览器会话在有限次重试后仍无法获取
    #[error("浏览器启动失败 (已尝试 {attempts} 次): {source}")]
    LaunchExhausted {
        attempts: u32,
        #[source]
        source: BrowserError,
    },
    /// 分页采集过程中的任何失败
    #[error("第 {page} 页采集失败: {source}")]
    Collection {
        page: usize,
        #[source]
        source: BrowserError,
    },
    /// 通知发送错误
    #[error("通知错误: {0}")]
    Notify(#[from] NotifyError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    /// 启动浏览器进程失败
    #[error("启动浏览器失败: {reason}")]
    LaunchFailed { reason: String },
    /// 页面配置失败（UA / 请求头 / 视口）
    #[error("页面配置失败: {reason}")]
    PageSetupFailed { reason: String },
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
    /// 导航超时
    #[error("导航到 {url} 超时 ({timeout_ms}ms)")]
    NavigationTimeout { url: String, timeout_ms: u64 },
    /// 选择器未匹配到元素
    #[error("未找到元素: {selector}")]
    SelectorNotFound { selector: String },
    /// 点击元素失败
    #[error("点击 {selector} 失败: {reason}")]
    ClickFailed { selector: String, reason: String },
    /// 读取页面内容失败
    #[error("读取页面内容失败: {reason}")]
    ContentUnavailable { reason: String },
    /// 选择器语法错误
    #[error("无效的选择器 {selector}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    /// 正则表达式错误
    #[error("无效的匹配模式 {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    /// 关闭浏览器失败
    #[error("关闭浏览器失败: {reason}")]
    CloseFailed { reason: String },
}

/// 通知发送错误
#[derive(Debug, Error)]
pub enum NotifyError {
    /// 网络请求失败
    #[error("请求失败: {0}")]
    Request(#[from] reqwest::Error),
    /// 接口返回非 2xx
    #[error("接口返回错误状态 {status}: {body}")]
    BadStatus { status: u16, body: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 必需的环境变量不存在
    #[error("缺少必需的环境变量: {}", .var_names.join(", "))]
    EnvVarNotFound { var_names: Vec<String> },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::ContentUnavailable {
            reason: err.to_string(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl BrowserError {
    /// 创建导航失败错误
    pub fn navigation_failed(url: impl Into<String>, reason: impl ToString) -> Self {
        BrowserError::NavigationFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// 创建点击失败错误
    pub fn click_failed(selector: impl Into<String>, reason: impl ToString) -> Self {
        BrowserError::ClickFailed {
            selector: selector.into(),
            reason: reason.to_string(),
        }
    }

    /// 是否属于"目标不存在"一类的软错误
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            BrowserError::SelectorNotFound { .. } | BrowserError::NavigationTimeout { .. }
        )
    }
}

impl AppError {
    /// 把浏览器错误包装为第 `page` 页的采集错误
    pub fn collection(page: usize, source: impl Into<BrowserError>) -> Self {
        AppError::Collection {
            page,
            source: source.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 浏览器能力层结果类型
pub type BrowserResult<T> = Result<T, BrowserError>;
