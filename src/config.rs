use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::ReferencePrices;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_FILE: &str = "coupon_watch.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 商品列表页 URL（同时也是检查入口）
    pub target_url: String,
    /// 站点根地址，用于补全相对链接
    pub site_base_url: String,
    /// 优惠横幅标签
    pub banner_label: String,
    // --- 金价 ---
    pub gold_price_22k: f64,
    pub gold_price_24k: f64,
    /// 报告中每种纯度展示的条目数
    pub top_n: usize,
    // --- 浏览器 ---
    pub headless: bool,
    pub chrome_executable: Option<String>,
    pub max_launch_attempts: u32,
    pub launch_retry_delay_ms: u64,
    pub navigation_timeout_ms: u64,
    pub selector_timeout_ms: u64,
    /// 商品详情页加载后的静默等待
    pub detail_idle_ms: u64,
    /// 点击"下一页"后等待页面重新渲染
    pub settle_delay_ms: u64,
    pub max_pages: usize,
    // --- 调度 ---
    pub check_interval_secs: u64,
    pub error_retry_secs: u64,
    /// 只执行一次检查后退出
    pub run_once: bool,
    // --- Telegram ---
    pub telegram_api_base: String,
    pub telegram_bot_id: String,
    pub telegram_chat_id: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            site_base_url: "https://www.myntra.com".to_string(),
            banner_label: "BLINKDEAL".to_string(),
            gold_price_22k: 9090.0,
            gold_price_24k: 9924.0,
            top_n: 5,
            headless: true,
            chrome_executable: None,
            max_launch_attempts: 3,
            launch_retry_delay_ms: 5000,
            navigation_timeout_ms: 30_000,
            selector_timeout_ms: 15_000,
            detail_idle_ms: 1000,
            settle_delay_ms: 2000,
            max_pages: 50,
            check_interval_secs: 10 * 60,
            error_retry_secs: 5 * 60,
            run_once: false,
            telegram_api_base: "https://api.telegram.org".to_string(),
            telegram_bot_id: String::new(),
            telegram_chat_id: String::new(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量，最后校验必填项
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("COUPON_WATCH_CONFIG").ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);

        let base = if explicit.is_some() || Path::new(path).exists() {
            Self::from_toml_file(path)?
        } else {
            Self::default()
        };

        let config = base.with_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，未出现的字段使用默认值
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 抽象了环境变量读取，便于测试
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("URL") {
            self.target_url = v;
        }
        if let Some(v) = lookup("SITE_BASE_URL") {
            self.site_base_url = v;
        }
        if let Some(v) = lookup("BANNER_LABEL") {
            self.banner_label = v;
        }
        if let Some(v) = lookup("BOT_ID") {
            self.telegram_bot_id = v;
        }
        if let Some(v) = lookup("CHAT_ID") {
            self.telegram_chat_id = v;
        }
        if let Some(v) = lookup("TELEGRAM_API_BASE") {
            self.telegram_api_base = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.chrome_executable = Some(v);
        }

        override_parsed(&lookup, "GOLD_PRICE_22K", &mut self.gold_price_22k)?;
        override_parsed(&lookup, "GOLD_PRICE_24K", &mut self.gold_price_24k)?;
        override_parsed(&lookup, "TOP_N", &mut self.top_n)?;
        override_parsed(&lookup, "HEADLESS", &mut self.headless)?;
        override_parsed(&lookup, "MAX_LAUNCH_ATTEMPTS", &mut self.max_launch_attempts)?;
        override_parsed(&lookup, "LAUNCH_RETRY_DELAY_MS", &mut self.launch_retry_delay_ms)?;
        override_parsed(&lookup, "NAVIGATION_TIMEOUT_MS", &mut self.navigation_timeout_ms)?;
        override_parsed(&lookup, "SELECTOR_TIMEOUT_MS", &mut self.selector_timeout_ms)?;
        override_parsed(&lookup, "DETAIL_IDLE_MS", &mut self.detail_idle_ms)?;
        override_parsed(&lookup, "SETTLE_DELAY_MS", &mut self.settle_delay_ms)?;
        override_parsed(&lookup, "MAX_PAGES", &mut self.max_pages)?;
        override_parsed(&lookup, "CHECK_INTERVAL_SECS", &mut self.check_interval_secs)?;
        override_parsed(&lookup, "ERROR_RETRY_SECS", &mut self.error_retry_secs)?;
        override_parsed(&lookup, "RUN_ONCE", &mut self.run_once)?;
        override_parsed(&lookup, "VERBOSE_LOGGING", &mut self.verbose_logging)?;

        Ok(self)
    }

    /// 校验必填项
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = [
            ("BOT_ID", &self.telegram_bot_id),
            ("CHAT_ID", &self.telegram_chat_id),
            ("URL", &self.target_url),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::EnvVarNotFound { var_names: missing })
        }
    }

    pub fn reference_prices(&self) -> ReferencePrices {
        ReferencePrices {
            per_gram_22k: self.gold_price_22k,
            per_gram_24k: self.gold_price_24k,
        }
    }

    pub fn launch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.launch_retry_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn detail_idle(&self) -> Duration {
        Duration::from_millis(self.detail_idle_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn error_retry_interval(&self) -> Duration {
        Duration::from_secs(self.error_retry_secs)
    }
}

/// 站点页面结构：选择器与文本标记
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteSelectors {
    /// 列表页第一个商品链接
    pub product_link: String,
    /// 横幅标签所在元素
    pub banner: String,
    /// 优惠券说明所在元素
    pub coupon_label: String,
    /// 优惠券说明中必须包含的文字
    pub coupon_marker: String,
    /// 列表页商品卡片
    pub product_card: String,
    pub product_name: String,
    pub product_price: String,
    pub card_link: String,
    /// "下一页"按钮
    pub next_page: String,
}

impl Default for SiteSelectors {
    fn default() -> Self {
        Self {
            product_link: ".product-base a".to_string(),
            banner: ".pdp-offers-boldText".to_string(),
            coupon_label: ".pdp-offers-labelMarkup".to_string(),
            coupon_marker: "Coupon Discount:".to_string(),
            product_card: ".results-base .product-base".to_string(),
            product_name: ".product-product".to_string(),
            product_price: ".product-price".to_string(),
            card_link: "a[href]".to_string(),
            next_page: ".pagination-next".to_string(),
        }
    }
}

fn override_parsed<F, T>(lookup: &F, var_name: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(var_name) else {
        return Ok(());
    };
    *slot = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.clone(),
            expected_type: std::any::type_name::<T>().to_string(),
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_apply() {
        let config = Config::default()
            .with_env_overrides(env(&[
                ("URL", "https://shop.example/gold"),
                ("BOT_ID", "123:abc"),
                ("CHAT_ID", "42"),
                ("TOP_N", "3"),
                ("GOLD_PRICE_24K", "10000.5"),
                ("RUN_ONCE", "true"),
            ]))
            .unwrap();

        assert_eq!(config.target_url, "https://shop.example/gold");
        assert_eq!(config.top_n, 3);
        assert_eq!(config.gold_price_24k, 10000.5);
        assert_eq!(config.gold_price_22k, 9090.0);
        assert!(config.run_once);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unparsable_value_is_rejected() {
        let err = Config::default()
            .with_env_overrides(env(&[("MAX_PAGES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { ref var_name, .. } if var_name == "MAX_PAGES"));
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let err = Config::default().validate().unwrap_err();
        match err {
            ConfigError::EnvVarNotFound { var_names } => {
                assert_eq!(var_names, vec!["BOT_ID", "CHAT_ID", "URL"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            target_url = "https://shop.example/coins"
            top_n = 10
            max_pages = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.target_url, "https://shop.example/coins");
        assert_eq!(config.top_n, 10);
        assert_eq!(config.max_pages, 4);
        assert_eq!(config.banner_label, "BLINKDEAL");
        assert_eq!(config.settle_delay(), Duration::from_millis(2000));
    }
}
