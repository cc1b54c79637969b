//! 日志工具模块
//!
//! 提供日志初始化和格式化输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，未设置时默认 `info`（`verbose` 时为 `debug`）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 监控模式", config.banner_label);
    info!("🔗 目标页面: {}", config.target_url);
    info!(
        "💰 参考金价: 22K {} / 24K {} (每克)",
        config.gold_price_22k, config.gold_price_24k
    );
    if config.run_once {
        info!("⏱ 只执行一次检查");
    } else {
        info!(
            "⏱ 检查间隔: {} 秒，出错后 {} 秒重试",
            config.check_interval_secs, config.error_retry_secs
        );
    }
    info!("{}", "=".repeat(60));
}

/// 记录周期开始信息
pub fn log_cycle_start(cycle: u64) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 第 {} 次检查 - {}",
        cycle,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 记录周期完成信息
pub fn log_cycle_complete(cycle: u64, success: bool) {
    info!("\n{}", "─".repeat(60));
    if success {
        info!("✓ 第 {} 次检查完成", cycle);
    } else {
        info!("✗ 第 {} 次检查失败", cycle);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
