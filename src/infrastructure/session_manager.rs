//! 会话管理器 - 基础设施层
//!
//! 持有启动浏览器的能力，负责带重试地获取会话，以及释放会话

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession, LaunchConfig, PageConfig};
use crate::error::{AppError, AppResult, BrowserError, BrowserResult};

/// 固定间隔的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(5000),
        }
    }
}

/// 会话管理器
///
/// 职责：
/// - 启动浏览器并配置页面
/// - 失败时按固定间隔重试，最多 `max_attempts` 次
/// - 释放会话（关闭失败只记录日志）
pub struct SessionManager<L> {
    launcher: L,
    launch: LaunchConfig,
    page: PageConfig,
    policy: RetryPolicy,
}

impl<L: BrowserLauncher> SessionManager<L> {
    pub fn new(launcher: L, launch: LaunchConfig, page: PageConfig, policy: RetryPolicy) -> Self {
        Self {
            launcher,
            launch,
            page,
            policy,
        }
    }

    /// 获取一个已配置好的会话
    ///
    /// 连续失败 `max_attempts` 次后返回 `LaunchExhausted`，携带最后一次的错误
    pub async fn acquire(&self) -> AppResult<L::Session> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_error = BrowserError::LaunchFailed {
            reason: "未尝试启动".to_string(),
        };

        for attempt in 1..=max_attempts {
            match self.try_launch().await {
                Ok(session) => {
                    info!("✅ 浏览器会话就绪 (第 {}/{} 次尝试)", attempt, max_attempts);
                    return Ok(session);
                }
                Err(e) => {
                    warn!(
                        "⚠️ 浏览器启动失败 (尝试 {}/{}): {}",
                        attempt, max_attempts, e
                    );
                    last_error = e;
                    if attempt < max_attempts {
                        debug!("等待 {:?} 后重试...", self.policy.retry_delay);
                        sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        error!("❌ 浏览器启动失败，已重试 {} 次", max_attempts);
        Err(AppError::LaunchExhausted {
            attempts: max_attempts,
            source: last_error,
        })
    }

    /// 单次尝试：启动 + 配置页面，配置失败时关闭刚启动的浏览器
    async fn try_launch(&self) -> BrowserResult<L::Session> {
        let mut session = self.launcher.launch(&self.launch).await?;
        if let Err(e) = session.configure(&self.page).await {
            if let Err(close_err) = session.close().await {
                warn!("关闭未配置成功的浏览器失败: {}", close_err);
            }
            return Err(e);
        }
        Ok(session)
    }

    /// 释放会话
    pub async fn release(&self, mut session: L::Session) {
        match session.close().await {
            Ok(()) => debug!("会话已释放"),
            Err(e) => error!("关闭浏览器时出错: {}", e),
        }
    }
}
