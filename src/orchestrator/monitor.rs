//! 周期监控器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载配置、组装会话管理器、检查流程和通知器
//! 2. **周期调度**：正常间隔 / 出错后的重试间隔，支持 Ctrl-C 退出
//! 3. **资源管理**：每个周期获取一个会话，无论成败都释放
//! 4. **状态持有**：唯一持有 `DetectionState`，只在成功的周期后更新
//!
//! 不做任何页面判断，只调度和发通知

use std::future::Future;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser::{
    BrowserLauncher, ChromiumLauncher, LaunchConfig, LaunchOverrides, PageConfig,
};
use crate::config::{Config, SiteSelectors};
use crate::error::AppResult;
use crate::infrastructure::{RetryPolicy, SessionManager};
use crate::models::DetectionState;
use crate::services::{Notifier, TelegramNotifier};
use crate::utils::logging;
use crate::workflow::{CheckFlow, CycleReport};

/// 生产环境使用的监控器
pub type App = Monitor<ChromiumLauncher, TelegramNotifier>;

/// 周期监控器
pub struct Monitor<L: BrowserLauncher, N: Notifier> {
    config: Config,
    sessions: SessionManager<L>,
    flow: CheckFlow,
    notifier: N,
    state: DetectionState,
    cycles: u64,
}

impl App {
    /// 用真实浏览器和 Telegram 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        logging::log_startup(&config);
        let notifier = TelegramNotifier::from_config(&config);
        Monitor::new(config, ChromiumLauncher, notifier)
    }
}

impl<L: BrowserLauncher, N: Notifier> Monitor<L, N> {
    pub fn new(config: Config, launcher: L, notifier: N) -> AppResult<Self> {
        let launch = LaunchConfig::merged(LaunchOverrides {
            headless: Some(config.headless),
            chrome_executable: config.chrome_executable.clone(),
            ..Default::default()
        });
        let policy = RetryPolicy {
            max_attempts: config.max_launch_attempts,
            retry_delay: config.launch_retry_delay(),
        };
        let sessions = SessionManager::new(launcher, launch, PageConfig::default(), policy);
        let flow = CheckFlow::from_config(&config, SiteSelectors::default())?;

        Ok(Self {
            config,
            sessions,
            flow,
            notifier,
            state: DetectionState::default(),
            cycles: 0,
        })
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// 执行一次检查，成功时采用新的状态
    ///
    /// 会话在流程结束后总是被释放，失败的周期不改变状态
    pub async fn check_once(&mut self) -> AppResult<CycleReport> {
        let mut session = self.sessions.acquire().await?;
        let result = self.flow.run(&mut session, self.state).await;
        self.sessions.release(session).await;

        let report = result?;
        self.state = report.state;
        Ok(report)
    }

    /// 执行一个完整周期（检查 + 通知），返回本周期是否成功
    pub async fn run_cycle(&mut self) -> bool {
        self.cycles += 1;
        logging::log_cycle_start(self.cycles);

        let success = match self.check_once().await {
            Ok(report) => {
                if report.outcome.notify {
                    self.deliver(&report.outcome.message).await;
                } else {
                    info!("本周期无需通知: {}", first_line(&report.outcome.message));
                }
                true
            }
            Err(e) => {
                error!("❌ 检查失败: {}", e);
                let message = format!(
                    "Error while checking {}: {}",
                    self.config.banner_label, e
                );
                self.deliver(&message).await;
                false
            }
        };

        logging::log_cycle_complete(self.cycles, success);
        success
    }

    /// 主循环：`run_once` 时只跑一轮，否则按间隔循环直到 Ctrl-C
    pub async fn run(&mut self) -> AppResult<()> {
        // 监听放在独立任务里，启动即注册，周期进行中收到的信号也不会丢
        let listener = tokio::spawn(tokio::signal::ctrl_c());
        let abort = listener.abort_handle();

        let result = self
            .run_until(async move {
                match listener.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        error!("无法监听退出信号: {}", e);
                        std::future::pending::<()>().await;
                    }
                    Err(_) => std::future::pending::<()>().await,
                }
            })
            .await;

        abort.abort();
        result
    }

    /// 按间隔循环，直到 `shutdown` 完成
    ///
    /// 每个周期结束后先检查 `shutdown`，周期本身不会被打断，会话总能被释放
    pub async fn run_until<F>(&mut self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        if self.config.run_once {
            self.run_cycle().await;
            return Ok(());
        }

        tokio::pin!(shutdown);
        loop {
            let delay = if self.run_cycle().await {
                self.config.check_interval()
            } else {
                self.config.error_retry_interval()
            };
            info!("⏳ {} 秒后进行下一次检查", delay.as_secs());

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("收到退出信号，停止监控");
                    break;
                }
                _ = sleep(delay) => {}
            }
        }

        Ok(())
    }

    /// 发送通知，失败只记录日志
    async fn deliver(&self, message: &str) {
        match self.notifier.send(message).await {
            Ok(()) => info!("📨 通知已发送"),
            Err(e) => error!("通知发送失败: {}", e),
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}
