use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::EventLifecycleEvent;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use super::options::{LaunchConfig, NavigateOptions, PageConfig, WaitPolicy};
use super::{BrowserLauncher, BrowserSession};
use crate::error::{BrowserError, BrowserResult};

/// 轮询元素时的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 由 builder 自己生成的参数前缀，不再从启动参数里重复传入
const BUILDER_OWNED_ARGS: [&str; 1] = ["--window-size"];

/// 传给 Chromium 的额外参数：去掉 builder 已生成的参数并去重
fn chromium_args(config: &LaunchConfig) -> Vec<&str> {
    let mut args: Vec<&str> = Vec::with_capacity(config.args.len());
    for arg in &config.args {
        let owned = BUILDER_OWNED_ARGS
            .iter()
            .any(|prefix| arg.split('=').next() == Some(*prefix));
        if !owned && !args.contains(&arg.as_str()) {
            args.push(arg);
        }
    }
    args
}

/// 跟踪一次导航的生命周期事件
///
/// 只有在看到新文档的 `init` 之后出现的 `networkAlmostIdle` 才算数，
/// 对应"最多两个连接、持续 500ms"的网络空闲
#[derive(Debug, Default)]
struct LifecycleTracker {
    started: bool,
}

impl LifecycleTracker {
    const INIT: &'static str = "init";
    const NETWORK_ALMOST_IDLE: &'static str = "networkAlmostIdle";

    /// 返回网络是否已经空闲
    fn observe(&mut self, name: &str) -> bool {
        match name {
            Self::INIT => {
                self.started = true;
                false
            }
            Self::NETWORK_ALMOST_IDLE => self.started,
            _ => false,
        }
    }
}

/// 基于 chromiumoxide 的无头浏览器启动器
#[derive(Debug, Default, Clone)]
pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, config: &LaunchConfig) -> BrowserResult<ChromiumSession> {
        info!("🚀 启动无头浏览器...");
        debug!("启动参数: {:?}", config.args);

        let mut builder = BrowserConfig::builder()
            .window_size(config.window.width, config.window.height)
            .args(chromium_args(config));
        builder = if config.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(Path::new(path));
        }

        let browser_config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            BrowserError::LaunchFailed { reason: e }
        })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            BrowserError::LaunchFailed {
                reason: e.to_string(),
            }
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let mut session = ChromiumSession {
            browser,
            page: None,
            handler_task,
            closed: false,
        };

        match session.browser.new_page("about:blank").await {
            Ok(page) => {
                session.page = Some(page);
                Ok(session)
            }
            Err(e) => {
                error!("创建页面失败: {}", e);
                if let Err(close_err) = session.close().await {
                    warn!("关闭未能创建页面的浏览器失败: {}", close_err);
                }
                Err(BrowserError::LaunchFailed {
                    reason: format!("创建页面失败: {}", e),
                })
            }
        }
    }
}

/// 一个 Chromium 进程和它的唯一页面
pub struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    closed: bool,
}

impl ChromiumSession {
    fn page(&self) -> BrowserResult<&Page> {
        self.page.as_ref().ok_or_else(|| BrowserError::ContentUnavailable {
            reason: "页面已关闭".to_string(),
        })
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn configure(&mut self, config: &PageConfig) -> BrowserResult<()> {
        let page = self.page()?;
        let setup_failed = |e: chromiumoxide::error::CdpError| BrowserError::PageSetupFailed {
            reason: e.to_string(),
        };

        page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(setup_failed)?;

        let headers = serde_json::to_value(&config.extra_headers).map_err(|e| {
            BrowserError::PageSetupFailed {
                reason: e.to_string(),
            }
        })?;
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
            .await
            .map_err(setup_failed)?;

        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(config.viewport.width),
            i64::from(config.viewport.height),
            1.0,
            false,
        ))
        .await
        .map_err(setup_failed)?;

        debug!("页面配置完成: UA / 请求头 / 视口 {}x{}", config.viewport.width, config.viewport.height);
        Ok(())
    }

    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> BrowserResult<()> {
        let page = self.page()?;
        debug!("导航到: {}", url);

        let navigation = async {
            // 先订阅再跳转，避免错过新文档的生命周期事件
            let mut lifecycle = match options.wait {
                WaitPolicy::NetworkIdle { .. } => Some(
                    page.event_listener::<EventLifecycleEvent>()
                        .await
                        .map_err(|e| BrowserError::navigation_failed(url, e))?,
                ),
                WaitPolicy::Load => None,
            };

            page.goto(url)
                .await
                .map_err(|e| BrowserError::navigation_failed(url, e))?;

            if let (Some(events), WaitPolicy::NetworkIdle { idle }) =
                (lifecycle.as_mut(), options.wait)
            {
                // 只看主框架，iframe 的事件不算
                let main_frame = page.mainframe().await.ok().flatten();
                let mut tracker = LifecycleTracker::default();
                while let Some(event) = events.next().await {
                    if main_frame.as_ref().is_some_and(|id| *id != event.frame_id) {
                        continue;
                    }
                    if tracker.observe(&event.name) {
                        debug!("网络已空闲: {}", url);
                        break;
                    }
                }
                if !idle.is_zero() {
                    sleep(idle).await;
                }
            }
            Ok::<(), BrowserError>(())
        };

        match timeout(options.timeout, navigation).await {
            Ok(result) => result,
            Err(_) => Err(BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_ms: options.timeout.as_millis() as u64,
            }),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, wait: Duration) -> BrowserResult<()> {
        let deadline = Instant::now() + wait;
        loop {
            if self.query(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::SelectorNotFound {
                    selector: selector.to_string(),
                });
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    async fn query(&mut self, selector: &str) -> BrowserResult<bool> {
        // querySelectorAll 没有匹配时返回空列表，出错说明页面本身有问题
        let elements = self.page()?.find_elements(selector).await?;
        Ok(!elements.is_empty())
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        let page = self.page()?;
        let element = match page.find_element(selector).await {
            Ok(element) => element,
            Err(_) => return Ok(None),
        };
        Ok(element.attribute(name).await?)
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        let page = self.page()?;
        let element = page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::SelectorNotFound {
                selector: selector.to_string(),
            })?;
        element
            .click()
            .await
            .map_err(|e| BrowserError::click_failed(selector, e))?;
        Ok(())
    }

    async fn content(&mut self) -> BrowserResult<String> {
        Ok(self.page()?.content().await?)
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.page = None;

        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();

        match result {
            Ok(_) => {
                debug!("浏览器已关闭");
                Ok(())
            }
            Err(e) => Err(BrowserError::CloseFailed {
                reason: e.to_string(),
            }),
        }
    }
}
