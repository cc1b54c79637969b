//! 浏览器能力层
//!
//! 只暴露"启动 / 导航 / 查询 / 点击 / 读取内容 / 关闭"这些能力，
//! 不认识商品和横幅。`headless` 基于 chromiumoxide 实现，测试中可替换为假实现。

pub mod dom;
pub mod headless;
pub mod options;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserResult;

pub use headless::{ChromiumLauncher, ChromiumSession};
pub use options::{
    LaunchConfig, LaunchOverrides, NavigateOptions, PageConfig, Viewport, WaitPolicy,
};

/// 启动浏览器会话
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    /// 启动一个浏览器进程并打开一个空白页
    async fn launch(&self, config: &LaunchConfig) -> BrowserResult<Self::Session>;
}

/// 一个浏览器进程加一个页面，独占所有权，用完必须 `close`
#[async_trait]
pub trait BrowserSession: Send {
    /// 设置 UA、额外请求头和视口
    async fn configure(&mut self, page: &PageConfig) -> BrowserResult<()>;

    async fn navigate(&mut self, url: &str, options: NavigateOptions) -> BrowserResult<()>;

    /// 等待元素出现，超时返回 `SelectorNotFound`
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// 元素是否存在
    async fn query(&mut self, selector: &str) -> BrowserResult<bool>;

    /// 第一个匹配元素的属性
    async fn attribute(&mut self, selector: &str, name: &str) -> BrowserResult<Option<String>>;

    async fn click(&mut self, selector: &str) -> BrowserResult<()>;

    /// 当前页面的 HTML
    async fn content(&mut self) -> BrowserResult<String>;

    /// 关闭页面和浏览器进程，重复调用无副作用
    async fn close(&mut self) -> BrowserResult<()>;
}
