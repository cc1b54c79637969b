//! 测试用的假浏览器和假通知器
//!
//! 页面内容来自内存中的 `Site`，查询和读取属性用 scraper 在 HTML 上完成

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use coupon_watch::browser::{
    BrowserLauncher, BrowserSession, LaunchConfig, NavigateOptions, PageConfig,
};
use coupon_watch::config::Config;
use coupon_watch::error::{BrowserError, BrowserResult, NotifyError};
use coupon_watch::services::Notifier;
use scraper::{Html, Selector};

pub const BASE_URL: &str = "https://shop.test";
pub const LISTING_URL: &str = "https://shop.test/gold-coins";
pub const DETAIL_URL: &str = "https://shop.test/coin/1";

/// 内存中的站点：URL → 多页 HTML（点击"下一页"翻到下一项）
#[derive(Debug, Clone, Default)]
pub struct Site {
    pub routes: HashMap<String, Vec<String>>,
    /// 在第几页点击"下一页"时失败
    pub fail_click_on_page: Option<usize>,
    /// 在第几页查询元素时浏览器报错
    pub fail_query_on_page: Option<usize>,
}

impl Site {
    pub fn with_route(mut self, url: &str, pages: Vec<String>) -> Self {
        self.routes.insert(url.to_string(), pages);
        self
    }

    /// 列表页 + 详情页
    pub fn shop(listing: Vec<String>, detail: String) -> Self {
        Self::default()
            .with_route(LISTING_URL, listing)
            .with_route(DETAIL_URL, vec![detail])
    }
}

/// 会话计数器，多个会话共享
#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicU32,
    pub closes: AtomicU32,
    pub clicks: AtomicU32,
}

impl Counters {
    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u32 {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn clicks(&self) -> u32 {
        self.clicks.load(Ordering::SeqCst)
    }
}

pub struct FakeSession {
    site: Site,
    current: Option<(String, usize)>,
    counters: Arc<Counters>,
    closed: bool,
    fail_configure: bool,
}

impl FakeSession {
    pub fn new(site: Site, counters: Arc<Counters>) -> Self {
        Self {
            site,
            current: None,
            counters,
            closed: false,
            fail_configure: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn html(&self) -> BrowserResult<String> {
        let (url, index) = self
            .current
            .as_ref()
            .ok_or_else(|| BrowserError::ContentUnavailable {
                reason: "尚未导航".to_string(),
            })?;
        Ok(self.site.routes[url][*index].clone())
    }

    fn first_match<T>(
        &self,
        css: &str,
        f: impl Fn(scraper::ElementRef<'_>) -> T,
    ) -> BrowserResult<Option<T>> {
        let selector = Selector::parse(css).map_err(|e| BrowserError::InvalidSelector {
            selector: css.to_string(),
            reason: e.to_string(),
        })?;
        let doc = Html::parse_document(&self.html()?);
        let found = doc.select(&selector).next().map(f);
        Ok(found)
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn configure(&mut self, _page: &PageConfig) -> BrowserResult<()> {
        if self.fail_configure {
            return Err(BrowserError::PageSetupFailed {
                reason: "模拟页面配置失败".to_string(),
            });
        }
        Ok(())
    }

    async fn navigate(&mut self, url: &str, _options: NavigateOptions) -> BrowserResult<()> {
        if !self.site.routes.contains_key(url) {
            return Err(BrowserError::navigation_failed(url, "404"));
        }
        self.current = Some((url.to_string(), 0));
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
        if self.query(selector).await? {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound {
                selector: selector.to_string(),
            })
        }
    }

    async fn query(&mut self, selector: &str) -> BrowserResult<bool> {
        if let Some((_, index)) = &self.current {
            if self.site.fail_query_on_page == Some(index + 1) {
                return Err(BrowserError::ContentUnavailable {
                    reason: "模拟页面断开".to_string(),
                });
            }
        }
        Ok(self.first_match(selector, |_| ())?.is_some())
    }

    async fn attribute(&mut self, selector: &str, name: &str) -> BrowserResult<Option<String>> {
        Ok(self
            .first_match(selector, |el| el.value().attr(name).map(str::to_string))?
            .flatten())
    }

    async fn click(&mut self, selector: &str) -> BrowserResult<()> {
        self.counters.clicks.fetch_add(1, Ordering::SeqCst);
        let (url, index) = self
            .current
            .clone()
            .ok_or_else(|| BrowserError::click_failed(selector, "尚未导航"))?;
        if self.site.fail_click_on_page == Some(index + 1) {
            return Err(BrowserError::click_failed(selector, "元素不可点击"));
        }
        if !self.query(selector).await? {
            return Err(BrowserError::click_failed(selector, "元素不存在"));
        }
        let last = self.site.routes[&url].len() - 1;
        self.current = Some((url, (index + 1).min(last)));
        Ok(())
    }

    async fn content(&mut self) -> BrowserResult<String> {
        self.html()
    }

    async fn close(&mut self) -> BrowserResult<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// 假启动器：前 `failures` 次启动失败，之后每次用当前站点快照创建会话
///
/// `configure_failures` 控制前几个成功启动的会话在配置页面时失败
pub struct FakeLauncher {
    pub site: Arc<Mutex<Site>>,
    pub failures: u32,
    pub configure_failures: u32,
    pub counters: Arc<Counters>,
}

impl FakeLauncher {
    pub fn new(site: Site) -> Self {
        Self {
            site: Arc::new(Mutex::new(site)),
            failures: 0,
            configure_failures: 0,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn failing(mut self, failures: u32) -> Self {
        self.failures = failures;
        self
    }

    pub fn failing_configure(mut self, failures: u32) -> Self {
        self.configure_failures = failures;
        self
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _config: &LaunchConfig) -> BrowserResult<FakeSession> {
        let attempt = self.counters.launches.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            return Err(BrowserError::LaunchFailed {
                reason: format!("模拟启动失败 #{}", attempt),
            });
        }
        let site = self.site.lock().unwrap().clone();
        let mut session = FakeSession::new(site, self.counters.clone());
        session.fail_configure = attempt - self.failures <= self.configure_failures;
        Ok(session)
    }
}

/// 记录所有消息的通知器
#[derive(Clone, Default)]
pub struct FakeNotifier {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl FakeNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// 测试配置：无等待、单次运行
pub fn test_config() -> Config {
    Config {
        target_url: LISTING_URL.to_string(),
        site_base_url: BASE_URL.to_string(),
        telegram_bot_id: "123:abc".to_string(),
        telegram_chat_id: "42".to_string(),
        launch_retry_delay_ms: 1,
        settle_delay_ms: 0,
        detail_idle_ms: 0,
        run_once: true,
        ..Config::default()
    }
}

/// 一张商品卡片
pub fn card(id: usize, name: &str, price: i64) -> String {
    format!(
        r#"<li class="product-base"><a href="/coin/{id}">
             <h4 class="product-product">{name}</h4>
             <div class="product-price"><span>Rs. {price}</span></div></a></li>"#
    )
}

/// 列表页，`has_next` 控制是否有"下一页"按钮
pub fn listing_page(cards: &[String], has_next: bool) -> String {
    let next = if has_next {
        r##"<li class="pagination-next"><a href="#">Next</a></li>"##
    } else {
        ""
    };
    format!(
        r#"<html><body><ul class="results-base">{}</ul><ul class="pagination">{}</ul></body></html>"#,
        cards.join("\n"),
        next
    )
}

/// 详情页，`discount` 为 None 时没有横幅
pub fn detail_page(discount: Option<u32>) -> String {
    let offer = match discount {
        Some(p) => format!(
            r#"<div class="pdp-offers-boldText">BLINKDEAL</div>
               <div class="pdp-offers-labelMarkup">Coupon Discount: {p}% off (Your total saving: Rs. 4500)</div>"#
        ),
        None => r#"<div class="pdp-offers-boldText">BANKOFFER</div>"#.to_string(),
    };
    format!("<html><body><h1>22K Gold Coin - 10 gm</h1>{}</body></html>", offer)
}

/// 三页，每页四个 22K 商品，价格逐渐降低
pub fn three_listing_pages() -> Vec<String> {
    (0..3)
        .map(|page| {
            let cards: Vec<String> = (0..4)
                .map(|i| {
                    let id = page * 4 + i + 1;
                    card(id, "22K Gold Coin - 10 gm", 100_000 - (id as i64) * 500)
                })
                .collect();
            listing_page(&cards, page < 2)
        })
        .collect()
}
