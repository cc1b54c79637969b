//! 单次检查流程 - 流程层
//!
//! 核心职责：定义"一次检查"的完整流程
//!
//! 流程顺序：
//! 1. 打开目标页（失败即终止本轮）
//! 2. 进入第一个商品的详情页（失败只降级）
//! 3. 检测横幅 → 与上次状态比较
//! 4. 新折扣 → 分页采集 + 排名报告；横幅消失 → 消失通知

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::dom::{selector, Document};
use crate::browser::{BrowserSession, NavigateOptions};
use crate::config::{Config, SiteSelectors};
use crate::error::{AppResult, BrowserResult};
use crate::models::{DetectionState, DiscountLevel, Transition};
use crate::services::{BannerDetector, CollectorSettings, PaginatedCollector, ProductExtractor};
use crate::utils::logging::truncate_text;

/// 一次检查的结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub notify: bool,
    pub message: String,
}

impl CheckOutcome {
    fn silent(message: impl Into<String>) -> Self {
        Self {
            notify: false,
            message: message.into(),
        }
    }

    fn notify(message: impl Into<String>) -> Self {
        Self {
            notify: true,
            message: message.into(),
        }
    }
}

/// 一次检查的结果和更新后的状态
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CheckOutcome,
    pub state: DetectionState,
}

/// 检查流程
///
/// - 不持有会话，会话由编排层获取和释放
/// - 状态通过参数传入、通过返回值传出
pub struct CheckFlow {
    target_url: String,
    base_url: String,
    selectors: SiteSelectors,
    navigation: NavigateOptions,
    detail_navigation: NavigateOptions,
    selector_timeout: Duration,
    detector: BannerDetector,
    collector: PaginatedCollector,
    top_n: usize,
}

impl CheckFlow {
    pub fn from_config(config: &Config, selectors: SiteSelectors) -> AppResult<Self> {
        let navigation = NavigateOptions::network_idle(config.navigation_timeout(), Duration::ZERO);
        let extractor = ProductExtractor::new(
            &selectors,
            &config.site_base_url,
            config.reference_prices(),
        )?;
        let collector = PaginatedCollector::new(
            extractor,
            CollectorSettings {
                listing_url: config.target_url.clone(),
                navigation,
                next_page_selector: selectors.next_page.clone(),
                settle_delay: config.settle_delay(),
                max_pages: config.max_pages,
            },
        );

        Ok(Self {
            target_url: config.target_url.clone(),
            base_url: config.site_base_url.clone(),
            detector: BannerDetector::new(config.banner_label.clone(), &selectors)?,
            selectors,
            navigation,
            detail_navigation: NavigateOptions::network_idle(
                config.navigation_timeout(),
                config.detail_idle(),
            ),
            selector_timeout: config.selector_timeout(),
            collector,
            top_n: config.top_n,
        })
    }

    /// 执行一次检查
    pub async fn run<S>(&self, session: &mut S, state: DetectionState) -> AppResult<CycleReport>
    where
        S: BrowserSession + ?Sized,
    {
        let label = self.detector.label();
        info!("🔍 正在检查 {}...", label);

        session.navigate(&self.target_url, self.navigation).await?;
        self.wait_for_products(session).await;
        self.open_product_detail(session).await;

        let html = session.content().await?;
        let detection = self.detector.detect(&html);
        let (next_state, transition) = state.observe(&detection);

        let outcome = match transition {
            Transition::Found(level) => {
                info!("🟢 发现 {}，折扣: {}%", label, level);
                let report = self
                    .collector
                    .collect_and_rank(session, level.as_coupon_percent(), self.top_n)
                    .await?;
                CheckOutcome::notify(format!(
                    "{}{}",
                    found_message(label, level),
                    report
                ))
            }
            Transition::Gone => {
                info!("❌ {} 已消失", label);
                CheckOutcome::notify(format!("❌ {} gone!!", label))
            }
            Transition::Unchanged if detection.found => {
                info!("{} 仍在，折扣未变 ({}%)，不重复通知", label, state.last_known);
                CheckOutcome::silent(found_message(label, state.last_known))
            }
            Transition::Unchanged => {
                info!("❌ 页面上没有 {}", label);
                CheckOutcome::silent(format!("{} not found on the page.", label))
            }
        };

        Ok(CycleReport {
            outcome,
            state: next_state,
        })
    }

    /// 等待商品链接出现，超时只记录页面内容
    async fn wait_for_products<S>(&self, session: &mut S)
    where
        S: BrowserSession + ?Sized,
    {
        let link = &self.selectors.product_link;
        if let Err(e) = session.wait_for_selector(link, self.selector_timeout).await {
            warn!("⚠️ 等待 {} 失败: {}，输出页面内容用于排查", link, e);
            dump_content(session).await;
        }
    }

    /// 进入第一个商品的详情页，任何失败都只降级为在当前页检测
    async fn open_product_detail<S>(&self, session: &mut S)
    where
        S: BrowserSession + ?Sized,
    {
        let href = match self.first_product_href(session).await {
            Ok(Some(href)) => href,
            Ok(None) => {
                warn!("⚠️ could not resolve product URL，输出页面内容用于排查");
                dump_content(session).await;
                return;
            }
            Err(e) => {
                warn!("⚠️ 读取商品链接出错: {}", e);
                return;
            }
        };

        let full_url = match url::Url::parse(&self.base_url).and_then(|base| base.join(&href)) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("⚠️ could not resolve product URL '{}': {}", href, e);
                return;
            }
        };

        info!("🔗 进入商品详情页: {}", full_url);
        match session.navigate(&full_url, self.detail_navigation).await {
            Ok(()) => info!("✅ 详情页内容已稳定"),
            Err(e) if e.is_soft() => warn!("⚠️ 详情页加载超时，继续在当前页检测: {}", e),
            Err(e) => warn!("⚠️ 打开详情页失败，继续在当前页检测: {}", e),
        }
    }

    async fn first_product_href<S>(&self, session: &mut S) -> BrowserResult<Option<String>>
    where
        S: BrowserSession + ?Sized,
    {
        let link = &self.selectors.product_link;
        if let Some(href) = session.attribute(link, "href").await? {
            return Ok(Some(href));
        }
        // 浏览器端拿不到时再从 HTML 里找一次
        let html = session.content().await?;
        let doc = Document::parse(&html);
        Ok(doc
            .query(&selector(link)?)
            .and_then(|a| a.attribute("href"))
            .map(str::to_string))
    }
}

fn found_message(label: &str, level: DiscountLevel) -> String {
    format!("🟢 Found {}!\nDiscount: {}%", label, level)
}

async fn dump_content<S>(session: &mut S)
where
    S: BrowserSession + ?Sized,
{
    match session.content().await {
        Ok(html) => {
            warn!("页面内容预览: {}", truncate_text(&html, 500));
            debug!("完整页面内容:\n{}", html);
        }
        Err(e) => warn!("读取页面内容失败: {}", e),
    }
}
