//! 分页采集服务 - 业务能力层
//!
//! 在一个会话上顺序翻页：提取 → 合并 → 点击下一页，直到没有下一页或达到页数上限

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::{BrowserSession, NavigateOptions};
use crate::error::{AppError, AppResult};
use crate::models::{Purity, RankedResultSet};
use crate::services::product_parser::ProductExtractor;
use crate::services::report::format_report;

/// 分页采集参数
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub listing_url: String,
    pub navigation: NavigateOptions,
    pub next_page_selector: String,
    /// 点击下一页后的等待
    pub settle_delay: Duration,
    pub max_pages: usize,
}

/// 分页采集器
pub struct PaginatedCollector {
    extractor: ProductExtractor,
    settings: CollectorSettings,
}

impl PaginatedCollector {
    pub fn new(extractor: ProductExtractor, settings: CollectorSettings) -> Self {
        Self {
            extractor,
            settings,
        }
    }

    /// 采集全部页面并排序
    ///
    /// 任何导航、读取、点击失败都会包装成 `Collection` 错误
    pub async fn collect<S>(
        &self,
        session: &mut S,
        coupon_discount_percent: f64,
    ) -> AppResult<RankedResultSet>
    where
        S: BrowserSession + ?Sized,
    {
        let settings = &self.settings;
        info!("📄 开始采集列表页: {}", settings.listing_url);

        session
            .navigate(&settings.listing_url, settings.navigation)
            .await
            .map_err(|e| AppError::collection(1, e))?;

        let max_pages = settings.max_pages.max(1);
        let mut results = RankedResultSet::new();
        let mut page = 1;

        loop {
            let html = session
                .content()
                .await
                .map_err(|e| AppError::collection(page, e))?;
            let items = self.extractor.extract(&html, coupon_discount_percent);
            info!("✓ 第 {} 页采集完成，{} 个商品", page, items.len());
            results.merge_page(items);

            let has_next = session
                .query(&settings.next_page_selector)
                .await
                .map_err(|e| AppError::collection(page, e))?;
            if !has_next {
                debug!("没有下一页，采集结束");
                break;
            }
            if page >= max_pages {
                warn!("⚠️ 已达到页数上限 {}，停止翻页", max_pages);
                break;
            }

            session
                .click(&settings.next_page_selector)
                .await
                .map_err(|e| AppError::collection(page, e))?;
            sleep(settings.settle_delay).await;
            page += 1;
        }

        results.rank();
        log_summary(&results);
        Ok(results)
    }

    /// 采集并渲染报告
    pub async fn collect_and_rank<S>(
        &self,
        session: &mut S,
        coupon_discount_percent: f64,
        top_n: usize,
    ) -> AppResult<String>
    where
        S: BrowserSession + ?Sized,
    {
        let results = self.collect(session, coupon_discount_percent).await?;
        Ok(format_report(&results, top_n))
    }
}

fn log_summary(results: &RankedResultSet) {
    info!(
        "📊 共 {} 页，{} 个商品",
        results.pages_visited(),
        results.total_items()
    );
    for purity in Purity::ALL {
        if let Some(best) = results.items(purity).first() {
            info!(
                "🏆 {} 最低溢价: {:.2}% ({})",
                purity, best.effective_premium_percent, best.name
            );
        }
    }
}
