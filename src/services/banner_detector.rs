//! 横幅检测服务 - 业务能力层
//!
//! 只负责"页面上有没有横幅、折扣是多少"，不导航，不关心状态

use regex::Regex;
use scraper::Selector;
use tracing::debug;

use crate::browser::dom::{selector, Document};
use crate::config::SiteSelectors;
use crate::error::{BrowserError, BrowserResult};
use crate::models::Detection;

/// 横幅检测器
pub struct BannerDetector {
    label: String,
    banner: Selector,
    coupon: Selector,
    coupon_marker: String,
    discount_re: Regex,
    savings_re: Regex,
}

impl BannerDetector {
    pub fn new(label: impl Into<String>, selectors: &SiteSelectors) -> BrowserResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| BrowserError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            label: label.into(),
            banner: selector(&selectors.banner)?,
            coupon: selector(&selectors.coupon_label)?,
            coupon_marker: selectors.coupon_marker.clone(),
            discount_re: compile(r"(\d+)%\s+off")?,
            savings_re: compile(r"saving: Rs\. (\d+)")?,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// 在页面快照上检测横幅
    ///
    /// 找不到折扣或节省金额时对应字段为 None，而不是报错
    pub fn detect(&self, html: &str) -> Detection {
        let doc = Document::parse(html);

        if doc.contains_text(&self.banner, &self.label).is_empty() {
            debug!("页面上没有 {} 横幅", self.label);
            return Detection::absent();
        }

        let coupon_text: String = doc
            .contains_text(&self.coupon, &self.coupon_marker)
            .iter()
            .map(|el| el.raw_text())
            .collect();
        debug!("优惠券说明: {}", coupon_text);

        Detection {
            found: true,
            discount_percent: capture_number(&self.discount_re, &coupon_text),
            savings: capture_number(&self.savings_re, &coupon_text),
        }
    }
}

fn capture_number<T: std::str::FromStr>(re: &Regex, text: &str) -> Option<T> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
