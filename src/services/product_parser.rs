//! 商品解析服务 - 业务能力层
//!
//! 从列表页 HTML 中提取商品：纯度、克重、价格、链接，并计算溢价。
//! 解析规则与站点的命名习惯绑定。

use scraper::Selector;
use tracing::{debug, warn};
use url::Url;

use crate::browser::dom::{selector, Document, Element};
use crate::config::SiteSelectors;
use crate::error::BrowserResult;
use crate::models::{Item, Purity, ReferencePrices};

/// 按 JavaScript `parseFloat` 的方式读取字符串开头的数字
pub fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    // 指数部分
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// 按 JavaScript `parseInt` 的方式读取字符串开头的整数
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().ok().map(|v| sign * v)
}

/// 从商品名解析克重
///
/// 主规则：按 `-` 分割后取第二段开头的数字（"22K Gold Coin - 8 gm" → 8）。
/// 兜底规则：按 "oin" 分割，丢弃开头整数为 22 或 24（纯度标记）或不是数字的片段，
/// 取第一个剩余片段开头的数字。该启发式只适用于站点现有的命名方式。
pub fn parse_quantity(name: &str) -> Option<f64> {
    let primary = name.split('-').nth(1).and_then(parse_leading_float);
    if primary.is_some() {
        return primary;
    }

    name.split("oin")
        .find(|token| matches!(parse_leading_int(token), Some(n) if n != 22 && n != 24))
        .and_then(parse_leading_float)
}

/// 从价格标签解析价格，取第一个 "Rs. " 之后的整数，允许千分位逗号
pub fn parse_price(label: &str) -> Option<i64> {
    let after = label.split("Rs. ").nth(1)?;
    let digits: String = after
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// 列表页商品提取器
pub struct ProductExtractor {
    card: Selector,
    name: Selector,
    price: Selector,
    link: Selector,
    base_url: Option<Url>,
    prices: ReferencePrices,
}

impl ProductExtractor {
    pub fn new(
        selectors: &SiteSelectors,
        base_url: &str,
        prices: ReferencePrices,
    ) -> BrowserResult<Self> {
        let base_url = match Url::parse(base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("站点根地址无效 ({}): {}，商品链接将保持原样", base_url, e);
                None
            }
        };

        Ok(Self {
            card: selector(&selectors.product_card)?,
            name: selector(&selectors.product_name)?,
            price: selector(&selectors.product_price)?,
            link: selector(&selectors.card_link)?,
            base_url,
            prices,
        })
    }

    /// 提取一页中的全部可计算溢价的商品
    pub fn extract(&self, html: &str, coupon_discount_percent: f64) -> Vec<Item> {
        let doc = Document::parse(html);
        doc.query_all(&self.card)
            .into_iter()
            .filter_map(|card| self.extract_card(card, coupon_discount_percent))
            .collect()
    }

    fn extract_card(&self, card: Element<'_>, coupon_discount_percent: f64) -> Option<Item> {
        let name = card.query(&self.name)?.text();
        let Some(purity) = Purity::from_name(&name) else {
            debug!("跳过无纯度标记的商品: {}", name);
            return None;
        };
        let Some(quantity) = parse_quantity(&name) else {
            debug!("无法解析克重，跳过: {}", name);
            return None;
        };
        let price_label = card.query(&self.price)?.text();
        let Some(price) = parse_price(&price_label) else {
            debug!("无法解析价格 '{}'，跳过: {}", price_label, name);
            return None;
        };

        let href = card
            .query(&self.link)
            .and_then(|a| a.attribute("href"))
            .unwrap_or_default();
        let detail_url = self.resolve(href);

        Item::priced(
            name,
            detail_url,
            quantity,
            price,
            purity,
            &self.prices,
            coupon_discount_percent,
        )
    }

    /// 把相对链接补全为绝对链接
    pub fn resolve(&self, href: &str) -> String {
        match &self.base_url {
            Some(base) => base
                .join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
            None => href.to_string(),
        }
    }
}
