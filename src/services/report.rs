//! 报告生成 - 业务能力层
//!
//! 把排好序的结果渲染成 Telegram HTML 消息，不做任何计算

use crate::models::{Item, Purity, RankedResultSet};

/// 渲染每种纯度溢价最低的前 `top_n` 个商品
pub fn format_report(set: &RankedResultSet, top_n: usize) -> String {
    let sections: Vec<String> = Purity::ALL
        .iter()
        .map(|&purity| format_section(purity, set.top(purity, top_n)))
        .collect();

    format!(
        "\n\n🏆 Top {} Discounted Items:\n\n{}",
        top_n,
        sections.join("\n\n")
    )
}

fn format_section(purity: Purity, items: &[Item]) -> String {
    let body = if items.is_empty() {
        "No items found.".to_string()
    } else {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| format_item(index + 1, item))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    format!("<b>{} Gold Items:</b>\n\n{}", purity, body)
}

fn format_item(rank: usize, item: &Item) -> String {
    format!(
        "{}. <b>{}</b>\n   Rs. {}\n   Extra: {:.2}%\n   <a href=\"{}\">🔗 View Product</a>",
        rank,
        escape_html(&item.name),
        item.price_minor_units,
        item.effective_premium_percent,
        escape_html(&item.detail_url),
    )
}

/// Telegram HTML 模式下需要转义的字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
