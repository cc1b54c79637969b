//! HTML 解析能力
//!
//! 在页面快照上做结构化查询，不接触浏览器

use scraper::{ElementRef, Html, Selector};

use crate::error::{BrowserError, BrowserResult};

/// 解析 CSS 选择器
pub fn selector(css: &str) -> BrowserResult<Selector> {
    Selector::parse(css).map_err(|e| BrowserError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// 已解析的 HTML 文档
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// 第一个匹配的元素
    pub fn query(&self, selector: &Selector) -> Option<Element<'_>> {
        self.html.select(selector).next().map(Element)
    }

    pub fn query_all(&self, selector: &Selector) -> Vec<Element<'_>> {
        self.html.select(selector).map(Element).collect()
    }

    /// 匹配选择器且文本包含 `needle` 的元素（相当于 jQuery 的 `:contains`）
    pub fn contains_text(&self, selector: &Selector, needle: &str) -> Vec<Element<'_>> {
        self.html
            .select(selector)
            .map(Element)
            .filter(|el| el.raw_text().contains(needle))
            .collect()
    }
}

/// 文档中的元素
#[derive(Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    pub fn query(&self, selector: &Selector) -> Option<Element<'a>> {
        self.0.select(selector).next().map(Element)
    }

    /// 所有后代文本直接拼接
    pub fn raw_text(&self) -> String {
        self.0.text().collect()
    }

    /// 合并空白并去掉首尾空白后的文本
    pub fn text(&self) -> String {
        self.0
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <ul class="list">
          <li class="card"><a href="/p/1">First
             <span>item</span></a></li>
          <li class="card"><a href="/p/2">Second</a></li>
        </ul>"#;

    #[test]
    fn test_query_and_attribute() {
        let doc = Document::parse(HTML);
        let link = doc.query(&selector(".card a").unwrap()).unwrap();
        assert_eq!(link.attribute("href"), Some("/p/1"));
        assert_eq!(link.text(), "First item");
    }

    #[test]
    fn test_contains_text() {
        let doc = Document::parse(HTML);
        let hits = doc.contains_text(&selector(".card").unwrap(), "Second");
        assert_eq!(hits.len(), 1);
        assert_eq!(doc.query_all(&selector(".card").unwrap()).len(), 2);
    }

    #[test]
    fn test_invalid_selector() {
        assert!(matches!(
            selector("..bad"),
            Err(BrowserError::InvalidSelector { .. })
        ));
    }
}
