/// 黄金纯度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purity {
    /// 22K
    TwentyTwoK,
    /// 24K
    TwentyFourK,
}

impl Purity {
    /// 全部纯度，按报告顺序
    pub const ALL: [Purity; 2] = [Purity::TwentyTwoK, Purity::TwentyFourK];

    /// 克拉数
    pub fn karat(self) -> u32 {
        match self {
            Purity::TwentyTwoK => 22,
            Purity::TwentyFourK => 24,
        }
    }

    /// 商品名中出现的标记
    pub fn marker(self) -> &'static str {
        match self {
            Purity::TwentyTwoK => "22K",
            Purity::TwentyFourK => "24K",
        }
    }

    /// 根据商品名判断纯度，24K 优先
    pub fn from_name(name: &str) -> Option<Self> {
        if name.contains(Purity::TwentyFourK.marker()) {
            Some(Purity::TwentyFourK)
        } else if name.contains(Purity::TwentyTwoK.marker()) {
            Some(Purity::TwentyTwoK)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Purity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// 每克参考金价
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePrices {
    pub per_gram_22k: f64,
    pub per_gram_24k: f64,
}

impl ReferencePrices {
    pub fn per_gram(&self, purity: Purity) -> f64 {
        match purity {
            Purity::TwentyTwoK => self.per_gram_22k,
            Purity::TwentyFourK => self.per_gram_24k,
        }
    }
}

impl Default for ReferencePrices {
    fn default() -> Self {
        Self {
            per_gram_22k: 9090.0,
            per_gram_24k: 9924.0,
        }
    }
}

/// 计算有效溢价百分比
///
/// `(price / (qty * ref) - 1) * 100 - discount`，负数表示低于金价
pub fn effective_premium_percent(
    price: i64,
    quantity_grams: f64,
    reference_per_gram: f64,
    coupon_discount_percent: f64,
) -> f64 {
    (price as f64 / (quantity_grams * reference_per_gram) - 1.0) * 100.0 - coupon_discount_percent
}

/// 列表页上的一个商品
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub detail_url: String,
    pub quantity_grams: f64,
    pub price_minor_units: i64,
    pub purity: Purity,
    pub effective_premium_percent: f64,
}

impl Item {
    /// 创建商品并计算溢价，溢价不是有限数时返回 None
    pub fn priced(
        name: impl Into<String>,
        detail_url: impl Into<String>,
        quantity_grams: f64,
        price_minor_units: i64,
        purity: Purity,
        prices: &ReferencePrices,
        coupon_discount_percent: f64,
    ) -> Option<Self> {
        let premium = effective_premium_percent(
            price_minor_units,
            quantity_grams,
            prices.per_gram(purity),
            coupon_discount_percent,
        );
        if !premium.is_finite() {
            return None;
        }

        Some(Self {
            name: name.into(),
            detail_url: detail_url.into(),
            quantity_grams,
            price_minor_units,
            purity,
            effective_premium_percent: premium,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_with_coupon() {
        let premium = effective_premium_percent(91000, 10.0, 9090.0, 5.0);
        let expected = (91000.0 / 90900.0 - 1.0) * 100.0 - 5.0;
        assert!((premium - expected).abs() < 1e-6);
        assert!((premium - (-4.89)).abs() < 0.01);
    }

    #[test]
    fn test_purity_from_name() {
        assert_eq!(Purity::from_name("22K Gold Coin - 8 gm"), Some(Purity::TwentyTwoK));
        assert_eq!(Purity::from_name("8 gm 24K Coin"), Some(Purity::TwentyFourK));
        assert_eq!(Purity::from_name("Silver Coin - 10 gm"), None);
    }

    #[test]
    fn test_zero_quantity_is_not_priced() {
        let item = Item::priced(
            "24K Gold Coin - 0 gm",
            "https://example.com/p/1",
            0.0,
            5000,
            Purity::TwentyFourK,
            &ReferencePrices::default(),
            0.0,
        );
        assert!(item.is_none());
    }

    #[test]
    fn test_purity_order_follows_report() {
        assert!(Purity::TwentyTwoK < Purity::TwentyFourK);
        assert_eq!(Purity::TwentyFourK.karat(), 24);
    }
}
