pub mod detection;
pub mod item;
pub mod ranked;

pub use detection::{Detection, DetectionState, DiscountLevel, Transition};
pub use item::{effective_premium_percent, Item, Purity, ReferencePrices};
pub use ranked::RankedResultSet;
