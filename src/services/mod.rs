pub mod banner_detector;
pub mod notifier;
pub mod paginated_collector;
pub mod product_parser;
pub mod report;

pub use banner_detector::BannerDetector;
pub use notifier::{Notifier, TelegramNotifier};
pub use paginated_collector::{CollectorSettings, PaginatedCollector};
pub use product_parser::ProductExtractor;
pub use report::format_report;
