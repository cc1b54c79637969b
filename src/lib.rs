//! # Coupon Watch
//!
//! 监控商品页上的限时优惠横幅，出现新折扣时采集全部金币商品并按实际溢价排名推送
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Browser）
//! - `browser/` - 浏览器能力抽象（`BrowserLauncher` / `BrowserSession`），chromiumoxide 实现
//! - `infrastructure/` - `SessionManager`，带重试地获取会话，负责释放
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心调度
//! - `BannerDetector` - 横幅检测
//! - `ProductExtractor` - 列表页商品提取和溢价计算
//! - `PaginatedCollector` - 翻页采集
//! - `format_report` - 排名报告
//! - `TelegramNotifier` - 发送通知
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次检查"的完整流程
//! - `CheckFlow` - 打开页面 → 检测 → 比较状态 → 采集/报告
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/monitor` - 周期调度、会话生命周期、通知
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{BrowserLauncher, BrowserSession};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::SessionManager;
pub use models::{DetectionState, Item, Purity, RankedResultSet};
pub use orchestrator::{App, Monitor};
pub use workflow::{CheckFlow, CheckOutcome, CycleReport};
