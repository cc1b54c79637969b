//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责周期调度和资源管理，是整个系统的"指挥中心"。
//!
//! ### `monitor` - 周期监控器
//! - 管理应用生命周期（初始化、运行、退出）
//! - 每个周期获取并释放一个浏览器会话
//! - 持有检测状态，决定是否发送通知
//!
//! ## 层次关系
//!
//! ```text
//! monitor (周期调度 + 通知)
//!     ↓
//! workflow::CheckFlow (单次检查)
//!     ↓
//! services (能力层：banner / collector / report / notifier)
//!     ↓
//! infrastructure + browser (会话管理、浏览器能力)
//! ```

pub mod monitor;

pub use monitor::{App, Monitor};
