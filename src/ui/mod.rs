//! 终端 UI 模块
//!
//! Input: PredictionResult
//! Output: 面板文本、错误提示
//! Pos: 预测结果展示层

pub mod alert;
pub mod dashboard;
pub mod ring;

pub use alert::{Alert, TerminalAlert};
pub use dashboard::{Dashboard, Tab};
