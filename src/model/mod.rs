//! 数据模型：配置与预测请求/响应

pub mod config;
pub mod prediction;
