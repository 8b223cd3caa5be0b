//! # 物化错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载图片物化链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。

/// 图片物化统一错误类型。
///
/// 拦截层捕获该类型后降级为“不受支持”事件，错误本身不会向宿主传播。
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("流打开失败：{0}")]
    StreamOpen(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("落盘错误：{0}")]
    Store(String),

    #[error("空批次：分类结果不含任何图片")]
    EmptyBatch,
}
