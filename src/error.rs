//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义顶层统一的 `PasteError` 枚举，聚合各子模块的错误类型，
//! 避免宿主桥接层面对多个错误类型逐一匹配。
//!
//! 拦截链路内部错误全部降级为“不受支持”事件，不会以 `PasteError`
//! 形式冒泡；该类型服务于宿主主动调用的装配 API（构建物化器、
//! 安装监控等）。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为各子模块错误提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于跨桥接层透传。

use serde::Serialize;

use crate::clipboard::ClipboardError;
use crate::materializer::MaterializeError;
use crate::widget::InstallError;

/// 子系统统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum PasteError {
    /// 图片物化链路错误（读取 / 解码 / 编码 / 落盘）
    #[error("{0}")]
    Materialize(#[from] MaterializeError),

    /// 剪贴板快照错误
    #[error("{0}")]
    Clipboard(#[from] ClipboardError),

    /// 拦截器安装错误
    #[error("拦截器安装失败: {0}")]
    Install(#[from] InstallError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 将错误序列化为人类可读的字符串，便于桥接层直接透传。
impl Serialize for PasteError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
