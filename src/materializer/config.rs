//! # 物化配置模块
//!
//! ## 设计思路
//!
//! 将物化阶段所有“可调策略”集中到 `MaterializerConfig`，
//! 保证运行时行为可观测、可调整、可测试。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用配置，JPEG 质量固定为 80（上层消费方依赖该约定）。
//! - 体积与像素上限用于在解码前快速拒绝恶意或异常输入。

/// 图片物化配置。
///
/// 字段覆盖读取、解码与重编码三个阶段。
#[derive(Debug, Clone)]
pub struct MaterializerConfig {
    /// 静图重编码为 JPEG 时的质量（1..=100）。
    pub jpeg_quality: u8,
    /// 单个句柄允许读取的最大字节数。
    pub max_source_bytes: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 80,
            max_source_bytes: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
        }
    }
}

impl MaterializerConfig {
    /// 编码阶段实际使用的质量值（夹取到合法区间）。
    pub(crate) fn effective_jpeg_quality(&self) -> u8 {
        self.jpeg_quality.clamp(1, 100)
    }
}
