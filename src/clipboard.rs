//! # 剪贴板快照模块
//!
//! ## 设计思路
//!
//! 传统粘贴路径（菜单动作）没有平台递来的内容负载，需要主动读取系统剪贴板。
//! 这里把“读一次剪贴板”抽象为快照：一次性取回所有条目，后续分类与物化
//! 只操作快照，不再触碰系统剪贴板。
//!
//! ## 实现思路
//!
//! - `ClipboardSnapshotProvider` 为注入点，测试以内存实现替换。
//! - `SystemClipboard` 基于 `arboard`：优先文件列表，必要时读取位图
//!   并在内存中合成 PNG 句柄，最后补充文本条目。
//! - 单一形态读取失败不致命；全部失败且无条目时才报读取错误。

use std::io::Cursor;

use arboard::Clipboard;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::clip::{ClipHandle, ClipItem};

/// 剪贴板快照错误。
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("剪贴板不可用：{0}")]
    Unavailable(String),

    #[error("剪贴板读取失败：{0}")]
    Read(String),
}

/// 系统剪贴板快照入口。
pub trait ClipboardSnapshotProvider {
    /// 读取当前剪贴板的全部条目。
    ///
    /// 空剪贴板返回 `Ok(空列表)`，由上层归类为不受支持。
    fn snapshot(&self) -> Result<Vec<ClipItem>, ClipboardError>;
}

/// 基于 `arboard` 的默认实现。
///
/// 每次快照新建剪贴板连接，避免长期持有平台句柄。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    /// 把剪贴板位图（RGBA 裸字节）合成为内存 PNG 句柄条目。
    fn synthesize_png_item(image: &arboard::ImageData<'_>) -> Result<ClipItem, String> {
        let width =
            u32::try_from(image.width).map_err(|_| format!("位图宽度异常: {}", image.width))?;
        let height =
            u32::try_from(image.height).map_err(|_| format!("位图高度异常: {}", image.height))?;

        let rgba = RgbaImage::from_raw(width, height, image.bytes.to_vec())
            .ok_or_else(|| "位图尺寸与字节长度不一致".to_string())?;

        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| format!("PNG 编码失败: {}", e))?;

        Ok(ClipItem::handle_with_mime(
            ClipHandle::memory("clipboard-image", buf),
            "image/png",
        ))
    }
}

impl ClipboardSnapshotProvider for SystemClipboard {
    fn snapshot(&self) -> Result<Vec<ClipItem>, ClipboardError> {
        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        let mut items = Vec::new();
        let mut soft_errors = Vec::new();

        match clipboard.get().file_list() {
            Ok(paths) => {
                items.extend(
                    paths
                        .into_iter()
                        .map(|p| ClipItem::handle(ClipHandle::path(p))),
                );
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => soft_errors.push(format!("文件列表: {}", e)),
        }

        // 没有文件列表时才读位图，避免同一图片产出两个条目
        if items.is_empty() {
            match clipboard.get_image() {
                Ok(image) => match Self::synthesize_png_item(&image) {
                    Ok(item) => items.push(item),
                    Err(e) => soft_errors.push(e),
                },
                Err(arboard::Error::ContentNotAvailable) => {}
                Err(e) => soft_errors.push(format!("位图: {}", e)),
            }
        }

        match clipboard.get_text() {
            Ok(text) if !text.is_empty() => items.push(ClipItem::text(text)),
            Ok(_) => {}
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => soft_errors.push(format!("文本: {}", e)),
        }

        if items.is_empty() && !soft_errors.is_empty() {
            return Err(ClipboardError::Read(soft_errors.join("; ")));
        }

        log::debug!("📋 剪贴板快照: {} 个条目", items.len());
        Ok(items)
    }
}
