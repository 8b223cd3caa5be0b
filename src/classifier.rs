//! # 内容分类模块
//!
//! ## 设计思路
//!
//! 把一批剪贴条目归入三类携带形态：静图句柄、动图句柄、首个非空文本。
//! 图片与文本可同时存在，消费侧约定图片优先；三类皆空即为不受支持。
//!
//! ## 实现思路
//!
//! - MIME 判定以解析器嗅探结果优先，条目声明的 MIME 仅作回退，
//!   防止平台侧声明与真实字节不一致。
//! - 动图（`image/gif`）单列：落盘策略不同（原字节直拷，不重编码）。
//! - 无法判定类型的句柄直接跳过，不归入任何一类。

use crate::clip::{ClipHandle, ClipItem, ContentResolver, MIME_ANIMATED_IMAGE, MIME_IMAGE_PREFIX};

/// 分类结果：一批条目按携带形态归类后的视图。
#[derive(Debug, Default)]
pub struct ClassifiedBatch {
    /// 静图句柄（需解码重编码落盘）。
    pub image_handles: Vec<ClipHandle>,
    /// 动图句柄（原字节直拷落盘）。
    pub animated_handles: Vec<ClipHandle>,
    /// 首个非空文本。
    pub text: Option<String>,
}

impl ClassifiedBatch {
    /// 批内是否含任何图片（静图或动图）。
    pub fn has_images(&self) -> bool {
        !self.image_handles.is_empty() || !self.animated_handles.is_empty()
    }

    /// 批内图片总数。
    pub fn image_count(&self) -> usize {
        self.image_handles.len() + self.animated_handles.len()
    }

    /// 三类皆空，即不受支持的内容。
    pub fn is_empty(&self) -> bool {
        !self.has_images() && self.text.is_none()
    }
}

/// 解析单个条目的有效 MIME：嗅探优先，声明回退。
fn effective_mime(item: &ClipItem, resolver: &dyn ContentResolver) -> Option<String> {
    let handle = item.handle.as_ref()?;
    resolver
        .resolve_mime(handle)
        .or_else(|| item.mime_type.clone())
}

/// 对一批条目分类。
///
/// 每个条目独立判定，单个条目不可判定不影响其余条目。
pub fn classify(items: &[ClipItem], resolver: &dyn ContentResolver) -> ClassifiedBatch {
    let mut batch = ClassifiedBatch::default();

    for item in items {
        if let Some(handle) = &item.handle {
            match effective_mime(item, resolver) {
                Some(mime) if mime == MIME_ANIMATED_IMAGE => {
                    batch.animated_handles.push(handle.clone());
                }
                Some(mime) if mime.starts_with(MIME_IMAGE_PREFIX) => {
                    batch.image_handles.push(handle.clone());
                }
                Some(_) | None => {
                    log::debug!("⏭️ 跳过无法归类的句柄: {}", handle);
                }
            }
        }

        if batch.text.is_none() {
            if let Some(text) = &item.text {
                if !text.is_empty() {
                    batch.text = Some(text.clone());
                }
            }
        }
    }

    log::debug!(
        "🧩 分类完成: 静图 {} 动图 {} 文本 {}",
        batch.image_handles.len(),
        batch.animated_handles.len(),
        batch.text.is_some()
    );
    batch
}
