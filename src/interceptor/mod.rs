//! 粘贴拦截模块
//!
//! # 设计思路
//!
//! 统一管理两条互斥的粘贴拦截路径：
//! - **现代路径**（`content`）：控件支持内容协商时，以内容接收器
//!   拿到平台递来的负载
//! - **传统路径**（`legacy`）：以菜单动作处理者拦下粘贴动作，
//!   自行读取剪贴板快照
//! - **手势标志 + RAII Guard**：同一手势可能同时触达两条路径
//!   （菜单粘贴的默认行为会再进入内容接收器），用 `GestureGuard`
//!   确保每个手势恰好产出一条事件
//!
//! # 实现思路
//!
//! - 标志使用 `Rc<Cell<bool>>`：拦截层与控件同属单线程 UI 层。
//! - `GestureGuard` 采用 RAII 模式：`acquire` 占用时设置标志，
//!   `Drop` 时自动清除，处理路径提前返回或中途出错都不会遗留标志。
//! - 两条路径共享同一个标志实例与同一套“物化 → 事件”收敛逻辑。

mod content;
mod legacy;

pub use content::{ContentInterceptor, NEGOTIATED_MIME_TYPES};
pub use legacy::LegacyPasteInterceptor;

use std::cell::Cell;
use std::rc::Rc;

use crate::classifier::ClassifiedBatch;
use crate::clip::ContentResolver;
use crate::event::{EventEmitter, PasteEvent};
use crate::materializer::{ImageMaterializer, MaterializeError};

// ============================================================================
// 手势标志
// ============================================================================

/// 粘贴手势进行中标志。
///
/// 两条拦截路径共享同一实例；先占用者处理手势，后到者原样放行。
#[derive(Clone, Default)]
pub struct GestureFlag(Rc<Cell<bool>>);

impl GestureFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前是否有手势正在处理。
    pub fn is_active(&self) -> bool {
        self.0.get()
    }

    /// 尝试占用手势。已被占用时返回 `None`。
    pub(crate) fn acquire(&self) -> Option<GestureGuard> {
        if self.0.get() {
            return None;
        }
        self.0.set(true);
        Some(GestureGuard {
            flag: Rc::clone(&self.0),
        })
    }
}

/// 手势标志的 RAII 守卫。
///
/// 构造即占用，`Drop` 自动释放，保证任何返回路径都不会把标志留在占用态。
pub(crate) struct GestureGuard {
    flag: Rc<Cell<bool>>,
}

impl Drop for GestureGuard {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

// ============================================================================
// 共享收敛逻辑
// ============================================================================

/// 物化图片批次并收敛为一条事件。
///
/// 成功产出 `Images`；批次为空或物化整体失败均降级为 `Unsupported`，
/// 错误不向宿主传播。
pub(crate) fn materialize_and_emit(
    batch: &ClassifiedBatch,
    materializer: &ImageMaterializer,
    resolver: &dyn ContentResolver,
    emitter: &EventEmitter,
) {
    match materializer.materialize(batch, resolver) {
        Ok(artifacts) => {
            emitter.emit(PasteEvent::Images {
                uris: artifacts.iter().map(|a| a.uri()).collect(),
            });
        }
        Err(MaterializeError::EmptyBatch) => {
            emitter.emit(PasteEvent::Unsupported);
        }
        Err(e) => {
            log::warn!("⚠️ 图片物化失败，按不受支持处理: {}", e);
            emitter.emit(PasteEvent::Unsupported);
        }
    }
}
