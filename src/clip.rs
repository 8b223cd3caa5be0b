//! # 剪贴条目与内容句柄模块
//!
//! ## 设计思路
//!
//! 将“平台剪贴/内容系统给到的条目”与“条目内容的读取方式”解耦：
//! - `ClipItem` 是平台产出的只读条目（可携带 MIME、句柄、文本）
//! - `ClipHandle` 是不透明内容句柄，本子系统从不直接解释它
//! - `ContentResolver` 负责把句柄解析为 MIME 类型与字节流
//!
//! ## 实现思路
//!
//! - 句柄提供两种具体承载：文件路径与内存块，覆盖系统后端与测试两类场景。
//! - `SystemContentResolver` 为默认实现：优先魔数嗅探（`infer`），
//!   文件句柄在嗅探失败时回退扩展名判定。
//! - 分类与落盘层只依赖 `ContentResolver` trait，不依赖具体句柄形态。

use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 静态图片 MIME 前缀。
pub const MIME_IMAGE_PREFIX: &str = "image/";
/// 动图 MIME 类型（逐帧格式，落盘时按原字节直拷）。
pub const MIME_ANIMATED_IMAGE: &str = "image/gif";
/// 纯文本 MIME 类型。
pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// 不透明内容句柄。
///
/// 分类器与落盘器不会解释句柄内部结构，所有访问均经由 [`ContentResolver`]。
#[derive(Debug, Clone)]
pub enum ClipHandle {
    /// 指向文件系统的内容地址（裸路径或 `file://` 前缀均可）。
    Path(PathBuf),
    /// 内存中的内容块（如从系统剪贴板合成的 PNG 字节）。
    Memory {
        /// 用于日志与诊断的来源标签。
        label: String,
        /// 内容字节。跨层共享，避免批内重复拷贝。
        bytes: Arc<[u8]>,
    },
}

impl ClipHandle {
    /// 以文件路径构造句柄。
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// 以内存字节构造句柄。
    pub fn memory(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::Memory {
            label: label.into(),
            bytes: Arc::from(bytes),
        }
    }
}

impl fmt::Display for ClipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Memory { label, bytes } => write!(f, "memory://{}({}B)", label, bytes.len()),
        }
    }
}

/// 剪贴/内容负载中的一个条目。
///
/// 由平台剪贴板或内容插入系统产出，对本子系统只读，永不回写。
#[derive(Debug, Clone, Default)]
pub struct ClipItem {
    /// 平台声明的 MIME 类型（可能缺失或不可信，仅作解析回退）。
    pub mime_type: Option<String>,
    /// 内容句柄（图片等二进制内容经由它读取）。
    pub handle: Option<ClipHandle>,
    /// 文本内容。
    pub text: Option<String>,
}

impl ClipItem {
    /// 构造纯文本条目。
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            ..Self::default()
        }
    }

    /// 构造仅携带句柄的条目。
    pub fn handle(handle: ClipHandle) -> Self {
        Self {
            handle: Some(handle),
            ..Self::default()
        }
    }

    /// 构造携带句柄与声明 MIME 的条目。
    pub fn handle_with_mime(handle: ClipHandle, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            handle: Some(handle),
            ..Self::default()
        }
    }
}

/// 内容解析器：把不透明句柄解析为 MIME 与字节流。
///
/// 对应平台侧的内容解析服务；测试中以内存映射实现注入。
pub trait ContentResolver {
    /// 解析句柄的 MIME 类型（尽力而为，无法判定时返回 `None`）。
    fn resolve_mime(&self, handle: &ClipHandle) -> Option<String>;

    /// 打开句柄指向的内容字节流。
    fn open_stream(&self, handle: &ClipHandle) -> io::Result<Box<dyn Read>>;
}

/// 默认内容解析器：文件系统 + 内存块。
///
/// MIME 解析优先使用魔数嗅探，文件句柄在嗅探失败时回退扩展名。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemContentResolver;

impl SystemContentResolver {
    pub fn new() -> Self {
        Self
    }

    /// 剥离 `file://` 前缀，统一为本地路径。
    fn local_path(path: &Path) -> PathBuf {
        match path.to_str().and_then(|s| s.strip_prefix("file://")) {
            Some(stripped) => PathBuf::from(stripped),
            None => path.to_path_buf(),
        }
    }

    /// 按扩展名回退判定常见图片类型。
    ///
    /// 仅覆盖本子系统关心的图片族；其余类型交由声明 MIME 兜底。
    fn mime_from_extension(path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let mime = match ext.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "txt" => MIME_TEXT_PLAIN,
            _ => return None,
        };
        Some(mime.to_string())
    }
}

impl ContentResolver for SystemContentResolver {
    fn resolve_mime(&self, handle: &ClipHandle) -> Option<String> {
        match handle {
            ClipHandle::Path(path) => {
                let local = Self::local_path(path);
                match infer::get_from_path(&local) {
                    Ok(Some(kind)) => Some(kind.mime_type().to_string()),
                    _ => {
                        let fallback = Self::mime_from_extension(&local);
                        if let Some(mime) = &fallback {
                            log::debug!("🔍 魔数嗅探未命中，按扩展名回退: {} -> {}", local.display(), mime);
                        }
                        fallback
                    }
                }
            }
            ClipHandle::Memory { bytes, .. } => {
                infer::get(bytes).map(|kind| kind.mime_type().to_string())
            }
        }
    }

    fn open_stream(&self, handle: &ClipHandle) -> io::Result<Box<dyn Read>> {
        match handle {
            ClipHandle::Path(path) => {
                let file = std::fs::File::open(Self::local_path(path))?;
                Ok(Box::new(file))
            }
            ClipHandle::Memory { bytes, .. } => Ok(Box::new(Cursor::new(Arc::clone(bytes)))),
        }
    }
}
