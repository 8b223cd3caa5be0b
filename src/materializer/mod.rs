//! # 图片物化模块（materializer）
//!
//! ## 设计思路
//!
//! 该模块将“分类批次 → 缓存文件产物”按职责拆分为多个子模块，
//! 避免单文件膨胀与耦合。
//!
//! - `config`：物化策略（JPEG 质量、体积与像素上限）
//! - `error`：物化链路统一错误类型
//! - `cache_store`：缓存目录与原子写入
//! - 本文件：`ImageMaterializer` 编排整条物化流程
//!
//! ## 实现思路
//!
//! ```text
//! ClassifiedBatch
//!    ↓
//! 动图句柄（原字节直拷，不重编码，保留动画）
//!    ↓
//! 静图句柄（限额读取 → 尺寸预检 → 解码 → RGB → JPEG(80)）
//!    ↓
//! CacheStore（.tmp~ 暂存 + rename 原子可见）
//!    ↓
//! Vec<CachedArtifact>（file:// URI）
//! ```
//!
//! 单个句柄失败只跳过该句柄；全部失败才向上返回错误。
//! 产物计数先动图后静图，静图文件名中的序号包含已产出的动图数。

mod cache_store;
mod config;
mod error;

pub use cache_store::CacheStore;
pub use config::MaterializerConfig;
pub use error::MaterializeError;

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use chrono::Utc;
use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use once_cell::sync::Lazy;

use crate::classifier::ClassifiedBatch;
use crate::clip::{ClipHandle, ContentResolver};

/// 进程内最近一次用于命名的毫秒时间戳。
///
/// 系统时钟回拨时命名时间戳保持不回退，避免产物文件名次序倒置。
static LAST_NAME_MILLIS: Lazy<AtomicI64> = Lazy::new(|| AtomicI64::new(0));

/// 单调夹取后的毫秒时间戳。
fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let prev = LAST_NAME_MILLIS.fetch_max(now, Ordering::SeqCst);
    prev.max(now)
}

/// 纳秒级熵源，用于同毫秒内的动图命名去重。
fn epoch_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}

/// 一个已落盘的物化产物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    /// 缓存目录内的产物文件路径。
    pub path: PathBuf,
}

impl CachedArtifact {
    /// 产物的 `file://` URI，直接交给事件消费方。
    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// 图片物化器：把分类批次中的图片句柄落盘为缓存产物。
#[derive(Debug)]
pub struct ImageMaterializer {
    config: MaterializerConfig,
    store: CacheStore,
}

impl ImageMaterializer {
    /// 以默认配置构造。
    pub fn new(store: CacheStore) -> Self {
        Self::with_config(store, MaterializerConfig::default())
    }

    pub fn with_config(store: CacheStore, config: MaterializerConfig) -> Self {
        Self { config, store }
    }

    /// 物化一个分类批次，返回产物列表（动图在前，与命名序号一致）。
    ///
    /// 单个句柄失败记录日志后跳过；没有任何产物时返回首个遇到的错误，
    /// 批次本身不含图片时返回 [`MaterializeError::EmptyBatch`]。
    pub fn materialize(
        &self,
        batch: &ClassifiedBatch,
        resolver: &dyn ContentResolver,
    ) -> Result<Vec<CachedArtifact>, MaterializeError> {
        if !batch.has_images() {
            return Err(MaterializeError::EmptyBatch);
        }

        let started = Instant::now();
        let mut artifacts = Vec::with_capacity(batch.image_count());
        let mut first_error: Option<MaterializeError> = None;

        for handle in &batch.animated_handles {
            match self.copy_animated(handle, resolver) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    log::warn!("⚠️ 动图直拷失败，跳过 {}: {}", handle, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        for handle in &batch.image_handles {
            match self.encode_still(handle, resolver, artifacts.len()) {
                Ok(artifact) => artifacts.push(artifact),
                Err(e) => {
                    log::warn!("⚠️ 静图编码失败，跳过 {}: {}", handle, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if artifacts.is_empty() {
            return Err(first_error.unwrap_or(MaterializeError::EmptyBatch));
        }

        log::info!(
            "✅ 图片物化完成: {} 个产物 ⏱️ {:?}",
            artifacts.len(),
            started.elapsed()
        );
        Ok(artifacts)
    }

    /// 动图：原字节直拷落盘，保留动画帧。
    fn copy_animated(
        &self,
        handle: &ClipHandle,
        resolver: &dyn ContentResolver,
    ) -> Result<CachedArtifact, MaterializeError> {
        let mut reader = resolver
            .open_stream(handle)
            .map_err(|e| MaterializeError::StreamOpen(format!("{}: {}", handle, e)))?;

        let name = format!("paste_{}_{}.gif", monotonic_millis(), epoch_nanos());
        let path =
            self.store
                .write_stream_atomic(&name, reader.as_mut(), self.config.max_source_bytes)?;

        log::info!("🎞️ 动图直拷完成: {}", name);
        Ok(CachedArtifact { path })
    }

    /// 静图：解码后统一重编码为 JPEG。
    ///
    /// `artifact_index` 为批内已产出产物数（含动图），用于文件名序号。
    fn encode_still(
        &self,
        handle: &ClipHandle,
        resolver: &dyn ContentResolver,
        artifact_index: usize,
    ) -> Result<CachedArtifact, MaterializeError> {
        let bytes = self.read_bounded(handle, resolver)?;

        // 完整解码前先按头信息做像素预检
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| MaterializeError::Decode(format!("格式探测失败: {}", e)))?
            .into_dimensions()
            .map_err(|e| MaterializeError::Decode(format!("读取图片尺寸失败: {}", e)))?;

        let pixels = (width as u64) * (height as u64);
        if pixels > self.config.max_decoded_pixels {
            return Err(MaterializeError::ResourceLimit(format!(
                "像素数 {} 超过上限 {}",
                pixels, self.config.max_decoded_pixels
            )));
        }

        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| MaterializeError::Decode(format!("图片解码失败: {}", e)))?;

        // JPEG 无透明通道，统一转 RGB
        let rgb = decoded.to_rgb8();
        let mut encoded = Vec::new();
        let mut encoder =
            JpegEncoder::new_with_quality(&mut encoded, self.config.effective_jpeg_quality());
        encoder
            .encode_image(&rgb)
            .map_err(|e| MaterializeError::Encode(format!("JPEG 编码失败: {}", e)))?;

        let name = format!("paste_{}_{}.jpg", monotonic_millis(), artifact_index);
        let path = self.store.write_atomic(&name, &encoded)?;

        log::info!("🖼️ 静图已编码: {} ({}x{})", name, width, height);
        Ok(CachedArtifact { path })
    }

    /// 限额读取句柄全部字节。
    fn read_bounded(
        &self,
        handle: &ClipHandle,
        resolver: &dyn ContentResolver,
    ) -> Result<Vec<u8>, MaterializeError> {
        let reader = resolver
            .open_stream(handle)
            .map_err(|e| MaterializeError::StreamOpen(format!("{}: {}", handle, e)))?;

        let mut bytes = Vec::new();
        reader
            .take(self.config.max_source_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| MaterializeError::StreamOpen(format!("读取 {} 失败: {}", handle, e)))?;

        if bytes.len() as u64 > self.config.max_source_bytes {
            return Err(MaterializeError::ResourceLimit(format!(
                "内容超过 {} 字节上限",
                self.config.max_source_bytes
            )));
        }
        Ok(bytes)
    }
}
