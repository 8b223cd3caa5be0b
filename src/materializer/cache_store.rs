//! 缓存落盘模块
//!
//! # 设计思路
//!
//! 统一管理物化产物的缓存目录与写入方式。消费方通过产物 URI 读取文件，
//! 因此写入必须保证“可见即完整”：产物文件一旦出现在缓存目录，内容即是完整的。
//!
//! # 实现思路
//!
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 先写入同目录下的 `<名字>.tmp~` 临时文件，成功后 `rename` 到最终名。
//!   同目录重命名在常见文件系统上是原子替换，失败时清理临时文件。
//! - 流式写入带字节上限，超限即中止并报资源限制。

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use super::MaterializeError;

/// 临时文件后缀。带 `~` 以避免与正式产物扩展名混淆。
const TMP_SUFFIX: &str = ".tmp~";

/// 物化产物缓存目录。
#[derive(Debug)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// 打开（必要时创建）缓存目录。
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MaterializeError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            MaterializeError::Store(format!("创建缓存目录 '{}' 失败: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// 缓存目录路径。
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 原子写入一段完整字节，返回产物路径。
    pub fn write_atomic(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, MaterializeError> {
        self.stage_then_rename(file_name, |staged| staged.write_all(bytes))
    }

    /// 原子写入一个字节流，带上限控制，返回产物路径。
    pub fn write_stream_atomic(
        &self,
        file_name: &str,
        reader: &mut dyn Read,
        max_bytes: u64,
    ) -> Result<PathBuf, MaterializeError> {
        let final_path = self.dir.join(file_name);
        let tmp_path = self.tmp_path(file_name);

        let result = (|| -> Result<(), MaterializeError> {
            let mut staged = File::create(&tmp_path).map_err(|e| {
                MaterializeError::Store(format!("创建临时文件 '{}' 失败: {}", tmp_path.display(), e))
            })?;
            // 多取一个字节以区分“恰好达到上限”与“超限”
            let copied = io::copy(&mut reader.take(max_bytes.saturating_add(1)), &mut staged)
                .map_err(|e| MaterializeError::Store(format!("写入 '{}' 失败: {}", file_name, e)))?;
            if copied > max_bytes {
                return Err(MaterializeError::ResourceLimit(format!(
                    "内容超过 {} 字节上限",
                    max_bytes
                )));
            }
            staged
                .sync_all()
                .map_err(|e| MaterializeError::Store(format!("刷盘失败: {}", e)))?;
            Ok(())
        })();

        match result {
            Ok(()) => self.promote(&tmp_path, &final_path),
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(e)
            }
        }
    }

    fn tmp_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", file_name, TMP_SUFFIX))
    }

    /// 临时文件写入成功后重命名为最终产物。
    fn promote(&self, tmp_path: &Path, final_path: &Path) -> Result<PathBuf, MaterializeError> {
        fs::rename(tmp_path, final_path).map_err(|e| {
            let _ = fs::remove_file(tmp_path);
            MaterializeError::Store(format!(
                "重命名 '{}' -> '{}' 失败: {}",
                tmp_path.display(),
                final_path.display(),
                e
            ))
        })?;
        Ok(final_path.to_path_buf())
    }

    fn stage_then_rename(
        &self,
        file_name: &str,
        write: impl FnOnce(&mut File) -> io::Result<()>,
    ) -> Result<PathBuf, MaterializeError> {
        let final_path = self.dir.join(file_name);
        let tmp_path = self.tmp_path(file_name);

        let staged = (|| -> io::Result<()> {
            let mut file = File::create(&tmp_path)?;
            write(&mut file)?;
            file.sync_all()
        })();

        match staged {
            Ok(()) => self.promote(&tmp_path, &final_path),
            Err(e) => {
                let _ = fs::remove_file(&tmp_path);
                Err(MaterializeError::Store(format!(
                    "写入 '{}' 失败: {}",
                    file_name, e
                )))
            }
        }
    }
}
