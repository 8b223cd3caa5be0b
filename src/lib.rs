//! # 粘贴输入拦截 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    宿主（嵌入层）                          │
//! │                                                          │
//! │  控件树实现 ── 事件回调 ── 缓存目录                        │
//! │  (WidgetNode / TextEditable)   (PasteSink)               │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ 生命周期通知 + PasteEvent
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            本库 (paste-input)                     │
//! │                                                          │
//! │  ┌─ monitor ───── 状态机 + 拦截器装卸编排                  │
//! │  │   └─ locator       子树内定位目标输入控件               │
//! │  │                                                       │
//! │  ├─ interceptor ─ 手势标志 (RAII Guard)                   │
//! │  │   ├─ content       现代内容接收路径                     │
//! │  │   └─ legacy        传统菜单动作路径                     │
//! │  │                                                       │
//! │  ├─ classifier ── 条目 → 静图/动图/文本                    │
//! │  ├─ materializer  解码·重编码·原子落盘                     │
//! │  ├─ clipboard ─── arboard 快照（传统路径）                 │
//! │  ├─ clip ──────── 条目模型 + 内容解析器                    │
//! │  ├─ event ─────── PasteEvent + 发射器                     │
//! │  └─ error ─────── 统一错误类型 PasteError                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`monitor`] | 监控状态机，响应挂载/卸载/子树新增，装卸两条拦截路径 |
//! | [`locator`] | 先序深度优先定位子树内第一个可编辑文本控件 |
//! | [`interceptor`] | 两条互斥拦截路径 + 手势标志，保证每手势恰一条事件 |
//! | [`classifier`] | 剪贴条目分类：静图 / 动图 / 首个非空文本 |
//! | [`materializer`] | 图片物化：动图直拷、静图转 JPEG、原子写入缓存 |
//! | [`clipboard`] | 系统剪贴板快照（文件列表 / 位图合成 PNG / 文本） |
//! | [`clip`] | 条目与句柄数据模型，MIME 嗅探解析器 |
//! | [`event`] | 事件模型（带 `type` 标签序列化）与统一日志出口 |
//! | [`widget`] | 宿主控件能力抽象（遍历 / 安装面 / 动作链） |
//! | [`error`] | 顶层错误类型 `PasteError`，聚合子模块错误 |

pub mod error;
pub mod clip;
pub mod event;
pub mod widget;
pub mod locator;
pub mod classifier;
pub mod clipboard;
pub mod materializer;
pub mod interceptor;
pub mod monitor;
