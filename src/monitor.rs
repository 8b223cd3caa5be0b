//! # 生命周期监控模块
//!
//! ## 设计思路
//!
//! 监控器是宿主与拦截层之间的唯一编排点：宿主只汇报控件树的
//! 挂载 / 卸载 / 子树新增，监控器负责定位目标、装卸两条拦截路径，
//! 并维护显式的监控状态机。
//!
//! ```text
//!        notify_attached / notify_child_added
//!   Idle ────────────────────────────────────▶ Active
//!        （定位到控件且至少一条路径安装成功）
//!
//!        notify_detached / stop / 目标重绑
//!   Active ──────────────────────────────────▶ Idle
//!        （卸载接收器，还原原动作处理者）
//! ```
//!
//! ## 实现思路
//!
//! - `MonitoringState` 字段全部私有，状态迁移只能经 `activate` / `deactivate`
//!   两个方法，不存在“Idle 但仍挂着拦截器”的中间态。
//! - 控件与根节点均以 `Weak` 持有，监控器不延长宿主对象生命周期。
//! - 安装失败记录日志后忽略：两条路径全部失败则保持空闲（降级模式），
//!   宿主粘贴行为完全不受影响。
//! - 目标控件身份按分配地址比较，不做类型或名称匹配。

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::clip::{ContentResolver, SystemContentResolver};
use crate::clipboard::{ClipboardSnapshotProvider, SystemClipboard};
use crate::error::PasteError;
use crate::event::{EventEmitter, PasteSink};
use crate::interceptor::{
    ContentInterceptor, GestureFlag, LegacyPasteInterceptor, NEGOTIATED_MIME_TYPES,
};
use crate::locator::find_text_editable;
use crate::materializer::{CacheStore, ImageMaterializer};
use crate::widget::{TextEditable, WidgetNode};

/// 监控阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    /// 未绑定目标，未安装任何拦截器。
    Idle,
    /// 已绑定目标，至少一条拦截路径在位。
    Active,
}

/// 当前在位的拦截器集合。
#[derive(Default)]
struct InstalledInterceptors {
    content: Option<Rc<ContentInterceptor>>,
    legacy: Option<Rc<LegacyPasteInterceptor>>,
}

impl InstalledInterceptors {
    fn any(&self) -> bool {
        self.content.is_some() || self.legacy.is_some()
    }
}

/// 监控状态机。
///
/// 不变式：`phase == Active` 当且仅当持有目标引用且至少一条拦截路径在位。
/// 字段私有，外部只能通过 `activate` / `deactivate` 迁移状态。
struct MonitoringState {
    phase: MonitorPhase,
    target: Option<Weak<dyn TextEditable>>,
    installed: Option<InstalledInterceptors>,
}

impl MonitoringState {
    fn new() -> Self {
        Self {
            phase: MonitorPhase::Idle,
            target: None,
            installed: None,
        }
    }

    /// Idle → Active。仅在至少一条拦截路径安装成功后调用。
    fn activate(&mut self, target: Weak<dyn TextEditable>, installed: InstalledInterceptors) {
        debug_assert!(installed.any());
        self.phase = MonitorPhase::Active;
        self.target = Some(target);
        self.installed = Some(installed);
    }

    /// Active → Idle。返回撤下的拦截器集合供卸载，幂等。
    fn deactivate(&mut self) -> Option<InstalledInterceptors> {
        self.phase = MonitorPhase::Idle;
        self.target = None;
        self.installed.take()
    }

    fn phase(&self) -> MonitorPhase {
        self.phase
    }

    /// 仍存活的目标控件。
    fn target(&self) -> Option<Rc<dyn TextEditable>> {
        self.target.as_ref()?.upgrade()
    }

    fn has_installed(&self) -> bool {
        self.installed.as_ref().is_some_and(|i| i.any())
    }
}

/// 按分配地址判断两个控件是否同一实例。
fn same_widget(a: &Rc<dyn TextEditable>, b: &Rc<dyn TextEditable>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// 粘贴监控器。
///
/// 每个受监控的输入区域持有一个实例；所有方法在宿主 UI 线程调用。
pub struct PasteMonitor {
    resolver: Rc<dyn ContentResolver>,
    clipboard: Rc<dyn ClipboardSnapshotProvider>,
    materializer: Rc<ImageMaterializer>,
    emitter: EventEmitter,
    gesture: GestureFlag,
    root: RefCell<Option<Weak<dyn WidgetNode>>>,
    state: RefCell<MonitoringState>,
}

impl PasteMonitor {
    pub fn new(
        resolver: Rc<dyn ContentResolver>,
        clipboard: Rc<dyn ClipboardSnapshotProvider>,
        materializer: Rc<ImageMaterializer>,
        sink: Rc<dyn PasteSink>,
    ) -> Self {
        Self {
            resolver,
            clipboard,
            materializer,
            emitter: EventEmitter::new(sink),
            gesture: GestureFlag::new(),
            root: RefCell::new(None),
            state: RefCell::new(MonitoringState::new()),
        }
    }

    /// 以系统默认组件装配监控器：系统剪贴板、系统内容解析器，
    /// 以及落盘到指定缓存目录的图片物化器。
    pub fn with_system_defaults(
        cache_dir: impl Into<PathBuf>,
        sink: Rc<dyn PasteSink>,
    ) -> Result<Self, PasteError> {
        let store = CacheStore::new(cache_dir)?;
        Ok(Self::new(
            Rc::new(SystemContentResolver::new()),
            Rc::new(SystemClipboard::new()),
            Rc::new(ImageMaterializer::new(store)),
            sink,
        ))
    }

    /// 宿主控件树挂载：记录根节点并尝试启动监控。
    pub fn notify_attached(&self, root: &Rc<dyn WidgetNode>) {
        *self.root.borrow_mut() = Some(Rc::downgrade(root));
        self.start();
    }

    /// 宿主控件树卸载：停止监控并清除根引用。
    pub fn notify_detached(&self) {
        self.stop();
        *self.root.borrow_mut() = None;
    }

    /// 子树新增：空闲时借机定位目标；激活时检查目标是否需要重绑。
    pub fn notify_child_added(&self, subtree: &Rc<dyn WidgetNode>) {
        if self.phase() == MonitorPhase::Active {
            let live_target = self.state.borrow().target();
            match live_target {
                Some(current) => {
                    let Some(found) = find_text_editable(subtree) else {
                        return;
                    };
                    if same_widget(&found, &current) {
                        return;
                    }
                    log::info!("🔁 新增子树包含不同的输入控件，重新绑定目标");
                    self.stop();
                    self.install_on(&found);
                }
                None => {
                    log::debug!("⚠️ 监控目标已释放，基于新增子树重新定位");
                    self.stop();
                    if let Some(found) = find_text_editable(subtree) {
                        self.install_on(&found);
                    }
                }
            }
            return;
        }

        // 空闲：优先在既有根内定位，根不可用时退回新增子树
        if let Some(found) = self
            .locate_in_root()
            .or_else(|| find_text_editable(subtree))
        {
            self.install_on(&found);
        }
    }

    /// 启动监控。已激活时为幂等空操作。
    pub fn start(&self) {
        if self.phase() == MonitorPhase::Active {
            log::debug!("⏭️ 监控已激活，忽略重复启动");
            return;
        }
        let Some(widget) = self.locate_in_root() else {
            log::debug!("🔍 根子树内未找到输入控件，保持空闲");
            return;
        };
        self.install_on(&widget);
    }

    /// 停止监控并卸载拦截器。幂等。
    pub fn stop(&self) {
        let (target, installed) = {
            let mut state = self.state.borrow_mut();
            let target = state.target();
            (target, state.deactivate())
        };
        let Some(installed) = installed else {
            return;
        };

        match target {
            Some(widget) => {
                if installed.content.is_some() {
                    if let Err(e) = widget.set_content_receiver(None, &[]) {
                        log::warn!("⚠️ 卸载内容接收器失败: {}", e);
                    }
                }
                if let Some(legacy) = &installed.legacy {
                    if let Err(e) = widget.set_action_handler(legacy.previous()) {
                        log::warn!("⚠️ 还原原动作处理者失败: {}", e);
                    }
                }
                log::info!("🛑 粘贴监控已停止");
            }
            None => log::debug!("🛑 目标控件已释放，跳过卸载"),
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.state.borrow().phase()
    }

    pub fn has_installed_interceptors(&self) -> bool {
        self.state.borrow().has_installed()
    }

    /// 在记录的根子树内定位目标控件。
    fn locate_in_root(&self) -> Option<Rc<dyn TextEditable>> {
        let root = self.root.borrow().clone()?.upgrade()?;
        find_text_editable(&root)
    }

    /// 在指定控件上安装两条拦截路径，至少一条成功才进入激活态。
    fn install_on(&self, widget: &Rc<dyn TextEditable>) {
        let mut installed = InstalledInterceptors::default();

        if widget.supports_content_negotiation() {
            match ContentInterceptor::install(
                widget,
                self.resolver.clone(),
                self.materializer.clone(),
                self.emitter.clone(),
                self.gesture.clone(),
            ) {
                Ok(receiver) => {
                    log::info!("✅ 内容接收器已安装: {:?}", NEGOTIATED_MIME_TYPES);
                    installed.content = Some(receiver);
                }
                Err(e) => log::warn!("⚠️ 内容接收器安装失败，忽略: {}", e),
            }
        } else {
            log::debug!("⏭️ 控件不支持内容协商，仅走菜单拦截");
        }

        match LegacyPasteInterceptor::install(
            widget,
            self.clipboard.clone(),
            self.resolver.clone(),
            self.materializer.clone(),
            self.emitter.clone(),
            self.gesture.clone(),
        ) {
            Ok(handler) => {
                log::info!("✅ 菜单动作拦截已安装");
                installed.legacy = Some(handler);
            }
            Err(e) => log::warn!("⚠️ 菜单动作拦截安装失败，忽略: {}", e),
        }

        if installed.any() {
            self.state
                .borrow_mut()
                .activate(Rc::downgrade(widget), installed);
            log::info!("🎯 粘贴监控已激活");
        } else {
            log::warn!("🚫 两条拦截路径均安装失败，保持空闲（降级模式）");
        }
    }
}
