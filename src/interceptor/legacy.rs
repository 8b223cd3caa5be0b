//! # 传统菜单动作路径模块
//!
//! ## 设计思路
//!
//! 控件不支持内容协商时，退回到编辑菜单：拦截“粘贴”动作，
//! 自行读取剪贴板快照并分类。
//! - 图片 → 物化落盘，关闭菜单，事件流到此为止
//! - 文本 → 先委托链上前驱，再退回控件默认插入；任一方处理成功
//!   才发出文本事件
//! - 快照失败 / 空剪贴板 / 不可归类 → 发出不受支持事件并消费手势
//! - 文本无人接手 → 不发事件但仍关闭菜单，以未处理状态交还宿主
//!
//! ## 实现思路
//!
//! - 构造时保存控件上原有的动作处理者，形成委托链；非粘贴动作
//!   原样转发给前驱，保持宿主既有行为。
//! - 控件以 `Weak` 持有，拦截器不延长控件生命周期。
//! - 整个处理过程持有手势守卫：委托默认插入时即使重入现代接收器，
//!   也只会纯放行，不会重复产出事件。

use std::rc::{Rc, Weak};

use crate::classifier::classify;
use crate::clip::ContentResolver;
use crate::clipboard::ClipboardSnapshotProvider;
use crate::event::{EventEmitter, PasteEvent};
use crate::materializer::ImageMaterializer;
use crate::widget::{ActionDisposition, ActionHandler, InstallError, MenuAction, TextEditable};

use super::{GestureFlag, materialize_and_emit};

/// 传统路径拦截器：以菜单动作处理者身份安装到控件。
pub struct LegacyPasteInterceptor {
    widget: Weak<dyn TextEditable>,
    previous: Option<Rc<dyn ActionHandler>>,
    clipboard: Rc<dyn ClipboardSnapshotProvider>,
    resolver: Rc<dyn ContentResolver>,
    materializer: Rc<ImageMaterializer>,
    emitter: EventEmitter,
    gesture: GestureFlag,
}

impl LegacyPasteInterceptor {
    /// 安装到控件：捕获原有动作处理者后把自身挂上去。
    ///
    /// 安装失败时返回错误，由监控层记录并降级。
    pub(crate) fn install(
        widget: &Rc<dyn TextEditable>,
        clipboard: Rc<dyn ClipboardSnapshotProvider>,
        resolver: Rc<dyn ContentResolver>,
        materializer: Rc<ImageMaterializer>,
        emitter: EventEmitter,
        gesture: GestureFlag,
    ) -> Result<Rc<Self>, InstallError> {
        let previous = widget.action_handler();
        let interceptor = Rc::new(Self::new(
            widget,
            previous,
            clipboard,
            resolver,
            materializer,
            emitter,
            gesture,
        ));
        widget.set_action_handler(Some(interceptor.clone()))?;
        Ok(interceptor)
    }

    /// 安装前控件上原有的动作处理者，卸载时用于还原。
    pub(crate) fn previous(&self) -> Option<Rc<dyn ActionHandler>> {
        self.previous.clone()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        widget: &Rc<dyn TextEditable>,
        previous: Option<Rc<dyn ActionHandler>>,
        clipboard: Rc<dyn ClipboardSnapshotProvider>,
        resolver: Rc<dyn ContentResolver>,
        materializer: Rc<ImageMaterializer>,
        emitter: EventEmitter,
        gesture: GestureFlag,
    ) -> Self {
        Self {
            widget: Rc::downgrade(widget),
            previous,
            clipboard,
            resolver,
            materializer,
            emitter,
            gesture,
        }
    }

    /// 文本粘贴的委托链：前驱优先，控件默认行为兜底。
    ///
    /// 返回文本是否已被任一方插入。
    fn delegate_text(&self, widget: &Rc<dyn TextEditable>) -> bool {
        if let Some(prev) = &self.previous {
            match prev.on_action(MenuAction::Paste) {
                ActionDisposition::HandledStop => return true,
                ActionDisposition::HandledContinueDefault => {
                    widget.perform_default_action(MenuAction::Paste);
                    return true;
                }
                ActionDisposition::NotHandled => {}
            }
        }
        widget.perform_default_action(MenuAction::Paste)
    }
}

impl ActionHandler for LegacyPasteInterceptor {
    fn on_action(&self, action: MenuAction) -> ActionDisposition {
        if action != MenuAction::Paste {
            // 非粘贴动作保持宿主既有链路
            return match &self.previous {
                Some(prev) => prev.on_action(action),
                None => ActionDisposition::NotHandled,
            };
        }

        let Some(_guard) = self.gesture.acquire() else {
            log::debug!("⏭️ 粘贴手势处理中，不重复拦截");
            return ActionDisposition::NotHandled;
        };

        let Some(widget) = self.widget.upgrade() else {
            log::warn!("⚠️ 目标控件已释放，放弃拦截");
            return ActionDisposition::NotHandled;
        };

        let items = match self.clipboard.snapshot() {
            Ok(items) => items,
            Err(e) => {
                log::warn!("⚠️ 剪贴板快照失败: {}", e);
                self.emitter.emit(PasteEvent::Unsupported);
                widget.dismiss_action_menu();
                return ActionDisposition::HandledStop;
            }
        };

        let batch = classify(&items, self.resolver.as_ref());

        if batch.has_images() {
            materialize_and_emit(
                &batch,
                &self.materializer,
                self.resolver.as_ref(),
                &self.emitter,
            );
            widget.dismiss_action_menu();
            return ActionDisposition::HandledStop;
        }

        if let Some(text) = batch.text {
            let handled = self.delegate_text(&widget);
            if handled {
                self.emitter.emit(PasteEvent::Text { value: text });
            } else {
                log::debug!("⏭️ 文本粘贴未被任何处理者接手");
            }
            // 无论插入与否，选择/菜单态都要结束
            widget.dismiss_action_menu();
            return if handled {
                ActionDisposition::HandledStop
            } else {
                ActionDisposition::NotHandled
            };
        }

        self.emitter.emit(PasteEvent::Unsupported);
        widget.dismiss_action_menu();
        ActionDisposition::HandledStop
    }
}
