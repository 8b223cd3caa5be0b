//! # 控件抽象模块
//!
//! ## 设计思路
//!
//! 粘贴拦截只依赖宿主控件的几个能力点，而不依赖具体控件类型。
//! 这里把能力点收敛为两个 trait：
//! - `WidgetNode`：可遍历的控件树节点
//! - `TextEditable`：可编辑文本控件的安装面（内容接收器 / 菜单动作链）
//!
//! ## 实现思路
//!
//! - 能力探测（`supports_content_negotiation`）决定走现代内容接收路径
//!   还是传统菜单动作路径，不做控件类型名匹配。
//! - 菜单动作处理返回三态 `ActionDisposition`，让委托链可以区分
//!   “已处理并停止”“已处理但继续默认行为”“未处理”。
//! - 安装失败以 `InstallError` 显式返回，由监控层决定降级策略。

use std::rc::Rc;

use crate::clip::ClipItem;

/// 控件树节点。宿主以任意树形结构实现，定位器只做只读遍历。
pub trait WidgetNode {
    /// 直接子节点，按宿主布局顺序。
    fn children(&self) -> Vec<Rc<dyn WidgetNode>>;

    /// 若节点本身是可编辑文本控件，返回其安装面。
    fn as_text_editable(&self) -> Option<Rc<dyn TextEditable>>;
}

/// 编辑菜单动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// 粘贴动作。
    Paste,
    /// 其他宿主自定义动作，携带宿主侧动作编号。
    Other(u32),
}

/// 菜单动作处理结果（三态）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionDisposition {
    /// 已处理，事件流到此为止。
    HandledStop,
    /// 已处理，但仍执行控件默认行为。
    HandledContinueDefault,
    /// 未处理，交由链上后续处理者。
    NotHandled,
}

/// 菜单动作处理者。安装到控件后按链式顺序收到动作回调。
pub trait ActionHandler {
    fn on_action(&self, action: MenuAction) -> ActionDisposition;
}

/// 内容插入负载：平台在一次插入手势中递来的条目集合。
#[derive(Debug, Clone, Default)]
pub struct ContentPayload {
    pub items: Vec<ClipItem>,
}

impl ContentPayload {
    pub fn new(items: Vec<ClipItem>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 内容接收器：现代内容协商路径的回调点。
///
/// 返回 `None` 表示负载已被消费；返回 `Some` 则把（可能裁剪过的）
/// 负载交还控件默认插入逻辑。
pub trait ContentReceiver {
    fn on_receive(&self, payload: ContentPayload) -> Option<ContentPayload>;
}

/// 拦截器安装失败。
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("控件不支持该安装点：{0}")]
    Unsupported(String),

    #[error("控件拒绝安装：{0}")]
    Rejected(String),
}

/// 可编辑文本控件的安装面。
pub trait TextEditable {
    /// 控件是否支持内容协商（现代路径的能力探测）。
    fn supports_content_negotiation(&self) -> bool;

    /// 安装或卸载内容接收器，并声明可接收的 MIME 模式。
    fn set_content_receiver(
        &self,
        receiver: Option<Rc<dyn ContentReceiver>>,
        mime_types: &[&str],
    ) -> Result<(), InstallError>;

    /// 当前已安装的菜单动作处理者（用于委托链保存前驱）。
    fn action_handler(&self) -> Option<Rc<dyn ActionHandler>>;

    /// 安装或卸载菜单动作处理者。
    fn set_action_handler(&self, handler: Option<Rc<dyn ActionHandler>>)
    -> Result<(), InstallError>;

    /// 执行控件对该动作的默认行为，返回是否被默认行为处理。
    fn perform_default_action(&self, action: MenuAction) -> bool;

    /// 关闭当前动作菜单（拦截处理完成后调用）。
    fn dismiss_action_menu(&self);
}
