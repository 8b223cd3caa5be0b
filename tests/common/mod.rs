//! Shared fixtures for integration tests: fake widget tree, recording sink,
//! scripted clipboard and image byte helpers.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::path::PathBuf;
use std::rc::Rc;

use paste_input::clip::{ClipHandle, ClipItem};
use paste_input::clipboard::{ClipboardError, ClipboardSnapshotProvider};
use paste_input::event::{PasteEvent, PasteSink};
use paste_input::widget::{
    ActionDisposition, ActionHandler, ContentPayload, ContentReceiver, InstallError, MenuAction,
    TextEditable, WidgetNode,
};

// ============================================================================
// 事件出口
// ============================================================================

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<PasteEvent>>,
}

impl RecordingSink {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn take(&self) -> Vec<PasteEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

impl PasteSink for RecordingSink {
    fn emit(&self, event: PasteEvent) {
        self.events.borrow_mut().push(event);
    }
}

// ============================================================================
// 可编辑控件替身
// ============================================================================

/// 可脚本化的输入控件替身。
///
/// `route_default_through_receiver` 打开后，默认粘贴行为会把
/// `default_payload` 重新送进已安装的内容接收器，模拟宿主平台
/// “菜单粘贴的默认路径再次经过内容接收器”的重入行为。
#[derive(Default)]
pub struct FakeEditable {
    pub supports_negotiation: Cell<bool>,
    pub reject_receiver: Cell<bool>,
    pub reject_handler: Cell<bool>,
    pub receiver: RefCell<Option<Rc<dyn ContentReceiver>>>,
    pub negotiated: RefCell<Vec<String>>,
    pub handler: RefCell<Option<Rc<dyn ActionHandler>>>,
    pub default_result: Cell<bool>,
    pub default_calls: RefCell<Vec<MenuAction>>,
    pub dismiss_count: Cell<u32>,
    pub route_default_through_receiver: Cell<bool>,
    pub default_payload: RefCell<Option<ContentPayload>>,
}

impl FakeEditable {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn negotiating() -> Rc<Self> {
        let editable = Self::new();
        editable.supports_negotiation.set(true);
        editable
    }

    pub fn installed_receiver(&self) -> Option<Rc<dyn ContentReceiver>> {
        self.receiver.borrow().clone()
    }

    pub fn installed_handler(&self) -> Option<Rc<dyn ActionHandler>> {
        self.handler.borrow().clone()
    }
}

impl TextEditable for FakeEditable {
    fn supports_content_negotiation(&self) -> bool {
        self.supports_negotiation.get()
    }

    fn set_content_receiver(
        &self,
        receiver: Option<Rc<dyn ContentReceiver>>,
        mime_types: &[&str],
    ) -> Result<(), InstallError> {
        if self.reject_receiver.get() {
            return Err(InstallError::Rejected("scripted rejection".to_string()));
        }
        *self.receiver.borrow_mut() = receiver;
        *self.negotiated.borrow_mut() = mime_types.iter().map(|m| m.to_string()).collect();
        Ok(())
    }

    fn action_handler(&self) -> Option<Rc<dyn ActionHandler>> {
        self.handler.borrow().clone()
    }

    fn set_action_handler(
        &self,
        handler: Option<Rc<dyn ActionHandler>>,
    ) -> Result<(), InstallError> {
        if self.reject_handler.get() {
            return Err(InstallError::Rejected("scripted rejection".to_string()));
        }
        *self.handler.borrow_mut() = handler;
        Ok(())
    }

    fn perform_default_action(&self, action: MenuAction) -> bool {
        self.default_calls.borrow_mut().push(action);
        if action == MenuAction::Paste && self.route_default_through_receiver.get() {
            let receiver = self.receiver.borrow().clone();
            if let Some(receiver) = receiver {
                let payload = self
                    .default_payload
                    .borrow()
                    .clone()
                    .unwrap_or_default();
                let _ = receiver.on_receive(payload);
            }
        }
        self.default_result.get()
    }

    fn dismiss_action_menu(&self) {
        self.dismiss_count.set(self.dismiss_count.get() + 1);
    }
}

// ============================================================================
// 控件树替身
// ============================================================================

pub struct FakeNode {
    pub children: RefCell<Vec<Rc<dyn WidgetNode>>>,
    pub editable: Option<Rc<FakeEditable>>,
}

impl WidgetNode for FakeNode {
    fn children(&self) -> Vec<Rc<dyn WidgetNode>> {
        self.children.borrow().clone()
    }

    fn as_text_editable(&self) -> Option<Rc<dyn TextEditable>> {
        self.editable
            .clone()
            .map(|e| e as Rc<dyn TextEditable>)
    }
}

pub fn branch(children: Vec<Rc<dyn WidgetNode>>) -> Rc<dyn WidgetNode> {
    Rc::new(FakeNode {
        children: RefCell::new(children),
        editable: None,
    })
}

pub fn leaf() -> Rc<dyn WidgetNode> {
    branch(Vec::new())
}

pub fn editable_leaf(editable: &Rc<FakeEditable>) -> Rc<dyn WidgetNode> {
    Rc::new(FakeNode {
        children: RefCell::new(Vec::new()),
        editable: Some(editable.clone()),
    })
}

// ============================================================================
// 剪贴板替身
// ============================================================================

#[derive(Default)]
pub struct ScriptedClipboard {
    pub items: RefCell<Vec<ClipItem>>,
    pub fail: Cell<bool>,
    pub snapshot_calls: Cell<u32>,
}

impl ScriptedClipboard {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_items(&self, items: Vec<ClipItem>) {
        *self.items.borrow_mut() = items;
    }
}

impl ClipboardSnapshotProvider for ScriptedClipboard {
    fn snapshot(&self) -> Result<Vec<ClipItem>, ClipboardError> {
        self.snapshot_calls.set(self.snapshot_calls.get() + 1);
        if self.fail.get() {
            return Err(ClipboardError::Read("scripted failure".to_string()));
        }
        Ok(self.items.borrow().clone())
    }
}

// ============================================================================
// 内容与目录辅助
// ============================================================================

pub fn temp_cache_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "paste-input-{}-{}",
        tag,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock error")
            .as_nanos()
    ))
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([12, 120, 210, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn png_item() -> ClipItem {
    ClipItem::handle(ClipHandle::memory("png", png_bytes(2, 2)))
}

pub fn gif_bytes() -> Vec<u8> {
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&[1u8; 48]);
    bytes
}

pub fn gif_item() -> ClipItem {
    ClipItem::handle(ClipHandle::memory("gif", gif_bytes()))
}

pub fn text_item(value: &str) -> ClipItem {
    ClipItem::text(value)
}

/// 初始化测试日志（幂等）。
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 断言两个动作处理者是同一实例。
pub fn same_handler(a: &Rc<dyn ActionHandler>, b: &Rc<dyn ActionHandler>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// 处理结果可脚本化的动作处理者，充当宿主既有链路的替身。
pub struct HostHandler {
    pub disposition: ActionDisposition,
    pub calls: RefCell<Vec<MenuAction>>,
}

impl HostHandler {
    pub fn new(disposition: ActionDisposition) -> Rc<Self> {
        Rc::new(Self {
            disposition,
            calls: RefCell::new(Vec::new()),
        })
    }
}

impl ActionHandler for HostHandler {
    fn on_action(&self, action: MenuAction) -> ActionDisposition {
        self.calls.borrow_mut().push(action);
        self.disposition
    }
}
