//! # 粘贴事件模块
//!
//! ## 设计思路
//!
//! 每次粘贴手势最终收敛为一条 `PasteEvent`，三种变体互斥：
//! - `Images`：图片已物化为缓存文件，携带 URI 列表
//! - `Text`：文本已由宿主默认路径插入，携带插入的文本
//! - `Unsupported`：内容无法识别或物化失败
//!
//! ## 实现思路
//!
//! - 事件序列化为带 `type` 标签的 JSON 对象，宿主侧按标签分发。
//! - `PasteSink` 是事件出口的抽象；`EventEmitter` 在其上统一打日志，
//!   拦截层只与 `EventEmitter` 交互。

use std::rc::Rc;

use serde::Serialize;

/// 一次粘贴手势的结果事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PasteEvent {
    /// 图片内容已物化，`uris` 指向缓存目录下的产物文件。
    Images { uris: Vec<String> },
    /// 文本内容已由宿主默认路径插入。
    Text { value: String },
    /// 内容不受支持或处理失败。
    Unsupported,
}

/// 粘贴事件出口。
///
/// 由宿主实现（桥接到上层回调）；测试中以记录型实现注入。
pub trait PasteSink {
    fn emit(&self, event: PasteEvent);
}

/// 事件发射器：在出口上统一记录日志后转发。
#[derive(Clone)]
pub struct EventEmitter {
    sink: Rc<dyn PasteSink>,
}

impl EventEmitter {
    pub fn new(sink: Rc<dyn PasteSink>) -> Self {
        Self { sink }
    }

    /// 发送事件并记录摘要日志。
    pub fn emit(&self, event: PasteEvent) {
        match &event {
            PasteEvent::Images { uris } => {
                log::info!("📤 发送粘贴事件: 图片 {} 张", uris.len());
            }
            PasteEvent::Text { value } => {
                log::info!("📤 发送粘贴事件: 文本 {} 字符", value.chars().count());
            }
            PasteEvent::Unsupported => {
                log::info!("🚫 发送粘贴事件: 内容不受支持");
            }
        }
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<PasteEvent>>,
    }

    impl PasteSink for RecordingSink {
        fn emit(&self, event: PasteEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn images_event_serializes_with_type_tag() {
        let event = PasteEvent::Images {
            uris: vec!["file:///cache/a.jpg".to_string()],
        };
        let json = serde_json::to_value(&event).expect("serialize images event");
        assert_eq!(
            json,
            serde_json::json!({ "type": "images", "uris": ["file:///cache/a.jpg"] })
        );
    }

    #[test]
    fn text_event_serializes_with_type_tag() {
        let event = PasteEvent::Text {
            value: "hello".to_string(),
        };
        let json = serde_json::to_value(&event).expect("serialize text event");
        assert_eq!(json, serde_json::json!({ "type": "text", "value": "hello" }));
    }

    #[test]
    fn unsupported_event_serializes_to_bare_tag() {
        let json = serde_json::to_value(PasteEvent::Unsupported).expect("serialize unsupported");
        assert_eq!(json, serde_json::json!({ "type": "unsupported" }));
    }

    #[test]
    fn emitter_forwards_events_to_sink_in_order() {
        let sink = Rc::new(RecordingSink::default());
        let emitter = EventEmitter::new(sink.clone());

        emitter.emit(PasteEvent::Text {
            value: "a".to_string(),
        });
        emitter.emit(PasteEvent::Unsupported);

        let events = sink.events.borrow();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            PasteEvent::Text {
                value: "a".to_string()
            }
        );
        assert_eq!(events[1], PasteEvent::Unsupported);
    }
}
