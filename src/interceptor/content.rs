//! # 现代内容接收路径模块
//!
//! ## 设计思路
//!
//! 控件支持内容协商时，平台会把一次插入手势的完整负载递到接收器，
//! 无需触碰系统剪贴板。接收器对负载分类后：
//! - 图片 → 物化为缓存文件，负载整体消费（返回 `None`），
//!   默认插入不再发生
//! - 文本 → 发出文本事件，负载交还默认插入逻辑
//! - 空负载 / 不可归类 → 发出不受支持事件，负载原样放行
//!
//! ## 实现思路
//!
//! 进入时先占用手势标志；占用失败说明传统路径正在处理同一手势
//! （菜单粘贴的默认行为重入），此时纯放行、不产出事件。

use std::rc::Rc;

use crate::classifier::classify;
use crate::clip::ContentResolver;
use crate::event::{EventEmitter, PasteEvent};
use crate::materializer::ImageMaterializer;
use crate::widget::{ContentPayload, ContentReceiver, InstallError, TextEditable};

use super::{GestureFlag, materialize_and_emit};

/// 安装接收器时向控件声明的 MIME 模式。
pub const NEGOTIATED_MIME_TYPES: &[&str] = &["image/*", "text/plain"];

/// 现代路径拦截器：以内容接收器身份安装到控件。
pub struct ContentInterceptor {
    resolver: Rc<dyn ContentResolver>,
    materializer: Rc<ImageMaterializer>,
    emitter: EventEmitter,
    gesture: GestureFlag,
}

impl ContentInterceptor {
    pub(crate) fn new(
        resolver: Rc<dyn ContentResolver>,
        materializer: Rc<ImageMaterializer>,
        emitter: EventEmitter,
        gesture: GestureFlag,
    ) -> Self {
        Self {
            resolver,
            materializer,
            emitter,
            gesture,
        }
    }

    /// 以内容接收器身份安装到控件，声明可接收的 MIME 模式。
    ///
    /// 安装失败时返回错误，由监控层记录并降级。
    pub(crate) fn install(
        widget: &Rc<dyn TextEditable>,
        resolver: Rc<dyn ContentResolver>,
        materializer: Rc<ImageMaterializer>,
        emitter: EventEmitter,
        gesture: GestureFlag,
    ) -> Result<Rc<Self>, InstallError> {
        let receiver = Rc::new(Self::new(resolver, materializer, emitter, gesture));
        widget.set_content_receiver(Some(receiver.clone()), NEGOTIATED_MIME_TYPES)?;
        Ok(receiver)
    }
}

impl ContentReceiver for ContentInterceptor {
    fn on_receive(&self, payload: ContentPayload) -> Option<ContentPayload> {
        let Some(_guard) = self.gesture.acquire() else {
            log::debug!("⏭️ 粘贴手势处理中，负载原样放行");
            return Some(payload);
        };

        if payload.is_empty() {
            log::debug!("🚫 空内容负载");
            self.emitter.emit(PasteEvent::Unsupported);
            return Some(payload);
        }

        let batch = classify(&payload.items, self.resolver.as_ref());

        if batch.has_images() {
            materialize_and_emit(
                &batch,
                &self.materializer,
                self.resolver.as_ref(),
                &self.emitter,
            );
            // 图片已消费，不进入默认插入
            return None;
        }

        if let Some(text) = batch.text {
            self.emitter.emit(PasteEvent::Text { value: text });
            // 文本交还控件默认插入逻辑
            return Some(payload);
        }

        self.emitter.emit(PasteEvent::Unsupported);
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipHandle, ClipItem, SystemContentResolver};
    use crate::event::PasteSink;
    use crate::materializer::CacheStore;
    use std::cell::RefCell;
    use std::io::Cursor;

    #[derive(Default)]
    struct RecordingSink {
        events: RefCell<Vec<PasteEvent>>,
    }

    impl PasteSink for RecordingSink {
        fn emit(&self, event: PasteEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    struct Fixture {
        interceptor: ContentInterceptor,
        sink: Rc<RecordingSink>,
        gesture: GestureFlag,
        cache_dir: std::path::PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.cache_dir);
        }
    }

    fn fixture() -> Fixture {
        let cache_dir = std::env::temp_dir().join(format!(
            "paste-input-content-test-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("clock error")
                .as_nanos()
        ));
        let sink = Rc::new(RecordingSink::default());
        let gesture = GestureFlag::new();
        let interceptor = ContentInterceptor::new(
            Rc::new(SystemContentResolver::new()),
            Rc::new(ImageMaterializer::new(
                CacheStore::new(&cache_dir).expect("cache store"),
            )),
            EventEmitter::new(sink.clone()),
            gesture.clone(),
        );
        Fixture {
            interceptor,
            sink,
            gesture,
            cache_dir,
        }
    }

    fn png_item() -> ClipItem {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode png");
        ClipItem::handle(ClipHandle::memory("png", buf))
    }

    #[test]
    fn image_payload_is_consumed_and_emits_uris() {
        let fx = fixture();
        let payload = ContentPayload::new(vec![png_item()]);

        let returned = fx.interceptor.on_receive(payload);

        assert!(returned.is_none());
        let events = fx.sink.events.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            PasteEvent::Images { uris } => {
                assert_eq!(uris.len(), 1);
                assert!(uris[0].starts_with("file://"));
            }
            other => panic!("expected images event, got {:?}", other),
        }
    }

    #[test]
    fn text_payload_is_passed_through_with_text_event() {
        let fx = fixture();
        let payload = ContentPayload::new(vec![ClipItem::text("hello")]);

        let returned = fx.interceptor.on_receive(payload);

        assert!(returned.is_some_and(|p| !p.is_empty()));
        assert_eq!(
            *fx.sink.events.borrow(),
            vec![PasteEvent::Text {
                value: "hello".to_string()
            }]
        );
    }

    #[test]
    fn empty_payload_emits_unsupported_and_passes_through() {
        let fx = fixture();

        let returned = fx.interceptor.on_receive(ContentPayload::default());

        assert!(returned.is_some());
        assert_eq!(*fx.sink.events.borrow(), vec![PasteEvent::Unsupported]);
    }

    #[test]
    fn unclassifiable_payload_emits_unsupported() {
        let fx = fixture();
        let payload = ContentPayload::new(vec![ClipItem::handle(ClipHandle::memory(
            "opaque",
            vec![0u8; 8],
        ))]);

        let returned = fx.interceptor.on_receive(payload);

        assert!(returned.is_some());
        assert_eq!(*fx.sink.events.borrow(), vec![PasteEvent::Unsupported]);
    }

    #[test]
    fn undecodable_image_degrades_to_unsupported() {
        let fx = fixture();
        let payload = ContentPayload::new(vec![ClipItem::handle_with_mime(
            ClipHandle::memory("broken", vec![0u8; 16]),
            "image/png",
        )]);

        let returned = fx.interceptor.on_receive(payload);

        // 分类成图片后消费，物化失败降级为不受支持
        assert!(returned.is_none());
        assert_eq!(*fx.sink.events.borrow(), vec![PasteEvent::Unsupported]);
    }

    #[test]
    fn active_gesture_passes_payload_through_silently() {
        let fx = fixture();
        let _guard = fx.gesture.acquire().expect("hold gesture");

        let returned = fx
            .interceptor
            .on_receive(ContentPayload::new(vec![ClipItem::text("hi")]));

        assert!(returned.is_some());
        assert!(fx.sink.events.borrow().is_empty());
    }

    #[test]
    fn gesture_flag_is_released_after_handling() {
        let fx = fixture();

        fx.interceptor
            .on_receive(ContentPayload::new(vec![ClipItem::text("hi")]));

        assert!(!fx.gesture.is_active());
    }
}
