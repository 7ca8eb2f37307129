//! NSWindow hosting a clear view

use log::debug;
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadOnly};
use objc2_app_kit::{NSBackingStoreType, NSWindow, NSWindowDelegate, NSWindowStyleMask};
use objc2_foundation::{
    CGPoint, CGRect, CGSize, MainThreadMarker, NSNotification, NSObject, NSObjectProtocol,
    NSString,
};

use super::view::ClearMetalView;
use crate::config::SurfaceConfig;

/// Native window whose content view is a [`ClearMetalView`]
pub struct ClearWindow {
    /// The underlying NSWindow
    window: Retained<NSWindow>,
    /// Content view
    view: Retained<ClearMetalView>,
    /// Window delegate (NSWindow only holds it weakly)
    _delegate: Retained<ClearWindowDelegate>,
}

impl ClearWindow {
    /// Create a new native window
    pub fn new(
        mtm: MainThreadMarker,
        width: u32,
        height: u32,
        title: &str,
        config: SurfaceConfig,
    ) -> anyhow::Result<Self> {
        let frame = CGRect::new(CGPoint::new(0.0, 0.0), CGSize::new(width as f64, height as f64));

        let style = NSWindowStyleMask::Titled
            | NSWindowStyleMask::Closable
            | NSWindowStyleMask::Miniaturizable
            | NSWindowStyleMask::Resizable;

        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                mtm.alloc(),
                frame,
                style,
                NSBackingStoreType::Buffered,
                false,
            )
        };
        unsafe { window.setReleasedWhenClosed(false) };

        let ns_title = NSString::from_str(title);
        window.setTitle(&ns_title);
        window.center();

        let view = ClearMetalView::new(mtm, frame, config);
        window.setContentView(Some(view.ns_view()));

        let delegate = ClearWindowDelegate::new(mtm, view.clone());
        let delegate_obj: &ProtocolObject<dyn NSWindowDelegate> =
            ProtocolObject::from_ref(&*delegate);
        window.setDelegate(Some(delegate_obj));

        debug!("Created native window {}x{}, title: {}", width, height, title);

        Ok(Self {
            window,
            view,
            _delegate: delegate,
        })
    }

    /// Show the window
    pub fn show(&self) {
        self.window.makeKeyAndOrderFront(None);
    }

    /// Get the content view
    pub fn view(&self) -> &ClearMetalView {
        &self.view
    }

    /// Get the content size (excluding title bar)
    pub fn content_size(&self) -> (u32, u32) {
        let content_rect = self.window.contentRectForFrameRect(self.window.frame());
        (content_rect.size.width as u32, content_rect.size.height as u32)
    }
}

/// Window delegate ivars
struct ClearWindowDelegateIvars {
    view: Retained<ClearMetalView>,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "ClearWindowDelegate"]
    #[ivars = ClearWindowDelegateIvars]
    struct ClearWindowDelegate;

    unsafe impl NSObjectProtocol for ClearWindowDelegate {}

    unsafe impl NSWindowDelegate for ClearWindowDelegate {
        #[unsafe(method(windowDidResize:))]
        fn window_did_resize(&self, _notification: &NSNotification) {
            debug!("Window did resize");
            self.ivars().view.redraw();
        }

        #[unsafe(method(windowDidChangeBackingProperties:))]
        fn window_did_change_backing_properties(&self, _notification: &NSNotification) {
            debug!("Window backing properties changed");
            self.ivars().view.redraw();
        }

        #[unsafe(method(windowWillClose:))]
        fn window_will_close(&self, _notification: &NSNotification) {
            debug!("Window will close");
        }
    }
);

impl ClearWindowDelegate {
    fn new(mtm: MainThreadMarker, view: Retained<ClearMetalView>) -> Retained<Self> {
        let this = mtm
            .alloc::<Self>()
            .set_ivars(ClearWindowDelegateIvars { view });
        unsafe { msg_send![super(this), init] }
    }
}
