//! NSView backed by a `CAMetalLayer` that is cleared on every redraw

use log::{debug, warn};
use objc2::rc::{Allocated, Retained};
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, DefinedClass, MainThreadOnly};
use objc2_app_kit::{NSView, NSViewLayerContentsRedrawPolicy};
use objc2_foundation::{CGRect, MainThreadMarker, NSCoder, NSObjectProtocol};
use objc2_quartz_core::{CALayer, CALayerDelegate};

use crate::config::SurfaceConfig;
use crate::renderer::metal::{MetalBackend, MetalDevice};
use crate::surface::{LayerRedrawPolicy, SharedSurface, SurfaceError};

/// View ivars - the platform independent surface state
pub struct ClearViewIvars {
    surface: SharedSurface<MetalBackend>,
}

impl ClearViewIvars {
    fn new(config: SurfaceConfig) -> Self {
        Self {
            surface: SharedSurface::new(config),
        }
    }
}

define_class!(
    #[unsafe(super(NSView))]
    #[thread_kind = MainThreadOnly]
    #[name = "ClearMetalView"]
    #[ivars = ClearViewIvars]
    pub struct ClearMetalView;

    unsafe impl NSObjectProtocol for ClearMetalView {}

    // Host-driven redraws of the backing layer
    unsafe impl CALayerDelegate for ClearMetalView {
        #[unsafe(method(displayLayer:))]
        fn display_layer(&self, _layer: &CALayer) {
            self.redraw();
        }
    }

    impl ClearMetalView {
        #[unsafe(method(initWithCoder:))]
        fn init_with_coder(this: Allocated<Self>, coder: &NSCoder) -> Option<Retained<Self>> {
            let config = SurfaceConfig::from_env().unwrap_or_else(|e| {
                warn!("Ignoring invalid configuration: {}", e);
                SurfaceConfig::default()
            });
            let this = this.set_ivars(ClearViewIvars::new(config));
            let this: Option<Retained<Self>> =
                unsafe { msg_send![super(this), initWithCoder: coder] };
            if let Some(view) = &this {
                view.common_init();
            }
            this
        }

        #[unsafe(method(makeBackingLayer))]
        fn make_backing_layer(&self) -> Retained<CALayer> {
            let Some(metal_layer) = self.ivars().surface.attach_layer(|layer| layer.retained())
            else {
                warn!("{} is busy, returning an unmanaged layer", self.ivars().surface.id());
                return unsafe { CALayer::new() };
            };

            let delegate: &ProtocolObject<dyn CALayerDelegate> = ProtocolObject::from_ref(self);
            unsafe { metal_layer.setDelegate(Some(delegate)) };

            Retained::into_super(metal_layer)
        }

        #[unsafe(method(viewDidMoveToWindow))]
        fn view_did_move_to_window(&self) {
            debug!("View moved to window: {}", self.window().is_some());
            self.ivars().surface.move_to_display();
        }

        #[unsafe(method(isOpaque))]
        fn is_opaque(&self) -> bool {
            true
        }
    }
);

impl ClearMetalView {
    /// Create a view with the given frame
    pub fn new(mtm: MainThreadMarker, frame: CGRect, config: SurfaceConfig) -> Retained<Self> {
        let this = mtm.alloc::<Self>().set_ivars(ClearViewIvars::new(config));
        let this: Retained<Self> = unsafe { msg_send![super(this), initWithFrame: frame] };
        this.common_init();

        debug!(
            "Created clear view {}, size {}x{}",
            this.ivars().surface.id(),
            frame.size.width,
            frame.size.height
        );

        this
    }

    fn common_init(&self) {
        let (wants_layer, redraw_policy) = self.ivars().surface.layer_settings();
        let policy = match redraw_policy {
            LayerRedrawPolicy::Never => NSViewLayerContentsRedrawPolicy::Never,
            LayerRedrawPolicy::DuringViewResize => {
                NSViewLayerContentsRedrawPolicy::DuringViewResize
            }
        };

        unsafe {
            self.setWantsLayer(wants_layer);
            self.setLayerContentsRedrawPolicy(policy);
        }
    }

    /// Get the underlying NSView
    pub fn ns_view(&self) -> &NSView {
        self
    }

    /// Bind a Metal device to the backing layer
    pub fn assign_device(&self, device: MetalDevice) -> Result<(), SurfaceError> {
        self.ivars().surface.assign_device(device)
    }

    /// Clear and present one frame
    pub fn redraw(&self) {
        self.ivars().surface.redraw();
    }
}
