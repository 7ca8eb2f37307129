//! NSApplication delegate and window bootstrap

use log::{debug, info};
use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2::{define_class, msg_send, MainThreadOnly};
use objc2_app_kit::{
    NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate, NSMenu, NSMenuItem,
};
use objc2_foundation::{MainThreadMarker, NSNotification, NSObject, NSObjectProtocol, NSString};

use super::window::ClearWindow;
use crate::config::SurfaceConfig;
use crate::renderer::metal::MetalDevice;

/// Initial content size of the window
pub const WINDOW_WIDTH: u32 = 800;
pub const WINDOW_HEIGHT: u32 = 600;

/// Clear view application wrapper
pub struct ClearApp {
    /// NSApplication instance
    app: Retained<NSApplication>,
    /// Application delegate (NSApplication only holds it weakly)
    _delegate: Retained<ClearAppDelegate>,
    /// The single window hosting the view
    window: ClearWindow,
}

impl ClearApp {
    /// Create the application, its window and bind the default Metal device
    pub fn new(config: SurfaceConfig) -> anyhow::Result<Self> {
        info!("Initializing clear view application");

        // Ensure we're on the main thread
        let mtm = MainThreadMarker::new()
            .ok_or_else(|| anyhow::anyhow!("Must be called from the main thread"))?;

        let app = NSApplication::sharedApplication(mtm);
        app.setActivationPolicy(NSApplicationActivationPolicy::Regular);

        let delegate = ClearAppDelegate::new(mtm);
        let delegate_obj: &ProtocolObject<dyn NSApplicationDelegate> =
            ProtocolObject::from_ref(&*delegate);
        app.setDelegate(Some(delegate_obj));

        Self::setup_menu_bar(mtm, &app);

        let window = ClearWindow::new(mtm, WINDOW_WIDTH, WINDOW_HEIGHT, "Clear View", config)?;
        window.show();

        let device = MetalDevice::system_default()?;
        window.view().assign_device(device)?;
        // The move-to-window redraw ran before a device was bound
        window.view().redraw();

        debug!("Clear view application initialized");

        Ok(Self {
            app,
            _delegate: delegate,
            window,
        })
    }

    /// Set up the application menu bar
    fn setup_menu_bar(mtm: MainThreadMarker, app: &NSApplication) {
        unsafe {
            let main_menu = NSMenu::new(mtm);

            let app_menu_item = NSMenuItem::new(mtm);
            let app_menu = NSMenu::new(mtm);

            let quit_title = NSString::from_str("Quit Clear View");
            let quit_key = NSString::from_str("q");
            let quit_item = NSMenuItem::initWithTitle_action_keyEquivalent(
                mtm.alloc(),
                &quit_title,
                Some(objc2::sel!(terminate:)),
                &quit_key,
            );
            app_menu.addItem(&quit_item);

            app_menu_item.setSubmenu(Some(&app_menu));
            main_menu.addItem(&app_menu_item);

            app.setMainMenu(Some(&main_menu));
        }
    }

    /// Run the application event loop until the window closes
    pub fn run(&self) {
        let (width, height) = self.window.content_size();
        info!("Starting event loop, window content {}x{}", width, height);

        #[allow(deprecated)]
        self.app.activateIgnoringOtherApps(true);
        self.app.run();
    }
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "ClearAppDelegate"]
    #[ivars = ()]
    struct ClearAppDelegate;

    unsafe impl NSObjectProtocol for ClearAppDelegate {}

    unsafe impl NSApplicationDelegate for ClearAppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn application_did_finish_launching(&self, _notification: &NSNotification) {
            info!("Application did finish launching");
        }

        #[unsafe(method(applicationWillTerminate:))]
        fn application_will_terminate(&self, _notification: &NSNotification) {
            info!("Application will terminate");
        }

        #[unsafe(method(applicationShouldTerminateAfterLastWindowClosed:))]
        fn application_should_terminate_after_last_window_closed(
            &self,
            _app: &NSApplication,
        ) -> bool {
            true
        }
    }
);

impl ClearAppDelegate {
    fn new(mtm: MainThreadMarker) -> Retained<Self> {
        let this = mtm.alloc::<Self>().set_ivars(());
        unsafe { msg_send![super(this), init] }
    }
}
