//! Clearview - opens a window whose Metal layer is cleared to a solid color
//!
//! On hosts without Cocoa the same surface is driven by the headless renderer.

use clearview::config::SurfaceConfig;

#[cfg(target_os = "macos")]
mod macos_main {
    use log::info;
    use clearview::backend::cocoa::ClearApp;
    use clearview::config::SurfaceConfig;

    pub fn run(config: SurfaceConfig) -> anyhow::Result<()> {
        info!("Starting clear view with {:?} resources", config.policy);

        let app = ClearApp::new(config)?;
        app.run();

        Ok(())
    }
}

#[cfg(not(target_os = "macos"))]
mod headless_main {
    use log::{info, warn};
    use clearview::config::SurfaceConfig;
    use clearview::renderer::headless;

    pub fn run(config: SurfaceConfig) -> anyhow::Result<()> {
        warn!("Cocoa is unavailable, rendering {} frames headless", config.frames);

        let report = headless::render_frames(config)?;
        info!(
            "Presented {} frames with {} commits and {} command queues",
            report.frames_presented, report.commits, report.queues_created
        );
        if let Some(pixel) = report.front_pixel {
            info!("Front buffer BGRA: {:?}", pixel);
        }

        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SurfaceConfig::from_env()?;

    #[cfg(target_os = "macos")]
    {
        macos_main::run(config)
    }

    #[cfg(not(target_os = "macos"))]
    {
        headless_main::run(config)
    }
}
