// src/main.rs
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use moviecat::app::MovieCatApp;
use moviecat::config::load_config;

fn pick_renderer() -> eframe::Renderer {
    match env::var("MOVIECAT_RENDERER").as_deref() {
        Ok("glow") => eframe::Renderer::Glow,
        Ok("wgpu") => eframe::Renderer::Wgpu,
        _ => {
            // Default: Windows = WGPU (DX12), Others = Glow (GL)
            #[cfg(target_os = "windows")]
            { eframe::Renderer::Wgpu }
            #[cfg(not(target_os = "windows"))]
            { eframe::Renderer::Glow }
        }
    }
}

fn main() -> eframe::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let cfg = load_config();
    info!(
        "data file {}, {} workers, poster cache {}",
        cfg.data_file.display(),
        cfg.worker_count,
        cfg.cache_capacity
    );

    let options = eframe::NativeOptions {
        renderer: pick_renderer(),
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    match eframe::run_native(
        "Movie Collection Manager",
        options,
        Box::new(|cc| Ok(Box::new(MovieCatApp::new(cc, cfg)))),
    ) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("eframe failed to start: {e:?}");
            error!("Hint: try MOVIECAT_RENDERER=wgpu or glow.");
            Err(e)
        }
    }
}
