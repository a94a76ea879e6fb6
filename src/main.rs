use retouch::app::RetouchApp;
use std::path::PathBuf;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let initial_image_path: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Retouch — Image Editor",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(RetouchApp::new_with_initial_path(
                &cc.egui_ctx,
                initial_image_path.as_deref(),
            )))
        }),
    )
}
