use eframe::egui;
use pdf_uploader::app::PdfUploader;
use pdf_uploader::config::UploaderConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = match UploaderConfig::load().map_err(|e| e.to_string()).and_then(|config| {
        PdfUploader::new(config).map_err(|e| e.to_string())
    }) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 480.0])
            .with_min_inner_size([400.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let result = eframe::run_native(
        "PDF Uploader",
        options,
        Box::new(move |cc: &eframe::CreationContext<'_>| -> Box<dyn eframe::App> {
            app.setup_fonts(&cc.egui_ctx);
            Box::new(app)
        }),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Window failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
