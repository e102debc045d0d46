#[cfg(feature = "gui")]
mod app;

#[cfg(feature = "gui")]
pub fn launch(source: std::sync::Arc<dyn crate::sources::MoodSource>) {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 760.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Moodify",
        options,
        Box::new(move |cc| Ok(Box::new(app::MoodifyApp::new(cc, source)))),
    ) {
        tracing::error!(error = %e, "GUI exited with an error");
    }
}
