//! Status bar panel: bottom bar showing sample counts and how the run ended.

use egui::{Color32, RichText, Ui};

use crate::session::StopReason;

/// How far the acquisition has got
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunStatus {
    #[default]
    Running,
    Finished {
        reason: StopReason,
        samples: u64,
    },
    Failed(String),
}

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: &'a RunStatus,
    /// Samples currently shown
    pub shown: usize,
    pub window: Option<usize>,
    pub frames: u64,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        let (status_color, status_text) = match ctx.status {
            RunStatus::Running => (Color32::GREEN, "Acquiring".to_string()),
            RunStatus::Finished { reason, samples } => {
                (Color32::GRAY, format!("{} ({} samples)", reason, samples))
            }
            RunStatus::Failed(_) => (Color32::RED, "Failed".to_string()),
        };
        ui.colored_label(status_color, "●");
        ui.label(RichText::new(status_text).small());

        ui.separator();

        let window = match ctx.window {
            Some(n) => n.to_string(),
            None => "unlimited".to_string(),
        };
        ui.label(RichText::new(format!("Shown: {} / {}", ctx.shown, window)).small());

        ui.separator();

        ui.label(RichText::new(format!("Updates: {}", ctx.frames)).small());

        if let RunStatus::Failed(error) = ctx.status {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
