use asset_common::{CatalogEntry, Color};

/// Something the user did in the panel this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    Select(usize),
    Tint(Color),
}

/// What the panel shows. Built fresh every frame.
pub struct PanelView<'a> {
    pub catalog: &'a [CatalogEntry],
    pub selected: Option<usize>,
    pub tint: Color,
    /// `Some` while a model is loading. The inner value is `None` if the size is unknown.
    pub progress: Option<Option<f32>>,
    pub error: Option<&'a str>,
}

pub fn show_panel(ctx: &egui::Context, view: PanelView<'_>) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    egui::Window::new("Model")
        .resizable(false)
        .show(ctx, |ui| {
            let mut selected = view.selected;
            let selected_text = view
                .selected
                .and_then(|index| view.catalog.get(index))
                .map(|entry| entry.name.as_str())
                .unwrap_or("Select a model");

            egui::ComboBox::from_label("Model")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (index, entry) in view.catalog.iter().enumerate() {
                        ui.selectable_value(&mut selected, Some(index), entry.name.as_str());
                    }
                });
            if selected != view.selected {
                if let Some(index) = selected {
                    actions.push(PanelAction::Select(index));
                }
            }

            ui.horizontal(|ui| {
                ui.label("Tint: ");
                let mut rgb = view.tint.to_array();
                if ui.color_edit_button_rgb(&mut rgb).changed() {
                    actions.push(PanelAction::Tint(Color::from(rgb)));
                }
            });

            if let Some(progress) = view.progress {
                let bar = match progress {
                    Some(ratio) => egui::ProgressBar::new(ratio).show_percentage(),
                    None => egui::ProgressBar::new(0.0).animate(true),
                };
                ui.add(bar);
            }

            if let Some(error) = view.error {
                ui.colored_label(egui::Color32::RED, error);
            }
        });

    actions
}
