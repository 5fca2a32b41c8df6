use egui::Context as EguiContext;
use shaderbox_params::{ParamValue, Parameter, ParameterPanel};
use shaderbox_scene::Scene;

/// What the user did in the overlay this frame.
#[derive(Debug, Default)]
pub struct UiActions {
    pub changes: Vec<(String, ParamValue)>,
    pub toggle_pause: bool,
}

pub struct HudStats {
    pub title: &'static str,
    pub fps: f64,
    pub running: bool,
    pub pending_assets: usize,
}

/// Draws the parameter panel and frame stats. Widgets edit copies; edits
/// come back as [`UiActions`] for the caller to route through the panel.
pub fn draw_ui(ctx: &EguiContext, panel: &ParameterPanel<Scene>, stats: &HudStats) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("parameters")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading(stats.title);
            ui.horizontal(|ui| {
                ui.label(format!("{:.0} fps", stats.fps));
                let label = if stats.running { "Pause" } else { "Resume" };
                if ui.button(label).clicked() {
                    actions.toggle_pause = true;
                }
            });
            if stats.pending_assets > 0 {
                ui.label(format!("loading {} asset(s)...", stats.pending_assets));
            }
            ui.separator();

            for parameter in panel.in_group(None) {
                parameter_widget(ui, parameter, &mut actions.changes);
            }
            for (id, group) in panel.groups() {
                egui::CollapsingHeader::new(group.name.as_str())
                    .default_open(!group.collapsed)
                    .show(ui, |ui| {
                        for parameter in panel.in_group(Some(id)) {
                            parameter_widget(ui, parameter, &mut actions.changes);
                        }
                    });
            }
        });

    actions
}

fn parameter_widget(
    ui: &mut egui::Ui,
    parameter: &Parameter,
    changes: &mut Vec<(String, ParamValue)>,
) {
    let name = parameter.name();
    let changed = match *parameter.value() {
        ParamValue::Scalar(mut v) => {
            let response = match parameter.range() {
                Some(range) => {
                    let mut slider = egui::Slider::new(&mut v, range.min..=range.max).text(name);
                    if let Some(step) = range.step {
                        slider = slider.step_by(step as f64);
                    }
                    ui.add(slider)
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.label(name);
                        ui.add(egui::DragValue::new(&mut v).speed(0.1))
                    })
                    .inner
                }
            };
            response.changed().then_some(ParamValue::Scalar(v))
        }
        ParamValue::Color(color) => {
            let mut rgb = color.to_array();
            ui.horizontal(|ui| {
                let response = ui.color_edit_button_rgb(&mut rgb);
                ui.label(name);
                response
            })
            .inner
            .changed()
            .then(|| ParamValue::Color(shaderbox_common::Color::from_array(rgb)))
        }
        ParamValue::Bool(mut b) => ui
            .checkbox(&mut b, name)
            .changed()
            .then_some(ParamValue::Bool(b)),
    };
    if let Some(value) = changed {
        changes.push((name.to_string(), value));
    }
}
