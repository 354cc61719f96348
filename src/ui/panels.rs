use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::{
    default_price_range, min_nights_slider_max, price_slider_max, AggMetric, FilterKey,
    FilterValue,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
///
/// Widgets read the current store values, and any edit is written back to the
/// store before the subset is recomputed at the end of the frame. Sliders
/// clamp to their offered bounds, so no further validation happens here.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match state.dataset.clone() {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    let snapshot = match state.filters.snapshot() {
        Ok(s) => s,
        Err(e) => {
            ui.label(RichText::new(format!("{e}")).color(Color32::RED));
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Borough multiselect ----
            ui.strong("Borough");
            let mut boroughs = snapshot.boroughs.clone();
            let mut changed = false;
            for b in &dataset.boroughs {
                let mut checked = boroughs.contains(b);
                if ui.checkbox(&mut checked, b).changed() {
                    if checked {
                        boroughs.insert(b.clone());
                    } else {
                        boroughs.remove(b);
                    }
                    changed = true;
                }
            }
            if changed {
                state
                    .filters
                    .write(FilterKey::Boroughs, FilterValue::Selection(boroughs));
            }
            ui.separator();

            // ---- Room type multiselect ----
            ui.strong("Room type");
            let mut room_types = snapshot.room_types.clone();
            let mut changed = false;
            for rt in &dataset.room_types {
                let mut checked = room_types.contains(rt);
                if ui.checkbox(&mut checked, rt).changed() {
                    if checked {
                        room_types.insert(rt.clone());
                    } else {
                        room_types.remove(rt);
                    }
                    changed = true;
                }
            }
            if changed {
                state
                    .filters
                    .write(FilterKey::RoomTypes, FilterValue::Selection(room_types));
            }
            ui.separator();

            // ---- Price range ----
            ui.strong("Price range (USD)");
            let (mut p_lo, mut p_hi) = snapshot.price_range;
            let p_min = default_price_range(&dataset).0;
            let p_max = price_slider_max(&dataset);
            let lo_edited = ui
                .add(egui::Slider::new(&mut p_lo, p_min..=p_hi).text("low"))
                .changed();
            let hi_edited = ui
                .add(egui::Slider::new(&mut p_hi, p_lo..=p_max).text("high"))
                .changed();
            if lo_edited || hi_edited {
                state.filters.write(
                    FilterKey::PriceRange,
                    FilterValue::Range(p_lo.min(p_hi), p_hi.max(p_lo)),
                );
            }
            ui.separator();

            // ---- Minimum-nights cap ----
            ui.strong("Max minimum nights");
            let mut nights = snapshot.min_nights_max;
            let nights_max = min_nights_slider_max(&dataset);
            if ui
                .add(egui::Slider::new(&mut nights, 1..=nights_max))
                .changed()
            {
                state
                    .filters
                    .write(FilterKey::MinNightsMax, FilterValue::Count(nights));
            }
            ui.separator();

            // ---- Availability range ----
            ui.strong("Availability (days per year)");
            let (mut a_lo, mut a_hi) = snapshot.availability_range;
            let lo_edited = ui
                .add(egui::Slider::new(&mut a_lo, 0..=a_hi).text("low"))
                .changed();
            let hi_edited = ui
                .add(egui::Slider::new(&mut a_hi, a_lo..=365).text("high"))
                .changed();
            if lo_edited || hi_edited {
                state.filters.write(
                    FilterKey::AvailabilityRange,
                    FilterValue::Range(a_lo.min(a_hi), a_hi.max(a_lo)),
                );
            }
            ui.separator();

            // ---- Map point cap ----
            ui.strong("Max points on map");
            let mut cap = snapshot.max_map_points as i64;
            if ui
                .add(egui::Slider::new(&mut cap, 500..=8000).step_by(500.0))
                .changed()
            {
                state
                    .filters
                    .write(FilterKey::MaxMapPoints, FilterValue::Count(cap));
            }
            ui.separator();

            // ---- Aggregation choice ----
            ui.strong("Borough price aggregation");
            let mut metric = snapshot.agg_metric;
            let mut edited = false;
            for m in AggMetric::ALL {
                if ui.radio_value(&mut metric, m, m.to_string()).changed() {
                    edited = true;
                }
            }
            if edited {
                state
                    .filters
                    .write(FilterKey::AggMetric, FilterValue::Metric(metric));
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }
        });

    // Recompute the visible subset after any widget edits.
    state.refilter();
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings data")
        .add_filter("Supported files", &["csv", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}
