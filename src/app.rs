use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::RoomTypeColors;
use crate::data::filter::AggMetric;
use crate::data::model::ListingDataset;
use crate::state::{AppState, Tab};
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StayScopeApp {
    pub state: AppState,
}

impl StayScopeApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for StayScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One render cycle: defaults are (idempotently) initialized and the
        // filtered subset recomputed, widgets apply their edits, then both
        // tabs read the same subset.
        self.state.refilter();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            central_panel(ui, &mut self.state);
        });
    }
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to explore  (File → Open…)");
        });
        return;
    };
    let Some(colors) = state.room_colors.clone() else {
        return;
    };
    let snapshot = match state.filters.snapshot() {
        Ok(s) => s,
        Err(e) => {
            ui.label(RichText::new(format!("{e}")).color(Color32::RED));
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }
    });
    ui.separator();

    charts::metrics_strip(ui, &dataset, &state.visible_indices);
    ui.separator();

    ScrollArea::vertical()
        .id_salt("central_tab")
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Overview => {
                overview_tab(ui, &dataset, &state.visible_indices, snapshot.agg_metric)
            }
            Tab::Explore => explore_tab(
                ui,
                &dataset,
                &state.visible_indices,
                snapshot.max_map_points,
                &colors,
            ),
        });
}

fn empty_notice(ui: &mut Ui, hint: &str) {
    ui.label(
        RichText::new(format!("No rows match the current filters. {hint}"))
            .color(Color32::YELLOW),
    );
}

fn overview_tab(ui: &mut Ui, dataset: &ListingDataset, indices: &[usize], metric: AggMetric) {
    ui.heading("Price distribution and borough comparison");

    if indices.is_empty() {
        empty_notice(ui, "Try widening the price range or selecting more boroughs.");
        return;
    }

    ui.columns(2, |cols: &mut [Ui]| {
        charts::price_histogram(&mut cols[0], dataset, indices);
        charts::borough_price_bar(&mut cols[1], dataset, indices, metric);
    });

    ui.add_space(8.0);
    ui.heading("Top neighbourhoods by listing count");
    charts::top_neighbourhoods_table(ui, dataset, indices);
}

fn explore_tab(
    ui: &mut Ui,
    dataset: &ListingDataset,
    indices: &[usize],
    max_map_points: usize,
    colors: &RoomTypeColors,
) {
    ui.heading("Map and relationship view");

    if indices.is_empty() {
        empty_notice(ui, "Try widening the filters to see the map and plots.");
        return;
    }

    charts::listings_map(ui, dataset, indices, max_map_points, colors);
    ui.add_space(8.0);
    charts::price_vs_availability(ui, dataset, indices, colors);

    ui.add_space(8.0);
    ui.heading(format!(
        "Listings table (filtered, top {} by price)",
        charts::TOP_LISTINGS
    ));
    charts::top_listings_table(ui, dataset, indices);
}
