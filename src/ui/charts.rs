use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoints, Points};

use crate::color::RoomTypeColors;
use crate::data::filter::AggMetric;
use crate::data::model::ListingDataset;
use crate::data::stats::median;
use crate::data::view::{
    grouped_aggregate, sampled, top_n_by_count, top_n_by_value, SAMPLE_SEED,
    SCATTER_SAMPLE_CAP,
};

const HISTOGRAM_BINS: usize = 60;
const TOP_NEIGHBOURHOODS: usize = 15;
pub const TOP_LISTINGS: usize = 200;

// ---------------------------------------------------------------------------
// Metrics strip
// ---------------------------------------------------------------------------

/// Quick summary of the current filtered subset, shown above both tabs.
pub fn metrics_strip(ui: &mut Ui, dataset: &ListingDataset, indices: &[usize]) {
    let prices: Vec<f64> = indices.iter().map(|&i| dataset.listings[i].price).collect();
    let reviews: Vec<f64> = indices
        .iter()
        .filter_map(|&i| dataset.listings[i].reviews_per_month)
        .collect();

    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Filtered listings", format!("{}", indices.len()));
        ui.separator();
        metric(ui, "Median price", format!("${:.0}", median(&prices)));
        ui.separator();
        metric(ui, "Median reviews/month", format!("{:.2}", median(&reviews)));
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).heading());
    });
}

// ---------------------------------------------------------------------------
// Overview tab charts
// ---------------------------------------------------------------------------

/// Price histogram of the filtered subset.
pub fn price_histogram(ui: &mut Ui, dataset: &ListingDataset, indices: &[usize]) {
    let prices: Vec<f64> = indices.iter().map(|&i| dataset.listings[i].price).collect();
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let width = ((max - min) / HISTOGRAM_BINS as f64).max(1.0);
    let mut counts = vec![0u32; HISTOGRAM_BINS];
    for &p in &prices {
        let bin = (((p - min) / width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(min + (i as f64 + 0.5) * width, c as f64).width(width))
        .collect();

    Plot::new("price_hist")
        .height(280.0)
        .x_axis_label("Price (USD)")
        .y_axis_label("Listings")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Price distribution"));
        });
}

/// Median/mean price per borough, highest first, with sample sizes.
pub fn borough_price_bar(
    ui: &mut Ui,
    dataset: &ListingDataset,
    indices: &[usize],
    metric: AggMetric,
) {
    let agg = grouped_aggregate(
        dataset,
        indices,
        |l| l.borough.as_str(),
        metric,
        |l| l.price,
    );

    let labels: Vec<String> = agg.iter().map(|g| g.group.clone()).collect();
    let bars: Vec<Bar> = agg
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.value)
                .width(0.6)
                .name(format!("{} · {} listings", g.group, g.count))
        })
        .collect();

    Plot::new("borough_bar")
        .height(280.0)
        .y_axis_label(format!("{metric} price (USD)"))
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let i = mark.value.round();
            if (mark.value - i).abs() < 0.01 && i >= 0.0 && (i as usize) < labels.len() {
                labels[i as usize].clone()
            } else {
                String::new()
            }
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// The most common neighbourhoods of the filtered subset.
pub fn top_neighbourhoods_table(ui: &mut Ui, dataset: &ListingDataset, indices: &[usize]) {
    let top = top_n_by_count(
        dataset,
        indices,
        |l| l.neighbourhood.as_str(),
        TOP_NEIGHBOURHOODS,
    );

    egui::Grid::new("top_neighbourhoods")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Neighbourhood");
            ui.strong("Listings");
            ui.end_row();
            for (name, count) in top {
                ui.label(name);
                ui.label(count.to_string());
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Map + drilldown tab charts
// ---------------------------------------------------------------------------

/// Lat/lon scatter of a seeded sample of the subset, coloured by room type.
pub fn listings_map(
    ui: &mut Ui,
    dataset: &ListingDataset,
    indices: &[usize],
    max_points: usize,
    colors: &RoomTypeColors,
) {
    let sample = sampled(indices, max_points, SAMPLE_SEED);

    Plot::new("listings_map")
        .height(380.0)
        .legend(Legend::default())
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .data_aspect(1.0)
        .show(ui, |plot_ui| {
            for rt in &dataset.room_types {
                let points: PlotPoints = sample
                    .iter()
                    .map(|&i| &dataset.listings[i])
                    .filter(|l| l.room_type == *rt)
                    .map(|l| [l.longitude, l.latitude])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(rt)
                        .color(colors.color_for(rt))
                        .radius(1.5),
                );
            }
        });
}

/// Price against availability for a seeded sample, coloured by room type.
pub fn price_vs_availability(
    ui: &mut Ui,
    dataset: &ListingDataset,
    indices: &[usize],
    colors: &RoomTypeColors,
) {
    let sample = sampled(indices, SCATTER_SAMPLE_CAP, SAMPLE_SEED);

    Plot::new("price_vs_availability")
        .height(300.0)
        .legend(Legend::default())
        .x_axis_label("Availability (days/year)")
        .y_axis_label("Price (USD)")
        .show(ui, |plot_ui| {
            for rt in &dataset.room_types {
                let points: PlotPoints = sample
                    .iter()
                    .map(|&i| &dataset.listings[i])
                    .filter(|l| l.room_type == *rt)
                    .map(|l| [l.availability_365 as f64, l.price])
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(rt)
                        .color(colors.color_for(rt))
                        .radius(2.0),
                );
            }
        });
}

/// The most expensive listings of the subset, in a scrollable table.
pub fn top_listings_table(ui: &mut Ui, dataset: &ListingDataset, indices: &[usize]) {
    let top = top_n_by_value(dataset, indices, |l| l.price, TOP_LISTINGS);

    ScrollArea::vertical()
        .id_salt("top_listings")
        .max_height(320.0)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("top_listings_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for header in [
                        "Name",
                        "Borough",
                        "Neighbourhood",
                        "Room type",
                        "Price",
                        "Min nights",
                        "Reviews",
                        "Reviews/month",
                        "Availability",
                        "Last review",
                    ] {
                        ui.strong(header);
                    }
                    ui.end_row();

                    for &i in &top {
                        let l = &dataset.listings[i];
                        ui.label(&l.name);
                        ui.label(&l.borough);
                        ui.label(&l.neighbourhood);
                        ui.label(&l.room_type);
                        ui.label(format!("${:.0}", l.price));
                        ui.label(l.minimum_nights.to_string());
                        ui.label(l.number_of_reviews.to_string());
                        ui.label(
                            l.reviews_per_month
                                .map(|r| format!("{r:.2}"))
                                .unwrap_or_default(),
                        );
                        ui.label(l.availability_365.to_string());
                        ui.label(
                            l.last_review.map(|d| d.to_string()).unwrap_or_default(),
                        );
                        ui.end_row();
                    }
                });
        });
}
