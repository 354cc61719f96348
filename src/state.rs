use std::path::Path;
use std::sync::Arc;

use crate::color::RoomTypeColors;
use crate::data::filter::{filtered_indices, FilterStore};
use crate::data::loader;
use crate::data::model::ListingDataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Which central-panel tab is showing. Both tabs consume the same filtered
/// subset computed for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Explore,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Overview, Tab::Explore];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Explore => "Map + Drilldown",
        }
    }
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Arc<ListingDataset>>,

    /// Current filter selections.
    pub filters: FilterStore,

    /// Indices of listings passing the current filters. Recomputed from
    /// scratch once per render cycle; both tabs read this same subset.
    pub visible_indices: Vec<usize>,

    /// Room-type colours shared by the scatter charts.
    pub room_colors: Option<RoomTypeColors>,

    /// Active central-panel tab.
    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset: recompute filter defaults and colours.
    pub fn set_dataset(&mut self, dataset: Arc<ListingDataset>) {
        self.filters.reset(&dataset);
        self.room_colors = Some(RoomTypeColors::new(&dataset.room_types));
        self.visible_indices = (0..dataset.len()).collect();
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    /// Load a file through the dataset cache. Failures become a status
    /// message rather than tearing down the running app.
    pub fn load_from_path(&mut self, path: &Path) {
        match loader::load_cached(path) {
            Ok(dataset) => {
                log::info!("loaded {} listings from {}", dataset.len(), path.display());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Recompute `visible_indices` for this cycle.
    ///
    /// `initialize` runs first so every key is present before the snapshot
    /// read; it is a no-op on every cycle after the first.
    pub fn refilter(&mut self) {
        let Some(dataset) = self.dataset.clone() else {
            self.visible_indices.clear();
            return;
        };

        self.filters.initialize(&dataset);
        match self.filters.snapshot() {
            Ok(snapshot) => {
                self.visible_indices = filtered_indices(&dataset, &snapshot);
            }
            Err(e) => {
                // Contract violation: initialize above guarantees presence,
                // so this only fires on a mis-typed write.
                log::error!("filter state unreadable: {e}");
                self.visible_indices.clear();
            }
        }
    }

    /// Restore every filter to its data-derived default.
    pub fn reset_filters(&mut self) {
        if let Some(dataset) = self.dataset.clone() {
            self.filters.reset(&dataset);
            self.refilter();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Listing;

    fn dataset() -> Arc<ListingDataset> {
        Arc::new(ListingDataset::from_listings(vec![Listing {
            id: 1,
            name: "apt".into(),
            borough: "Queens".into(),
            neighbourhood: "Astoria".into(),
            room_type: "Private room".into(),
            price: 80.0,
            minimum_nights: 2,
            number_of_reviews: 3,
            reviews_per_month: Some(0.4),
            latitude: 40.76,
            longitude: -73.92,
            availability_365: 120,
            last_review: None,
        }]))
    }

    #[test]
    fn set_dataset_initializes_filters_and_shows_all_rows() {
        let mut state = AppState::default();
        state.set_dataset(dataset());
        state.refilter();
        assert_eq!(state.visible_indices, vec![0]);
        assert!(state.filters.snapshot().is_ok());
    }

    #[test]
    fn refilter_without_dataset_clears_subset() {
        let mut state = AppState {
            visible_indices: vec![1, 2, 3],
            ..Default::default()
        };
        state.refilter();
        assert!(state.visible_indices.is_empty());
    }
}
