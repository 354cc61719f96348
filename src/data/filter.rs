use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;

use super::model::ListingDataset;
use super::stats::percentile;

/// Default sampling cap for the map scatter.
pub const DEFAULT_MAX_MAP_POINTS: i64 = 2500;

/// Ceiling applied to the data-derived minimum-nights default.
pub const MIN_NIGHTS_DEFAULT_CAP: i64 = 30;

// ---------------------------------------------------------------------------
// Filter keys and values
// ---------------------------------------------------------------------------

/// The closed set of filter keys. Every key is present in a [`FilterStore`]
/// once `initialize` has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FilterKey {
    Boroughs,
    RoomTypes,
    PriceRange,
    MinNightsMax,
    AvailabilityRange,
    MaxMapPoints,
    AggMetric,
}

impl FilterKey {
    pub const ALL: [FilterKey; 7] = [
        FilterKey::Boroughs,
        FilterKey::RoomTypes,
        FilterKey::PriceRange,
        FilterKey::MinNightsMax,
        FilterKey::AvailabilityRange,
        FilterKey::MaxMapPoints,
        FilterKey::AggMetric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Boroughs => "boroughs",
            FilterKey::RoomTypes => "room_types",
            FilterKey::PriceRange => "price_range",
            FilterKey::MinNightsMax => "min_nights_max",
            FilterKey::AvailabilityRange => "availability_range",
            FilterKey::MaxMapPoints => "max_map_points",
            FilterKey::AggMetric => "agg_metric",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistic used for the borough price comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggMetric {
    Median,
    Mean,
}

impl AggMetric {
    pub const ALL: [AggMetric; 2] = [AggMetric::Median, AggMetric::Mean];
}

impl fmt::Display for AggMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggMetric::Median => f.write_str("Median"),
            AggMetric::Mean => f.write_str("Mean"),
        }
    }
}

/// A dynamically-typed filter value; each key always holds the same kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Selected category names (boroughs, room types).
    Selection(BTreeSet<String>),
    /// Inclusive `(low, high)` pair, `low <= high`.
    Range(i64, i64),
    /// Single integer value (caps).
    Count(i64),
    /// Aggregation statistic choice.
    Metric(AggMetric),
}

impl FilterValue {
    fn kind(&self) -> &'static str {
        match self {
            FilterValue::Selection(_) => "selection",
            FilterValue::Range(_, _) => "range",
            FilterValue::Count(_) => "count",
            FilterValue::Metric(_) => "metric",
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations of the filter-state store. These indicate a pipeline
/// ordering bug (read before initialize), not a user-facing condition.
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("filter key `{0}` read before initialization")]
    MissingKey(FilterKey),

    #[error("filter key `{key}` holds a {found} value, expected {expected}")]
    WrongKind {
        key: FilterKey,
        expected: &'static str,
        found: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Default derivation
// ---------------------------------------------------------------------------

/// Default price range: dataset minimum to the 99th percentile, so a handful
/// of extreme listings does not stretch the default view.
pub fn default_price_range(dataset: &ListingDataset) -> (i64, i64) {
    let prices = dataset.prices();
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let low = if low.is_finite() { low as i64 } else { 0 };
    let high = percentile(&prices, 0.99) as i64;
    (low, high.max(low))
}

/// Default minimum-nights cap: 99th percentile, capped at
/// [`MIN_NIGHTS_DEFAULT_CAP`] and never below 1.
pub fn default_min_nights_max(dataset: &ListingDataset) -> i64 {
    let p99 = percentile(&dataset.minimum_nights(), 0.99) as i64;
    p99.min(MIN_NIGHTS_DEFAULT_CAP).max(1)
}

/// Upper bound offered by the price slider (slightly beyond the default so
/// the user can widen past the p99 cutoff).
pub fn price_slider_max(dataset: &ListingDataset) -> i64 {
    let prices = dataset.prices();
    let p995 = percentile(&prices, 0.995) as i64;
    p995.max(default_price_range(dataset).1)
}

/// Upper bound offered by the minimum-nights slider.
pub fn min_nights_slider_max(dataset: &ListingDataset) -> i64 {
    let p99 = percentile(&dataset.minimum_nights(), 0.99) as i64;
    p99.max(MIN_NIGHTS_DEFAULT_CAP)
}

fn default_value(key: FilterKey, dataset: &ListingDataset) -> FilterValue {
    match key {
        FilterKey::Boroughs => {
            FilterValue::Selection(dataset.boroughs.iter().cloned().collect())
        }
        FilterKey::RoomTypes => {
            FilterValue::Selection(dataset.room_types.iter().cloned().collect())
        }
        FilterKey::PriceRange => {
            let (low, high) = default_price_range(dataset);
            FilterValue::Range(low, high)
        }
        FilterKey::MinNightsMax => FilterValue::Count(default_min_nights_max(dataset)),
        FilterKey::AvailabilityRange => FilterValue::Range(0, 365),
        FilterKey::MaxMapPoints => FilterValue::Count(DEFAULT_MAX_MAP_POINTS),
        FilterKey::AggMetric => FilterValue::Metric(AggMetric::Median),
    }
}

// ---------------------------------------------------------------------------
// FilterStore – the per-session filter state container
// ---------------------------------------------------------------------------

/// Key→value store for the current filter selections.
///
/// Lifecycle: `initialize` populates data-derived defaults exactly once per
/// store (a key that already holds a value is never overwritten); widgets
/// mutate single keys via `write`; `reset` unconditionally recomputes every
/// default. Reads before initialization fail with
/// [`StateError::MissingKey`].
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    values: BTreeMap<FilterKey, FilterValue>,
}

impl FilterStore {
    /// Populate defaults for any key not yet present. Safe to call on every
    /// render cycle; a no-op once all keys exist.
    pub fn initialize(&mut self, dataset: &ListingDataset) {
        for key in FilterKey::ALL {
            self.values
                .entry(key)
                .or_insert_with(|| default_value(key, dataset));
        }
    }

    /// Current value for `key`.
    pub fn read(&self, key: FilterKey) -> Result<&FilterValue, StateError> {
        self.values.get(&key).ok_or(StateError::MissingKey(key))
    }

    /// Overwrite the current value for `key` with a widget-supplied value.
    pub fn write(&mut self, key: FilterKey, value: FilterValue) {
        self.values.insert(key, value);
    }

    /// Unconditionally recompute and overwrite every key's default.
    pub fn reset(&mut self, dataset: &ListingDataset) {
        for key in FilterKey::ALL {
            self.values.insert(key, default_value(key, dataset));
        }
    }

    /// Read out a typed snapshot for the view derivation engine.
    pub fn snapshot(&self) -> Result<FilterSnapshot, StateError> {
        Ok(FilterSnapshot {
            boroughs: self.read_selection(FilterKey::Boroughs)?,
            room_types: self.read_selection(FilterKey::RoomTypes)?,
            price_range: self.read_range(FilterKey::PriceRange)?,
            min_nights_max: self.read_count(FilterKey::MinNightsMax)?,
            availability_range: self.read_range(FilterKey::AvailabilityRange)?,
            max_map_points: self.read_count(FilterKey::MaxMapPoints)?.max(1) as usize,
            agg_metric: self.read_metric(FilterKey::AggMetric)?,
        })
    }

    fn read_selection(&self, key: FilterKey) -> Result<BTreeSet<String>, StateError> {
        match self.read(key)? {
            FilterValue::Selection(s) => Ok(s.clone()),
            other => Err(wrong_kind(key, "selection", other)),
        }
    }

    fn read_range(&self, key: FilterKey) -> Result<(i64, i64), StateError> {
        match self.read(key)? {
            FilterValue::Range(lo, hi) => Ok((*lo, *hi)),
            other => Err(wrong_kind(key, "range", other)),
        }
    }

    fn read_count(&self, key: FilterKey) -> Result<i64, StateError> {
        match self.read(key)? {
            FilterValue::Count(n) => Ok(*n),
            other => Err(wrong_kind(key, "count", other)),
        }
    }

    fn read_metric(&self, key: FilterKey) -> Result<AggMetric, StateError> {
        match self.read(key)? {
            FilterValue::Metric(m) => Ok(*m),
            other => Err(wrong_kind(key, "metric", other)),
        }
    }
}

fn wrong_kind(key: FilterKey, expected: &'static str, found: &FilterValue) -> StateError {
    StateError::WrongKind {
        key,
        expected,
        found: found.kind(),
    }
}

// ---------------------------------------------------------------------------
// FilterSnapshot – typed per-cycle view of the store
// ---------------------------------------------------------------------------

/// All filter values read out once per render cycle, consumed by the view
/// derivation engine so every display surface sees the same state.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSnapshot {
    pub boroughs: BTreeSet<String>,
    pub room_types: BTreeSet<String>,
    pub price_range: (i64, i64),
    pub min_nights_max: i64,
    pub availability_range: (i64, i64),
    pub max_map_points: usize,
    pub agg_metric: AggMetric,
}

/// Return indices of listings that pass all five filter predicates.
///
/// Pure function of `(dataset, snapshot)`; recomputed from scratch every
/// cycle. An empty result is valid.
pub fn filtered_indices(dataset: &ListingDataset, snapshot: &FilterSnapshot) -> Vec<usize> {
    let (p_lo, p_hi) = snapshot.price_range;
    let (a_lo, a_hi) = snapshot.availability_range;

    dataset
        .listings
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            snapshot.boroughs.contains(&l.borough)
                && snapshot.room_types.contains(&l.room_type)
                && l.price >= p_lo as f64
                && l.price <= p_hi as f64
                && l.minimum_nights <= snapshot.min_nights_max
                && l.availability_365 >= a_lo
                && l.availability_365 <= a_hi
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Listing;

    fn listing(borough: &str, price: f64) -> Listing {
        Listing {
            id: 0,
            name: "test".into(),
            borough: borough.into(),
            neighbourhood: "n".into(),
            room_type: "Private room".into(),
            price,
            minimum_nights: 2,
            number_of_reviews: 0,
            reviews_per_month: None,
            latitude: 40.7,
            longitude: -74.0,
            availability_365: 180,
            last_review: None,
        }
    }

    fn five_row_dataset() -> ListingDataset {
        ListingDataset::from_listings(vec![
            listing("A", 100.0),
            listing("A", 200.0),
            listing("B", 300.0),
            listing("B", 400.0),
            listing("B", 500.0),
        ])
    }

    #[test]
    fn initialize_derives_defaults_from_dataset() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.price_range, (100, 496));
        assert_eq!(snap.min_nights_max, 2);
        assert_eq!(snap.availability_range, (0, 365));
        assert_eq!(snap.max_map_points, 2500);
        assert_eq!(snap.agg_metric, AggMetric::Median);
        assert!(snap.boroughs.contains("A") && snap.boroughs.contains("B"));
        assert_eq!(snap.room_types.len(), 1);
    }

    #[test]
    fn initialize_is_idempotent() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);
        store.write(FilterKey::PriceRange, FilterValue::Range(150, 250));

        // A second initialize must not overwrite user-set values.
        store.initialize(&ds);
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.price_range, (150, 250));
    }

    #[test]
    fn reset_matches_fresh_initialize() {
        let ds = five_row_dataset();

        let mut fresh = FilterStore::default();
        fresh.initialize(&ds);

        let mut mutated = FilterStore::default();
        mutated.initialize(&ds);
        mutated.write(FilterKey::MinNightsMax, FilterValue::Count(14));
        mutated.write(FilterKey::AggMetric, FilterValue::Metric(AggMetric::Mean));
        mutated.reset(&ds);

        assert_eq!(fresh.snapshot().unwrap(), mutated.snapshot().unwrap());
    }

    #[test]
    fn read_before_initialize_is_missing_key() {
        let store = FilterStore::default();
        assert_eq!(
            store.read(FilterKey::Boroughs),
            Err(StateError::MissingKey(FilterKey::Boroughs))
        );
        assert!(store.snapshot().is_err());
    }

    #[test]
    fn snapshot_rejects_mismatched_value_kind() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);
        store.write(FilterKey::PriceRange, FilterValue::Count(5));

        assert_eq!(
            store.snapshot(),
            Err(StateError::WrongKind {
                key: FilterKey::PriceRange,
                expected: "range",
                found: "count",
            })
        );
    }

    #[test]
    fn min_nights_default_is_capped() {
        let mut rows: Vec<Listing> = (0..100).map(|_| listing("A", 100.0)).collect();
        for l in rows.iter_mut() {
            l.minimum_nights = 365;
        }
        let ds = ListingDataset::from_listings(rows);
        assert_eq!(default_min_nights_max(&ds), MIN_NIGHTS_DEFAULT_CAP);
    }

    #[test]
    fn filtered_indices_applies_all_predicates() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);

        // Keep only borough A at full ranges.
        store.write(
            FilterKey::Boroughs,
            FilterValue::Selection(std::iter::once("A".to_string()).collect()),
        );
        store.write(FilterKey::PriceRange, FilterValue::Range(0, 10_000));

        let snap = store.snapshot().unwrap();
        assert_eq!(filtered_indices(&ds, &snap), vec![0, 1]);
    }

    #[test]
    fn widening_price_range_never_shrinks_result() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);

        let narrow = {
            let mut s = store.snapshot().unwrap();
            s.price_range = (100, 300);
            filtered_indices(&ds, &s).len()
        };
        let wide = {
            let mut s = store.snapshot().unwrap();
            s.price_range = (100, 500);
            filtered_indices(&ds, &s).len()
        };
        assert!(wide >= narrow);
        assert_eq!(wide, 5);
    }

    #[test]
    fn empty_selection_yields_empty_result() {
        let ds = five_row_dataset();
        let mut store = FilterStore::default();
        store.initialize(&ds);
        store.write(FilterKey::Boroughs, FilterValue::Selection(BTreeSet::new()));

        let snap = store.snapshot().unwrap();
        assert!(filtered_indices(&ds, &snap).is_empty());
    }
}
