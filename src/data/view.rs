use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::filter::AggMetric;
use super::model::{Listing, ListingDataset};
use super::stats::{mean, median};

/// Fixed seed so samples are reproducible for an unchanged filter state.
pub const SAMPLE_SEED: u64 = 42;

/// Row cap for the price-vs-availability scatter.
pub const SCATTER_SAMPLE_CAP: usize = 4000;

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Draw `min(indices.len(), cap)` indices without replacement.
///
/// The same `(indices, cap, seed)` always yields the same set of rows; the
/// order within the sample is not meaningful.
pub fn sampled(indices: &[usize], cap: usize, seed: u64) -> Vec<usize> {
    let mut rng = SmallRng::seed_from_u64(seed);
    indices
        .choose_multiple(&mut rng, cap.min(indices.len()))
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Grouped aggregation
// ---------------------------------------------------------------------------

/// One group of a [`grouped_aggregate`] result.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub group: String,
    pub value: f64,
    pub count: usize,
}

/// Group the subset by `group_by`, compute `metric` of `value` per group plus
/// a row count, ordered descending by metric value with ties in lexicographic
/// group order.
pub fn grouped_aggregate<G, V>(
    dataset: &ListingDataset,
    indices: &[usize],
    group_by: G,
    metric: AggMetric,
    value: V,
) -> Vec<GroupAggregate>
where
    G: Fn(&Listing) -> &str,
    V: Fn(&Listing) -> f64,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for &i in indices {
        let l = &dataset.listings[i];
        groups
            .entry(group_by(l).to_string())
            .or_default()
            .push(value(l));
    }

    let mut out: Vec<GroupAggregate> = groups
        .into_iter()
        .map(|(group, values)| GroupAggregate {
            group,
            value: match metric {
                AggMetric::Median => median(&values),
                AggMetric::Mean => mean(&values),
            },
            count: values.len(),
        })
        .collect();

    // Stable sort on a lexicographically ordered input keeps tied groups in
    // lexicographic order.
    out.sort_by(|a, b| b.value.total_cmp(&a.value));
    out
}

// ---------------------------------------------------------------------------
// Top-N tables
// ---------------------------------------------------------------------------

/// The `n` most frequent values of a category column with their counts,
/// descending by count, ties in lexicographic order.
pub fn top_n_by_count<C>(
    dataset: &ListingDataset,
    indices: &[usize],
    category: C,
    n: usize,
) -> Vec<(String, usize)>
where
    C: Fn(&Listing) -> &str,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for &i in indices {
        *counts
            .entry(category(&dataset.listings[i]).to_string())
            .or_default() += 1;
    }

    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out.truncate(n);
    out
}

/// The `n` rows with greatest `value`, descending; ties keep the subset's
/// original (dataset) order.
pub fn top_n_by_value<V>(
    dataset: &ListingDataset,
    indices: &[usize],
    value: V,
    n: usize,
) -> Vec<usize>
where
    V: Fn(&Listing) -> f64,
{
    let mut out = indices.to_vec();
    out.sort_by(|&a, &b| {
        value(&dataset.listings[b]).total_cmp(&value(&dataset.listings[a]))
    });
    out.truncate(n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::data::model::Listing;

    fn listing(id: i64, borough: &str, neighbourhood: &str, price: f64) -> Listing {
        Listing {
            id,
            name: format!("listing {id}"),
            borough: borough.into(),
            neighbourhood: neighbourhood.into(),
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
            listing(1, "A", "n1", 100.0),
            listing(2, "A", "n1", 200.0),
            listing(3, "B", "n2", 300.0),
            listing(4, "B", "n2", 400.0),
            listing(5, "B", "n3", 500.0),
        ])
    }

    #[test]
    fn sample_respects_cap_and_is_deterministic() {
        let indices: Vec<usize> = (0..100).collect();

        let a = sampled(&indices, 10, SAMPLE_SEED);
        let b = sampled(&indices, 10, SAMPLE_SEED);
        assert_eq!(a.len(), 10);

        let mut sa = a.clone();
        let mut sb = b.clone();
        sa.sort_unstable();
        sb.sort_unstable();
        assert_eq!(sa, sb);
        sa.dedup();
        assert_eq!(sa.len(), 10, "sample must be without replacement");
    }

    #[test]
    fn sample_of_small_subset_returns_everything() {
        let indices = vec![3, 7, 11];
        let mut got = sampled(&indices, 2500, SAMPLE_SEED);
        got.sort_unstable();
        assert_eq!(got, indices);
    }

    #[test]
    fn grouped_aggregate_orders_by_metric_descending() {
        let ds = five_row_dataset();
        let indices: Vec<usize> = (0..ds.len()).collect();

        let agg = grouped_aggregate(
            &ds,
            &indices,
            |l| l.borough.as_str(),
            AggMetric::Median,
            |l| l.price,
        );

        assert_eq!(agg.len(), 2);
        assert_eq!(agg[0].group, "B");
        assert_relative_eq!(agg[0].value, 400.0);
        assert_eq!(agg[0].count, 3);
        assert_eq!(agg[1].group, "A");
        assert_relative_eq!(agg[1].value, 150.0);
        assert_eq!(agg[1].count, 2);
    }

    #[test]
    fn grouped_aggregate_ties_are_lexicographic() {
        let ds = ListingDataset::from_listings(vec![
            listing(1, "C", "n", 100.0),
            listing(2, "A", "n", 100.0),
            listing(3, "B", "n", 100.0),
        ]);
        let indices: Vec<usize> = (0..ds.len()).collect();

        let agg = grouped_aggregate(
            &ds,
            &indices,
            |l| l.borough.as_str(),
            AggMetric::Mean,
            |l| l.price,
        );
        let groups: Vec<&str> = agg.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(groups, vec!["A", "B", "C"]);
    }

    #[test]
    fn top_n_by_count_breaks_ties_lexicographically() {
        let ds = five_row_dataset();
        let indices: Vec<usize> = (0..ds.len()).collect();

        let top = top_n_by_count(&ds, &indices, |l| l.neighbourhood.as_str(), 10);
        // n1 and n2 both have 2 rows; n1 sorts first.
        assert_eq!(
            top,
            vec![
                ("n1".to_string(), 2),
                ("n2".to_string(), 2),
                ("n3".to_string(), 1)
            ]
        );

        let top1 = top_n_by_count(&ds, &indices, |l| l.neighbourhood.as_str(), 1);
        assert_eq!(top1, vec![("n1".to_string(), 2)]);
    }

    #[test]
    fn top_n_by_value_is_stable_on_ties() {
        let ds = ListingDataset::from_listings(vec![
            listing(1, "A", "n", 300.0),
            listing(2, "A", "n", 500.0),
            listing(3, "A", "n", 300.0),
            listing(4, "A", "n", 400.0),
        ]);
        let indices: Vec<usize> = (0..ds.len()).collect();

        let top = top_n_by_value(&ds, &indices, |l| l.price, 4);
        // The two 300-priced rows keep their dataset order (index 0 before 2).
        assert_eq!(top, vec![1, 3, 0, 2]);
    }

    #[test]
    fn empty_subset_yields_empty_results() {
        let ds = five_row_dataset();
        let empty: Vec<usize> = Vec::new();

        assert!(sampled(&empty, 2500, SAMPLE_SEED).is_empty());
        assert!(grouped_aggregate(
            &ds,
            &empty,
            |l| l.borough.as_str(),
            AggMetric::Median,
            |l| l.price
        )
        .is_empty());
        assert!(top_n_by_count(&ds, &empty, |l| l.neighbourhood.as_str(), 15).is_empty());
        assert!(top_n_by_value(&ds, &empty, |l| l.price, 200).is_empty());
    }
}
