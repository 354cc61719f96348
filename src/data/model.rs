use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Listing – one row of the source table
// ---------------------------------------------------------------------------

/// A single rental listing (one cleaned row of the source file).
///
/// Rows that survive loading always satisfy: `price > 0`,
/// `minimum_nights > 0`, and non-empty `borough`, `neighbourhood` and
/// `room_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    /// Source column `neighbourhood_group`.
    pub borough: String,
    pub neighbourhood: String,
    pub room_type: String,
    pub price: f64,
    pub minimum_nights: i64,
    pub number_of_reviews: i64,
    /// Absent when the listing has never been reviewed.
    pub reviews_per_month: Option<f64>,
    pub latitude: f64,
    pub longitude: f64,
    /// Days per year the listing is bookable, 0..=365.
    pub availability_365: i64,
    /// Absent when the listing has never been reviewed.
    pub last_review: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// ListingDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full cleaned dataset with pre-computed distinct category values.
///
/// Constructed once at load time and read-only afterwards; shared across
/// render cycles behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ListingDataset {
    /// All listings (rows), in source order.
    pub listings: Vec<Listing>,
    /// Distinct borough names, lexicographically ordered.
    pub boroughs: Vec<String>,
    /// Distinct room-type names, lexicographically ordered.
    pub room_types: Vec<String>,
}

impl ListingDataset {
    /// Build category indices from the cleaned listings.
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut boroughs: BTreeSet<String> = BTreeSet::new();
        let mut room_types: BTreeSet<String> = BTreeSet::new();

        for l in &listings {
            boroughs.insert(l.borough.clone());
            room_types.insert(l.room_type.clone());
        }

        ListingDataset {
            listings,
            boroughs: boroughs.into_iter().collect(),
            room_types: room_types.into_iter().collect(),
        }
    }

    /// Number of listings.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// All prices, in row order.
    pub fn prices(&self) -> Vec<f64> {
        self.listings.iter().map(|l| l.price).collect()
    }

    /// All minimum-nights values, in row order.
    pub fn minimum_nights(&self) -> Vec<f64> {
        self.listings.iter().map(|l| l.minimum_nights as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(borough: &str, room_type: &str) -> Listing {
        Listing {
            id: 0,
            name: "test".into(),
            borough: borough.into(),
            neighbourhood: "n".into(),
            room_type: room_type.into(),
            price: 100.0,
            minimum_nights: 1,
            number_of_reviews: 0,
            reviews_per_month: None,
            latitude: 40.7,
            longitude: -74.0,
            availability_365: 100,
            last_review: None,
        }
    }

    #[test]
    fn distinct_categories_are_sorted_and_deduplicated() {
        let ds = ListingDataset::from_listings(vec![
            listing("Queens", "Private room"),
            listing("Brooklyn", "Entire home/apt"),
            listing("Queens", "Entire home/apt"),
        ]);
        assert_eq!(ds.boroughs, vec!["Brooklyn", "Queens"]);
        assert_eq!(ds.room_types, vec!["Entire home/apt", "Private room"]);
        assert_eq!(ds.len(), 3);
    }
}
