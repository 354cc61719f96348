use std::fs;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Synthetic listings generator: writes a CSV at the path the app loads by
/// default, with realistic skew (price outliers, long-stay minimums, a share
/// of never-reviewed rows).
const OUTPUT_PATH: &str = "data/listings.csv";
const ROWS_PER_BOROUGH: usize = 1200;

struct BoroughSpec {
    name: &'static str,
    lat: f64,
    lon: f64,
    base_price: f64,
    neighbourhoods: &'static [&'static str],
}

const BOROUGHS: [BoroughSpec; 5] = [
    BoroughSpec {
        name: "Manhattan",
        lat: 40.7831,
        lon: -73.9712,
        base_price: 180.0,
        neighbourhoods: &["Harlem", "Midtown", "East Village", "Upper West Side"],
    },
    BoroughSpec {
        name: "Brooklyn",
        lat: 40.6782,
        lon: -73.9442,
        base_price: 120.0,
        neighbourhoods: &["Williamsburg", "Bushwick", "Bedford-Stuyvesant", "Park Slope"],
    },
    BoroughSpec {
        name: "Queens",
        lat: 40.7282,
        lon: -73.7949,
        base_price: 95.0,
        neighbourhoods: &["Astoria", "Long Island City", "Flushing", "Ridgewood"],
    },
    BoroughSpec {
        name: "Bronx",
        lat: 40.8448,
        lon: -73.8648,
        base_price: 80.0,
        neighbourhoods: &["Fordham", "Mott Haven", "Kingsbridge"],
    },
    BoroughSpec {
        name: "Staten Island",
        lat: 40.5795,
        lon: -74.1502,
        base_price: 70.0,
        neighbourhoods: &["St. George", "Tompkinsville", "Stapleton"],
    },
];

const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 1.6),
    ("Private room", 0.8),
    ("Shared room", 0.45),
];

fn main() -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(42);

    fs::create_dir_all("data").context("creating data directory")?;
    let mut writer = csv::Writer::from_path(OUTPUT_PATH).context("creating output file")?;

    writer.write_record([
        "id",
        "name",
        "neighbourhood_group",
        "neighbourhood",
        "room_type",
        "price",
        "minimum_nights",
        "number_of_reviews",
        "reviews_per_month",
        "latitude",
        "longitude",
        "availability_365",
        "last_review",
    ])?;

    let review_epoch = NaiveDate::from_ymd_opt(2018, 1, 1).expect("valid date");
    let mut id: i64 = 1000;

    for borough in &BOROUGHS {
        for _ in 0..ROWS_PER_BOROUGH {
            let neighbourhood =
                borough.neighbourhoods[rng.gen_range(0..borough.neighbourhoods.len())];
            let (room_type, multiplier) = ROOM_TYPES[rng.gen_range(0..ROOM_TYPES.len())];

            // Long right tail: roughly one listing in a hundred is priced far
            // beyond the rest, so the p99 default actually cuts something.
            let mut price = borough.base_price * multiplier * rng.gen_range(0.5..2.0);
            if rng.gen_ratio(1, 100) {
                price *= rng.gen_range(5.0..20.0);
            }

            let minimum_nights = if rng.gen_ratio(1, 20) {
                rng.gen_range(28..=120)
            } else {
                rng.gen_range(1..=5)
            };

            let number_of_reviews: i64 = if rng.gen_ratio(1, 5) {
                0
            } else {
                rng.gen_range(1..=250)
            };
            let (reviews_per_month, last_review) = if number_of_reviews == 0 {
                (String::new(), String::new())
            } else {
                let date = review_epoch + Duration::days(rng.gen_range(0..550));
                (
                    format!("{:.2}", rng.gen_range(0.05..6.0)),
                    date.to_string(),
                )
            };

            writer.write_record([
                id.to_string(),
                format!("{neighbourhood} {room_type} #{id}"),
                borough.name.to_string(),
                neighbourhood.to_string(),
                room_type.to_string(),
                format!("{price:.0}"),
                minimum_nights.to_string(),
                number_of_reviews.to_string(),
                reviews_per_month,
                format!("{:.5}", borough.lat + rng.gen_range(-0.05..0.05)),
                format!("{:.5}", borough.lon + rng.gen_range(-0.05..0.05)),
                rng.gen_range(0..=365).to_string(),
                last_review,
            ])?;
            id += 1;
        }
    }

    writer.flush()?;
    println!(
        "Wrote {} listings to {OUTPUT_PATH}",
        BOROUGHS.len() * ROWS_PER_BOROUGH
    );
    Ok(())
}
