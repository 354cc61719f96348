use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use super::model::{Listing, ListingDataset};

/// Column headers the source table must provide. Extra columns are ignored.
const REQUIRED_COLUMNS: [&str; 13] = [
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
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row naming the required listing columns
/// * `.json` – records-oriented array: `[{ "id": 1, "price": 149, ... }, ...]`
pub fn load_file(path: &Path) -> Result<ListingDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Memoized [`load_file`]: the first successful load of a path is kept for
/// the process lifetime and repeated calls return the same shared dataset
/// without re-reading the source. The cache is never invalidated.
pub fn load_cached(path: &Path) -> Result<Arc<ListingDataset>> {
    let mut cache = dataset_cache().lock().expect("dataset cache lock");
    if let Some(dataset) = cache.get(path) {
        log::debug!("dataset cache hit for {}", path.display());
        return Ok(Arc::clone(dataset));
    }

    let dataset = Arc::new(load_file(path)?);
    cache.insert(path.to_path_buf(), Arc::clone(&dataset));
    Ok(dataset)
}

fn dataset_cache() -> &'static Mutex<HashMap<PathBuf, Arc<ListingDataset>>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<ListingDataset>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

// ---------------------------------------------------------------------------
// Raw rows and cleaning
// ---------------------------------------------------------------------------

/// One source row before coercion. Every field is optional; `clean` decides
/// which absences drop the row.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawListing {
    id: Option<i64>,
    name: Option<String>,
    neighbourhood_group: Option<String>,
    neighbourhood: Option<String>,
    room_type: Option<String>,
    price: Option<f64>,
    minimum_nights: Option<i64>,
    number_of_reviews: Option<i64>,
    reviews_per_month: Option<f64>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    availability_365: Option<i64>,
    last_review: Option<String>,
}

/// Coerce a raw row into a [`Listing`], or drop it.
///
/// A row is dropped when latitude, longitude, price, room type, borough or
/// neighbourhood is absent, when any integer field fails coercion, or when
/// price or minimum-nights is non-positive. An unparseable `last_review`
/// becomes `None`, not an error.
fn clean(raw: RawListing) -> Option<Listing> {
    let borough = non_empty(raw.neighbourhood_group)?;
    let neighbourhood = non_empty(raw.neighbourhood)?;
    let room_type = non_empty(raw.room_type)?;
    let price = raw.price?;
    let minimum_nights = raw.minimum_nights?;

    if price <= 0.0 || minimum_nights <= 0 {
        return None;
    }

    Some(Listing {
        id: raw.id?,
        name: raw.name.unwrap_or_default(),
        borough,
        neighbourhood,
        room_type,
        price,
        minimum_nights,
        number_of_reviews: raw.number_of_reviews?,
        reviews_per_month: raw.reviews_per_month,
        latitude: raw.latitude?,
        longitude: raw.longitude?,
        availability_365: raw.availability_365?,
        last_review: raw.last_review.as_deref().and_then(parse_date),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn build_dataset(raw_rows: Vec<RawListing>) -> ListingDataset {
    let total = raw_rows.len();
    let listings: Vec<Listing> = raw_rows.into_iter().filter_map(clean).collect();

    log::info!(
        "loaded {} listings ({} rows dropped during cleaning)",
        listings.len(),
        total - listings.len()
    );

    ListingDataset::from_listings(listings)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<ListingDataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

/// Parse CSV content from any reader. A missing required column is fatal;
/// per-row coercion failures drop the row instead.
pub fn parse_csv<R: Read>(reader: R) -> Result<ListingDataset> {
    let mut reader = csv::Reader::from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == c))
        .collect();
    if !missing.is_empty() {
        bail!("CSV missing required columns: {}", missing.join(", "));
    }

    let index: HashMap<&str, usize> = REQUIRED_COLUMNS
        .iter()
        .map(|&c| {
            let pos = headers.iter().position(|h| h == c).unwrap_or_default();
            (c, pos)
        })
        .collect();

    let mut raw_rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        raw_rows.push(raw_from_record(&record, &index));
    }

    Ok(build_dataset(raw_rows))
}

fn raw_from_record(record: &csv::StringRecord, index: &HashMap<&str, usize>) -> RawListing {
    let field = |name: &str| -> Option<&str> {
        index
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let int = |name: &str| field(name).and_then(|s| s.parse::<i64>().ok());
    let float = |name: &str| field(name).and_then(|s| s.parse::<f64>().ok());

    RawListing {
        id: int("id"),
        name: field("name").map(str::to_string),
        neighbourhood_group: field("neighbourhood_group").map(str::to_string),
        neighbourhood: field("neighbourhood").map(str::to_string),
        room_type: field("room_type").map(str::to_string),
        price: float("price"),
        minimum_nights: int("minimum_nights"),
        number_of_reviews: int("number_of_reviews"),
        reviews_per_month: float("reviews_per_month"),
        latitude: float("latitude"),
        longitude: float("longitude"),
        availability_365: int("availability_365"),
        last_review: field("last_review").map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "id": 2539,
///     "name": "Clean & quiet apt",
///     "neighbourhood_group": "Brooklyn",
///     "neighbourhood": "Kensington",
///     "room_type": "Private room",
///     "price": 149,
///     "minimum_nights": 1,
///     "number_of_reviews": 9,
///     "reviews_per_month": 0.21,
///     "latitude": 40.64749,
///     "longitude": -73.97237,
///     "availability_365": 365,
///     "last_review": "2018-10-19"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ListingDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<ListingDataset> {
    let raw_rows: Vec<RawListing> =
        serde_json::from_str(text).context("parsing JSON records")?;
    Ok(build_dataset(raw_rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,name,neighbourhood_group,neighbourhood,room_type,price,\
minimum_nights,number_of_reviews,reviews_per_month,latitude,longitude,\
availability_365,last_review";

    fn parse(rows: &str) -> ListingDataset {
        let csv = format!("{HEADER}\n{rows}");
        parse_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn parses_a_clean_row() {
        let ds = parse(
            "2539,Clean apt,Brooklyn,Kensington,Private room,149,1,9,0.21,\
40.64749,-73.97237,365,2018-10-19",
        );
        assert_eq!(ds.len(), 1);
        let l = &ds.listings[0];
        assert_eq!(l.borough, "Brooklyn");
        assert_eq!(l.price, 149.0);
        assert_eq!(
            l.last_review,
            Some(NaiveDate::from_ymd_opt(2018, 10, 19).unwrap())
        );
    }

    #[test]
    fn unparseable_optional_fields_become_absent() {
        let ds = parse(
            "1,apt,Queens,Astoria,Private room,80,2,0,,40.7,-73.9,100,not-a-date",
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].last_review, None);
        assert_eq!(ds.listings[0].reviews_per_month, None);
    }

    #[test]
    fn drops_rows_missing_required_fields() {
        let ds = parse(
            // missing latitude
            "1,apt,Queens,Astoria,Private room,80,2,0,0.5,,-73.9,100,\n\
             2,apt,Queens,Astoria,,80,2,0,0.5,40.7,-73.9,100,\n\
             3,apt,Queens,Astoria,Private room,abc,2,0,0.5,40.7,-73.9,100,\n\
             4,apt,Queens,Astoria,Private room,80,2,0,0.5,40.7,-73.9,100,",
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].id, 4);
    }

    #[test]
    fn drops_non_positive_price_and_nights() {
        let ds = parse(
            "1,apt,Queens,Astoria,Private room,0,2,0,0.5,40.7,-73.9,100,\n\
             2,apt,Queens,Astoria,Private room,80,0,0,0.5,40.7,-73.9,100,\n\
             3,apt,Queens,Astoria,Private room,80,2,0,0.5,40.7,-73.9,100,",
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].id, 3);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let csv = "id,name,price\n1,apt,80";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("missing required columns"));
    }

    #[test]
    fn extra_columns_are_ignored() {
        let csv = format!("{HEADER},host_id\n1,apt,Queens,Astoria,Private room,80,2,0,0.5,40.7,-73.9,100,2018-10-19,999");
        let ds = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn json_records_round_through_the_same_cleaning() {
        let ds = parse_json(
            r#"[
                {"id": 1, "name": "apt", "neighbourhood_group": "Queens",
                 "neighbourhood": "Astoria", "room_type": "Private room",
                 "price": 80, "minimum_nights": 2, "number_of_reviews": 0,
                 "latitude": 40.7, "longitude": -73.9, "availability_365": 100},
                {"id": 2, "price": -5}
            ]"#,
        )
        .unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.listings[0].id, 1);
        assert_eq!(ds.listings[0].reviews_per_month, None);
    }
}
