/// Data layer: core types, loading, filter state, and view derivation.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + clean source → ListingDataset (cached per path)
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ListingDataset  │  Vec<Listing>, distinct boroughs / room types
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterStore defaults / writes → FilterSnapshot
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  filtered indices, seeded samples, grouped aggregates
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod view;
