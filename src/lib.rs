//! Interactive explorer for short-term rental listings.
//!
//! The data layer (`data::{loader, filter, view}`) is a pure pipeline:
//! `dataset + filter state → filtered subset → derived views`, independent of
//! the egui shell so it can be exercised without any UI present.

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
