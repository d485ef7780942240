pub mod backup;
pub mod calendar;
pub mod db;
pub mod format;
pub mod models;
pub mod openfoodfacts;
pub mod prefill;
pub mod service;
pub mod suggest;
pub mod totals;
pub mod trend;
