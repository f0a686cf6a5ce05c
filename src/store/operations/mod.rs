pub mod engagement;
pub mod notes;
pub mod preferences;
pub mod progress;
pub mod retention;
pub mod snapshots;
pub mod statistics;
pub mod transfer;
