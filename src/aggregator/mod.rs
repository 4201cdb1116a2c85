pub mod history;
pub mod snapshot;
pub mod manager;

pub use history::HistoryBuffer;
pub use manager::{CycleReport, DataManager, Feeds, SourceOutcome};
pub use snapshot::{HistoryLens, Snapshot};
