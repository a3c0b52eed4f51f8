mod record;
mod run;

pub use record::{CleanRecord, CleaningStats, RawRecord};
pub use run::{PageRequest, RunStatus, ScrapeRun};
