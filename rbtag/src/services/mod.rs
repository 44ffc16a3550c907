//! Services: roster, parsing, scanning, tag model, archive management

pub mod archive_manager;
pub mod filename_parser;
pub mod orchestrator;
pub mod program_directory;
pub mod retention;
pub mod scanner;
pub mod tag_model;

pub use archive_manager::ArchiveSlotManager;
pub use filename_parser::{FilenameParser, Rejection};
pub use orchestrator::Orchestrator;
pub use program_directory::ProgramDirectory;
pub use retention::RetentionPolicy;
pub use scanner::{CandidateScanner, DirectoryScan, LogScan, ScanOutcome};
pub use tag_model::TagModel;
