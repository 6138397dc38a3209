//! emoji-mover core - domain types, error handling, configuration and the
//! sync drivers.

pub mod config;
pub mod download;
pub mod error;
pub mod models;
pub mod pacing;
pub mod scan;
pub mod session;
pub mod sync;
pub mod upload;

#[cfg(test)]
mod testing;

pub use config::{load_exclusions, load_settings, PacingConfig, Settings};
pub use download::{DownloadOutcome, DownloadReport, ImageFetcher, ImageSource};
pub use error::AppError;
pub use models::{DownloadedImage, EmojiRecord, ExclusionSet, ExistingSet, Inventory, WorkSet};
pub use pacing::Pacer;
pub use scan::ScanMode;
pub use session::{BrowserSession, DestinationUi, FileField, SLACK_UI};
pub use sync::{reconcile, ItemOutcome, MigrationStats, ReconcileSummary};
pub use upload::{upload_all, UploadReport};
