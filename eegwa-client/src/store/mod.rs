//! Session stores mirroring backend resources
//!
//! Each store owns its slice of client state behind an async lock and talks to the
//! backend only through an injected service trait object.

pub mod analysis;
pub mod classification;
pub mod plot;
pub mod recordings_list;
pub mod user_account;

pub use analysis::AnalysisStore;
pub use classification::{ClassificationStateStore, ClassificationStatus, RegistryEntry};
pub use plot::{max_fragment_nr, segment_shapes, PlotStore, Shape, PLOT_FRAGMENT_SECONDS};
pub use recordings_list::RecordingsListStore;
pub use user_account::UserAccountStore;
