//! Display view models built from backend wire types

pub mod classification_segment;
pub mod recording_analysis;
pub mod recording_list_item;

pub use classification_segment::{normalize, normalize_all, ClassificationSegment};
pub use recording_analysis::{Hand, RecordingAnalysis, Sex, SubjectEdit};
pub use recording_list_item::RecordingListItem;
