//! API module for the EEG Web Assistant REST interface
//!
//! Contains ONLY wire types and pure conversions (no HTTP client dependencies).
//! The client crate wraps these with `reqwest`.

pub mod types;

pub use types::{
    ClassificationInfo, ClassificationType, EnqueueReply, NewUser, PasswordUpdate,
    PersonalInfoUpdate, PlotFragment, RawSegment, RecordingDetail, RecordingInfo,
    RecordingListItemOut, RecordingUpdate, SubjectInfo, SubjectUpdate, TaskId, TaskState,
    TaskStatusReply, UserOut, UserToken,
};
