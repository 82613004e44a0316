//! Recording list entries

use eegwa_common::api::RecordingListItemOut;
use eegwa_common::human_time::{format_created, parse_timestamp};
use eegwa_common::Result;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingListItem {
    pub id: String,
    pub name: String,
    /// RFC 1123 UTC string without zone name
    pub created: String,
    pub subject_full_name: Option<String>,
}

impl RecordingListItem {
    pub fn from_wire(item: &RecordingListItemOut) -> Result<Self> {
        Ok(Self {
            id: item.id.clone(),
            name: item.name.clone(),
            created: format_created(&parse_timestamp(&item.created)?),
            subject_full_name: item.subject_full_name.clone(),
        })
    }
}
