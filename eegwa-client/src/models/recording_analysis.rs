//! Recording analysis view model
//!
//! Flattens `GET /recording/{id}` into the fields the analysis view shows, with dates
//! formatted and subject enums decoded from backend integer codes.

use eegwa_common::api::{RecordingDetail, SubjectInfo, SubjectUpdate};
use eegwa_common::human_time::{
    duration_seconds, epoch_millis, format_created, format_date, format_duration, parse_timestamp,
};
use eegwa_common::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Handedness of the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Right,
    Left,
    Ambidextrous,
}

impl Hand {
    /// Decode backend code; unknown codes yield `None`
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Hand::Right),
            2 => Some(Hand::Left),
            3 => Some(Hand::Ambidextrous),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Hand::Right => 1,
            Hand::Left => 2,
            Hand::Ambidextrous => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Right => "right",
            Hand::Left => "left",
            Hand::Ambidextrous => "ambidextrous",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "right" => Ok(Hand::Right),
            "left" => Ok(Hand::Left),
            "ambidextrous" => Ok(Hand::Ambidextrous),
            other => Err(Error::InvalidInput(format!("Unknown hand '{}'", other))),
        }
    }
}

/// Sex of the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Unknown,
    Male,
    Female,
}

impl Sex {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Sex::Unknown),
            1 => Some(Sex::Male),
            2 => Some(Sex::Female),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Sex::Unknown => 0,
            Sex::Male => 1,
            Sex::Female => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Unknown => "unknown",
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "unknown" => Ok(Sex::Unknown),
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(Error::InvalidInput(format!("Unknown sex '{}'", other))),
        }
    }
}

/// Subject data as edited in the analysis view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectEdit {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub birthday: Option<String>,
    pub sex: Option<Sex>,
    pub hand: Option<Hand>,
}

impl SubjectEdit {
    /// Encode for `PATCH /recording/{id}/subject_info`
    pub fn to_update(&self) -> Result<SubjectUpdate> {
        let birthday = match self.birthday.as_deref().filter(|b| !b.is_empty()) {
            Some(raw) => Some(epoch_millis(raw)?),
            None => None,
        };

        Ok(SubjectUpdate {
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            birthday,
            sex: self.sex.map(|s| s.code()),
            hand: self.hand.map(|h| h.code()),
        })
    }
}

/// Recording as shown in the analysis view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingAnalysis {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,

    pub channel_names: Vec<String>,
    pub highpass: Option<f64>,
    pub lowpass: Option<f64>,
    /// `YYYY-MM-DD`
    pub measure_date: Option<String>,
    pub n_times: u64,
    pub sampling_frequency: f64,
    pub created: String,

    pub subject_first_name: Option<String>,
    pub subject_last_name: Option<String>,
    pub subject_middle_name: Option<String>,
    /// `YYYY-MM-DD`
    pub subject_birthday: Option<String>,
    pub subject_hand: Option<Hand>,
    pub subject_sex: Option<Sex>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn iso_date(raw: &Option<String>) -> Result<Option<String>> {
    match raw.as_deref().filter(|r| !r.is_empty()) {
        Some(r) => Ok(Some(format_date(&parse_timestamp(r)?))),
        None => Ok(None),
    }
}

impl RecordingAnalysis {
    pub fn from_detail(detail: &RecordingDetail) -> Result<Self> {
        let info = &detail.recording_info;
        let subject = detail.subject_info.clone().unwrap_or_default();

        Ok(Self {
            id: detail.id.clone(),
            name: detail.name.clone(),
            notes: non_empty(&detail.notes),
            channel_names: info.ch_names.clone(),
            // Zero cut-offs mean "no filter" in the EDF header
            highpass: info.highpass.filter(|v| *v != 0.0),
            lowpass: info.lowpass.filter(|v| *v != 0.0),
            measure_date: iso_date(&info.meas_date)?,
            n_times: info.n_times,
            sampling_frequency: info.sfreq,
            created: format_created(&parse_timestamp(&detail.created)?),
            subject_first_name: non_empty(&subject.first_name),
            subject_last_name: non_empty(&subject.last_name),
            subject_middle_name: non_empty(&subject.middle_name),
            subject_birthday: iso_date(&subject.birthday)?,
            // Code 0 is falsy upstream, so "unknown" sex is never displayed
            subject_hand: subject.hand.filter(|c| *c != 0).and_then(Hand::from_code),
            subject_sex: subject.sex.filter(|c| *c != 0).and_then(Sex::from_code),
        })
    }

    pub fn channel_amount(&self) -> usize {
        self.channel_names.len()
    }

    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.n_times, self.sampling_frequency)
    }

    /// `"M min. S s"` style length
    pub fn duration_string(&self) -> String {
        format_duration(self.n_times, self.sampling_frequency)
    }

    /// Apply a successful name/notes update. An empty name is ignored.
    pub fn apply_update(&mut self, name: Option<&str>, notes: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(notes) = notes {
            self.notes = Some(notes.to_string());
        }
    }

    /// Apply a successful subject update
    pub fn apply_subject(&mut self, edit: &SubjectEdit) {
        self.subject_first_name = Some(edit.first_name.clone());
        self.subject_last_name = Some(edit.last_name.clone());
        self.subject_middle_name = edit.middle_name.clone();
        self.subject_birthday = edit.birthday.clone();
        self.subject_sex = edit.sex;
        self.subject_hand = edit.hand;
    }

    /// Subject rendered as `"Last First"`, the list view convention
    pub fn subject_full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.subject_last_name, &self.subject_first_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

impl From<&RecordingAnalysis> for SubjectInfo {
    fn from(analysis: &RecordingAnalysis) -> Self {
        SubjectInfo {
            first_name: analysis.subject_first_name.clone(),
            middle_name: analysis.subject_middle_name.clone(),
            last_name: analysis.subject_last_name.clone(),
            birthday: analysis.subject_birthday.clone(),
            sex: analysis.subject_sex.map(|s| s.code()),
            hand: analysis.subject_hand.map(|h| h.code()),
        }
    }
}
