//! Signal plot paging and highlighted windows

use crate::models::{ClassificationSegment, RecordingAnalysis};
use crate::services::RecordingApi;
use eegwa_common::Result;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Length of one plot fragment served by the backend
pub const PLOT_FRAGMENT_SECONDS: u32 = 16;

/// Highlighted `(start, stop)` window in recording seconds
pub type Shape = (f64, f64);

#[derive(Debug, Default)]
struct PlotState {
    fragment_nr: u32,
    channels: Option<Vec<String>>,
    data: Option<Vec<Vec<f64>>>,
    sampling_frequency: Option<f64>,
    shapes: Vec<Shape>,
}

pub struct PlotStore {
    api: Arc<dyn RecordingApi>,
    state: RwLock<PlotState>,
}

impl PlotStore {
    pub fn new(api: Arc<dyn RecordingApi>) -> Self {
        Self {
            api,
            state: RwLock::new(PlotState::default()),
        }
    }

    pub async fn fetch_fragment(&self, recording_id: &str, nr: u32) -> Result<()> {
        let fragment = self.api.plot_fragment(recording_id, nr).await?;

        let mut state = self.state.write().await;
        state.channels = Some(fragment.ch_names);
        state.data = Some(fragment.data_array);
        state.sampling_frequency = Some(fragment.sfreq);
        Ok(())
    }

    /// Select a fragment; negative numbers are ignored
    pub async fn set_fragment_nr(&self, nr: i64) {
        if let Ok(nr) = u32::try_from(nr) {
            self.state.write().await.fragment_nr = nr;
        }
    }

    pub async fn fragment_nr(&self) -> u32 {
        self.state.read().await.fragment_nr
    }

    pub async fn set_shapes(&self, shapes: Vec<Shape>) {
        self.state.write().await.shapes = shapes;
    }

    pub async fn reset_shapes(&self) {
        self.state.write().await.shapes.clear();
    }

    /// Shapes lying entirely inside the current fragment
    pub async fn shapes_in_fragment(&self) -> Vec<Shape> {
        let state = self.state.read().await;
        let window = f64::from(PLOT_FRAGMENT_SECONDS);
        let min_x = f64::from(state.fragment_nr) * window;
        let max_x = (f64::from(state.fragment_nr) + 1.0) * window;
        state
            .shapes
            .iter()
            .copied()
            .filter(|(start, stop)| *start >= min_x && *stop <= max_x)
            .collect()
    }

    pub async fn channel_amount(&self) -> usize {
        self.state
            .read()
            .await
            .channels
            .as_ref()
            .map_or(0, |c| c.len())
    }

    pub async fn channels(&self) -> Option<Vec<String>> {
        self.state.read().await.channels.clone()
    }

    pub async fn data(&self) -> Option<Vec<Vec<f64>>> {
        self.state.read().await.data.clone()
    }

    pub async fn sampling_frequency(&self) -> Option<f64> {
        self.state.read().await.sampling_frequency
    }

    pub async fn clear(&self) {
        *self.state.write().await = PlotState::default();
    }
}

/// Index of the last fragment of a recording
pub fn max_fragment_nr(recording: &RecordingAnalysis) -> u64 {
    (recording.duration_seconds() / f64::from(PLOT_FRAGMENT_SECONDS)).floor() as u64
}

/// Windows of resolved segments at or above `min_prob` percent
pub fn segment_shapes(segments: &[ClassificationSegment], min_prob: f64) -> Vec<Shape> {
    segments
        .iter()
        .filter(|s| s.prob_value().is_some_and(|p| p >= min_prob))
        .map(|s| (s.start_time as f64, s.stop_time as f64))
        .collect()
}
