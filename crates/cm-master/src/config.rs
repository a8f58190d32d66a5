//! Remix settings, loadable from JSON.

use std::path::Path;

use cm_ir::{ChannelLayout, BLOCK_SIZE, CHANNEL_COUNT};
use serde::{Deserialize, Serialize};

use crate::RemixError;

/// Settings for a [`Remixer`](crate::Remixer).
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RemixConfig {
    /// Target layout name, e.g. `"stereo"`, `"5.1"` or `"L+R+C"`.
    pub output_layout: String,
    /// Reinterpret the source channels, e.g. `"dual-mono"` for a stereo
    /// file carrying two programs. Must have the source's channel count.
    pub input_layout: Option<String>,
    /// Frames per block handed to the converter.
    pub block_frames: usize,
    /// Largest single allocation, in samples, the converter may request.
    pub max_block_samples: Option<usize>,
}

impl Default for RemixConfig {
    fn default() -> Self {
        Self {
            output_layout: "stereo".into(),
            input_layout: None,
            block_frames: BLOCK_SIZE,
            max_block_samples: None,
        }
    }
}

impl RemixConfig {
    pub fn from_json(text: &str) -> Result<Self, RemixError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemixError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse the layout names and check the numeric limits.
    pub(crate) fn resolve(&self) -> Result<(ChannelLayout, Option<ChannelLayout>), RemixError> {
        if self.block_frames == 0 {
            return Err(RemixError::InvalidConfig("block_frames must be positive".into()));
        }
        // Blocks are sliced as block_frames * channels samples.
        if self.block_frames.checked_mul(CHANNEL_COUNT).is_none() {
            return Err(RemixError::InvalidConfig(format!(
                "block_frames {} is too large",
                self.block_frames
            )));
        }
        let output: ChannelLayout = self.output_layout.parse()?;
        if output.channel_count() == 0 {
            return Err(RemixError::InvalidConfig("output layout has no channels".into()));
        }
        let input = self
            .input_layout
            .as_deref()
            .map(str::parse::<ChannelLayout>)
            .transpose()?;
        Ok((output, input))
    }
}
