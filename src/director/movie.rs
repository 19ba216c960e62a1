use itertools::Itertools;

use crate::io::reader::ByteOrder;

use super::chunks::{config::ConfigChunk, score::ScoreLayout};
use super::utils::fourcc_to_string;

pub use super::chunks::{
    labels::FrameLabel,
    score::{ChannelInfo, FrameInfo},
};

pub const DEFAULT_STAGE_WIDTH: u16 = 640;
pub const DEFAULT_STAGE_HEIGHT: u16 = 480;
pub const DEFAULT_FRAME_RATE: u8 = 15;

/// Movie-wide settings gathered from the envelope, `VWCF` and the score
/// header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovieConfig {
    pub stage_width: u16,
    pub stage_height: u16,
    pub frame_rate: u8,
    /// Raw format-version tag (`MV93`, `MV97`).
    pub version: u32,
    /// Frame count declared by the score, even when fewer frames decoded.
    pub frame_count: u32,
    /// Channels per frame.
    pub channel_count: u16,
    pub byte_order: ByteOrder,
    pub layout: ScoreLayout,
    pub stage_left: i16,
    pub stage_top: i16,
    pub director_version: u16,
    pub stage_color: u8,
}

impl Default for MovieConfig {
    fn default() -> Self {
        MovieConfig {
            stage_width: DEFAULT_STAGE_WIDTH,
            stage_height: DEFAULT_STAGE_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
            version: 0,
            frame_count: 0,
            channel_count: 0,
            byte_order: ByteOrder::BigEndian,
            layout: ScoreLayout::Legacy,
            stage_left: 0,
            stage_top: 0,
            director_version: 0,
            stage_color: 0,
        }
    }
}

impl MovieConfig {
    pub fn apply_config_chunk(&mut self, config: &ConfigChunk) {
        self.stage_width = config.stage_width();
        self.stage_height = config.stage_height();
        self.stage_left = config.stage_left;
        self.stage_top = config.stage_top;
        self.frame_rate = config.frame_rate;
        self.channel_count = config.channel_count;
        self.director_version = config.director_version;
        self.stage_color = config.stage_color;
    }

    pub fn version_name(&self) -> String {
        fourcc_to_string(self.version)
    }
}

/// Non-fatal condition met while decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeWarning {
    /// The frame table held fewer bytes than `frame_count * frame_stride`.
    ScoreTruncated {
        declared: u32,
        decoded: u32,
        available: u64,
        required: u64,
    },
    /// A top-level chunk tag this decoder does not know. Skipped.
    UnknownChunk { tag: u32, offset: u32 },
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeWarning::ScoreTruncated {
                declared,
                decoded,
                available,
                required,
            } => write!(
                f,
                "score truncated: decoded {} of {} frames ({} of {} bytes)",
                decoded, declared, available, required
            ),
            DecodeWarning::UnknownChunk { tag, offset } => write!(
                f,
                "unknown chunk {} at offset {}",
                fourcc_to_string(*tag),
                offset
            ),
        }
    }
}

/// Owned result of decoding one movie file.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieDocument {
    pub config: MovieConfig,
    pub frames: Vec<FrameInfo>,
    pub labels: Vec<FrameLabel>,
    pub warnings: Vec<DecodeWarning>,
}

impl MovieDocument {
    /// Frame by 1-based number.
    pub fn frame(&self, frame_num: u32) -> Option<&FrameInfo> {
        frame_num
            .checked_sub(1)
            .and_then(|idx| self.frames.get(idx as usize))
    }

    /// Frame number of the first label matching `name`, ignoring case.
    pub fn label_frame(&self, name: &str) -> Option<u32> {
        self.labels
            .iter()
            .find(|label| label.label.eq_ignore_ascii_case(name))
            .map(|label| label.frame_num)
    }

    /// Label names sorted by frame.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels
            .iter()
            .sorted_by_key(|label| label.frame_num)
            .map(|label| label.label.as_str())
            .collect_vec()
    }

    pub fn is_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, DecodeWarning::ScoreTruncated { .. }))
    }

    /// Every cast member referenced by a non-empty channel, as
    /// `(cast_lib, cast_member)`, in first-use order.
    pub fn referenced_members(&self) -> Vec<(u16, u16)> {
        self.frames
            .iter()
            .flat_map(|frame| frame.occupied_channels())
            .map(|channel| (channel.cast_lib, channel.cast_member))
            .unique()
            .collect_vec()
    }
}
