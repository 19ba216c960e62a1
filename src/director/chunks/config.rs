use log::debug;

use crate::director::error::ConfigError;
use crate::io::reader::{ByteOrder, Cursor};

pub const CONFIG_CHUNK_SIZE: usize = 18;

/// Movie configuration (`VWCF`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigChunk {
    pub config_length: u16,
    pub file_version: u16,
    pub stage_top: i16,
    pub stage_left: i16,
    pub stage_bottom: i16,
    pub stage_right: i16,
    pub channel_count: u16,
    pub frame_rate: u8,
    pub stage_color: u8,
    pub director_version: u16,
}

impl ConfigChunk {
    /// Layout:
    ///   [0-1]:   configLength (u16)
    ///   [2-3]:   fileVersion (u16)
    ///   [4-11]:  stage rect top, left, bottom, right (i16 each)
    ///   [12-13]: channelCount (u16)
    ///   [14]:    frameRate (u8)
    ///   [15]:    stageColor (u8, palette index)
    ///   [16-17]: directorVersion (u16)
    pub fn read(data: &[u8], byte_order: ByteOrder) -> Result<ConfigChunk, ConfigError> {
        if data.len() < CONFIG_CHUNK_SIZE {
            return Err(ConfigError::Truncated {
                needed: CONFIG_CHUNK_SIZE,
                available: data.len(),
            });
        }

        let mut cursor = Cursor::new(data, byte_order);
        let config = ConfigChunk {
            config_length: cursor.read_u16()?,
            file_version: cursor.read_u16()?,
            stage_top: cursor.read_i16()?,
            stage_left: cursor.read_i16()?,
            stage_bottom: cursor.read_i16()?,
            stage_right: cursor.read_i16()?,
            channel_count: cursor.read_u16()?,
            frame_rate: cursor.read_u8()?,
            stage_color: cursor.read_u8()?,
            director_version: cursor.read_u16()?,
        };

        if config.stage_right < config.stage_left || config.stage_bottom < config.stage_top {
            return Err(ConfigError::InvalidStageRect {
                left: config.stage_left,
                top: config.stage_top,
                right: config.stage_right,
                bottom: config.stage_bottom,
            });
        }
        if config.channel_count == 0 {
            return Err(ConfigError::InvalidChannelCount);
        }

        debug!(
            "ConfigChunk: stage {}x{} @ {}fps, {} channels, director version {:#06x}",
            config.stage_width(),
            config.stage_height(),
            config.frame_rate,
            config.channel_count,
            config.director_version
        );
        Ok(config)
    }

    pub fn stage_width(&self) -> u16 {
        (self.stage_right as i32 - self.stage_left as i32) as u16
    }

    pub fn stage_height(&self) -> u16 {
        (self.stage_bottom as i32 - self.stage_top as i32) as u16
    }
}
