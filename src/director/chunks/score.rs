use log::{debug, warn};
use num_traits::FromPrimitive;

use crate::director::{
    enums::{InkMode, SpriteType},
    error::ScoreError,
    movie::DecodeWarning,
};
use crate::io::reader::{ByteOrder, Cursor};

/// header_length(4) frame_count(4) frame_stride(2) channel_count(2)
pub const SCORE_HEADER_SIZE: usize = 12;

/// Blend of channels whose record has no blend byte.
pub const OPAQUE_BLEND: u8 = 100;

/// Byte layout of frame and channel records, selected by the container's
/// format-version tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreLayout {
    /// 8-byte frame header, 16-byte channels, 16-bit locations, no blend.
    Legacy,
    /// 16-byte frame header, 28-byte channels, 32-bit locations, blend and
    /// ink extension bytes.
    Extended,
}

impl ScoreLayout {
    pub fn frame_header_size(self) -> usize {
        match self {
            ScoreLayout::Legacy => 8,
            ScoreLayout::Extended => 16,
        }
    }

    pub fn channel_record_size(self) -> usize {
        match self {
            ScoreLayout::Legacy => 16,
            ScoreLayout::Extended => 28,
        }
    }

    /// Smallest frame stride that holds `channels` channel records.
    pub fn frame_stride(self, channels: u16) -> usize {
        self.frame_header_size() + channels as usize * self.channel_record_size()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreChunkHeader {
    /// Offset of the first frame record from the start of the chunk.
    pub header_length: u32,
    pub frame_count: u32,
    pub frame_stride: u16,
    pub channel_count: u16,
}

impl ScoreChunkHeader {
    pub fn read(cursor: &mut Cursor) -> Result<ScoreChunkHeader, ScoreError> {
        if cursor.remaining() < SCORE_HEADER_SIZE {
            return Err(ScoreError::Truncated {
                needed: SCORE_HEADER_SIZE,
                available: cursor.remaining(),
            });
        }
        Ok(ScoreChunkHeader {
            header_length: cursor.read_u32()?,
            frame_count: cursor.read_u32()?,
            frame_stride: cursor.read_u16()?,
            channel_count: cursor.read_u16()?,
        })
    }

    /// Reads only the header of a score chunk payload.
    pub fn peek(data: &[u8], byte_order: ByteOrder) -> Result<ScoreChunkHeader, ScoreError> {
        Self::read(&mut Cursor::new(data, byte_order))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelInfo {
    /// 1-based position of the channel in its frame.
    pub channel_num: u16,
    pub cast_lib: u16,
    pub cast_member: u16,
    pub loc_h: i16,
    pub loc_v: i16,
    pub width: u16,
    pub height: u16,
    pub ink: u8,
    /// Percentage, 0-100.
    pub blend: u8,
    pub visible: bool,
    pub sprite_type: u8,
    pub trails: bool,
    pub editable: bool,
    pub moveable: bool,
    /// Index into the sprite detail table (behaviors). Extended layout only.
    pub sprite_list_idx: u32,
}

impl ChannelInfo {
    /// Legacy channel record (16 bytes):
    ///   [0]:     spriteType (u8)
    ///   [1]:     inkFlags (u8: bits 0-5=ink, bit 6=trails, bit 7=hidden)
    ///   [2]:     castLib (u8)
    ///   [3]:     unused
    ///   [4-5]:   castMember (u16)
    ///   [6-7]:   locV (i16)
    ///   [8-9]:   locH (i16)
    ///   [10-11]: height (u16)
    ///   [12-13]: width (u16)
    ///   [14-15]: unused
    pub fn read_legacy(cursor: &mut Cursor, channel_num: u16) -> Result<ChannelInfo, ScoreError> {
        let sprite_type = cursor.read_u8()?; // byte 0
        let ink_flags = cursor.read_u8()?; // byte 1
        let cast_lib = cursor.read_u8()? as u16; // byte 2
        cursor.skip(1)?; // byte 3
        let cast_member = cursor.read_u16()?; // bytes 4-5
        let loc_v = cursor.read_i16()?; // bytes 6-7
        let loc_h = cursor.read_i16()?; // bytes 8-9
        let height = cursor.read_u16()?; // bytes 10-11
        let width = cursor.read_u16()?; // bytes 12-13
        cursor.skip(2)?; // bytes 14-15

        Ok(ChannelInfo {
            channel_num,
            cast_lib,
            cast_member,
            loc_h,
            loc_v,
            width,
            height,
            ink: ink_flags & 0x3f,
            blend: OPAQUE_BLEND,
            visible: (ink_flags & 0x80) == 0,
            sprite_type,
            trails: (ink_flags & 0x40) != 0,
            editable: false,
            moveable: false,
            sprite_list_idx: 0,
        })
    }

    /// Extended channel record (28 bytes):
    ///   [0]:     spriteType (u8)
    ///   [1]:     ink (u8: bits 0-5=ink, bit 6=trails)
    ///   [2]:     inkExt (u8: bit 0=hidden, bit 6=editable, bit 7=moveable)
    ///   [3]:     blend (u8, percent)
    ///   [4-5]:   castLib (u16)
    ///   [6-7]:   castMember (u16)
    ///   [8-11]:  locV (i32)
    ///   [12-15]: locH (i32)
    ///   [16-17]: height (u16)
    ///   [18-19]: width (u16)
    ///   [20-23]: spriteListIdx (u32)
    ///   [24-27]: unused
    pub fn read_extended(cursor: &mut Cursor, channel_num: u16) -> Result<ChannelInfo, ScoreError> {
        let sprite_type = cursor.read_u8()?;
        let raw_ink = cursor.read_u8()?;
        let ink_ext = cursor.read_u8()?;
        let blend = cursor.read_u8()?;
        let cast_lib = cursor.read_u16()?;
        let cast_member = cursor.read_u16()?;
        let loc_v = cursor.read_i32()?;
        let loc_h = cursor.read_i32()?;
        let height = cursor.read_u16()?;
        let width = cursor.read_u16()?;
        let sprite_list_idx = cursor.read_u32()?;
        cursor.skip(4)?;

        Ok(ChannelInfo {
            channel_num,
            cast_lib,
            cast_member,
            loc_h: saturate_i16(loc_h),
            loc_v: saturate_i16(loc_v),
            width,
            height,
            ink: raw_ink & 0x3f,
            blend: blend.min(OPAQUE_BLEND),
            visible: (ink_ext & 0x01) == 0,
            sprite_type,
            trails: (raw_ink & 0x40) != 0,
            editable: (ink_ext & 0x40) != 0,
            moveable: (ink_ext & 0x80) != 0,
            sprite_list_idx,
        })
    }

    pub fn read(
        cursor: &mut Cursor,
        layout: ScoreLayout,
        channel_num: u16,
    ) -> Result<ChannelInfo, ScoreError> {
        match layout {
            ScoreLayout::Legacy => Self::read_legacy(cursor, channel_num),
            ScoreLayout::Extended => Self::read_extended(cursor, channel_num),
        }
    }

    /// An empty slot: no cast member assigned.
    pub fn is_empty(&self) -> bool {
        self.cast_member == 0
    }

    pub fn ink_mode(&self) -> Option<InkMode> {
        InkMode::from_u8(self.ink)
    }

    pub fn sprite_kind(&self) -> Option<SpriteType> {
        SpriteType::from_u8(self.sprite_type)
    }
}

fn saturate_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInfo {
    /// 1-based.
    pub frame_num: u32,
    pub tempo: i8,
    pub transition_type: u8,
    pub transition_duration: u16,
    /// -1 inherits the palette of the previous frame.
    pub palette_id: i16,
    pub script_id: u32,
    pub channels: Vec<ChannelInfo>,
}

impl FrameInfo {
    pub const INHERIT_PALETTE: i16 = -1;

    /// Reads one frame record: the frame header followed by
    /// `channel_capacity` channel records. Padding up to the frame stride
    /// is left to the caller.
    pub fn read(
        cursor: &mut Cursor,
        layout: ScoreLayout,
        frame_num: u32,
        channel_capacity: u16,
    ) -> Result<FrameInfo, ScoreError> {
        let mut frame = match layout {
            // tempo(1) transType(1) transDuration(1) unused(1) palette(2) script(2)
            ScoreLayout::Legacy => {
                let tempo = cursor.read_i8()?;
                let transition_type = cursor.read_u8()?;
                let transition_duration = cursor.read_u8()? as u16;
                cursor.skip(1)?;
                let palette_id = cursor.read_i16()?;
                let script_id = cursor.read_u16()? as u32;
                FrameInfo {
                    frame_num,
                    tempo,
                    transition_type,
                    transition_duration,
                    palette_id,
                    script_id,
                    channels: Vec::with_capacity(channel_capacity as usize),
                }
            }
            // script(4) palette(2) transDuration(2) transType(1) tempo(1) unused(6)
            ScoreLayout::Extended => {
                let script_id = cursor.read_u32()?;
                let palette_id = cursor.read_i16()?;
                let transition_duration = cursor.read_u16()?;
                let transition_type = cursor.read_u8()?;
                let tempo = cursor.read_i8()?;
                cursor.skip(6)?;
                FrameInfo {
                    frame_num,
                    tempo,
                    transition_type,
                    transition_duration,
                    palette_id,
                    script_id,
                    channels: Vec::with_capacity(channel_capacity as usize),
                }
            }
        };

        // Empty channels stay in place: channels are addressed by position
        for channel_num in 1..=channel_capacity {
            frame.channels.push(ChannelInfo::read(cursor, layout, channel_num)?);
        }
        Ok(frame)
    }

    pub fn inherits_palette(&self) -> bool {
        self.palette_id == Self::INHERIT_PALETTE
    }

    /// Channel by 1-based number.
    pub fn channel(&self, channel_num: u16) -> Option<&ChannelInfo> {
        channel_num
            .checked_sub(1)
            .and_then(|idx| self.channels.get(idx as usize))
    }

    pub fn occupied_channels(&self) -> impl Iterator<Item = &ChannelInfo> + '_ {
        self.channels.iter().filter(|channel| !channel.is_empty())
    }
}

/// Decoded score: every frame that could be read in full.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreChunk {
    pub header: ScoreChunkHeader,
    pub frames: Vec<FrameInfo>,
    pub warnings: Vec<DecodeWarning>,
}

impl ScoreChunk {
    /// Decodes a score chunk payload.
    ///
    /// A frame table shorter than `frame_count * frame_stride` is not an
    /// error: the complete frames are returned with a `ScoreTruncated`
    /// warning.
    pub fn read(
        data: &[u8],
        byte_order: ByteOrder,
        layout: ScoreLayout,
        channel_capacity: u16,
    ) -> Result<ScoreChunk, ScoreError> {
        let mut cursor = Cursor::new(data, byte_order);
        let header = ScoreChunkHeader::read(&mut cursor)?;

        let header_length = header.header_length as usize;
        if header_length < SCORE_HEADER_SIZE || header_length > data.len() {
            return Err(ScoreError::InvalidHeader {
                header_length: header.header_length,
                chunk_length: data.len(),
            });
        }

        let stride = header.frame_stride as usize;
        let required = layout.frame_stride(channel_capacity);
        if stride < required {
            return Err(ScoreError::StrideTooSmall {
                stride: header.frame_stride,
                required,
                channels: channel_capacity,
            });
        }

        let available = data.len() - header_length;
        let declared = header.frame_count as usize;
        let complete = available / stride;
        let decodable = declared.min(complete);

        let mut frames = Vec::with_capacity(decodable);
        for frame_index in 0..decodable {
            cursor.seek(header_length + frame_index * stride)?;
            let frame = FrameInfo::read(
                &mut cursor,
                layout,
                frame_index as u32 + 1,
                channel_capacity,
            )?;
            frames.push(frame);
        }

        let mut warnings = vec![];
        if decodable < declared {
            let required_bytes = header.frame_count as u64 * stride as u64;
            warn!(
                "Score truncated: {} of {} frames decoded ({} of {} frame bytes present)",
                decodable, declared, available, required_bytes
            );
            warnings.push(DecodeWarning::ScoreTruncated {
                declared: header.frame_count,
                decoded: decodable as u32,
                available: available as u64,
                required: required_bytes,
            });
        }

        debug!(
            "ScoreChunk {:?}: frames={} channels={} stride={}",
            layout,
            frames.len(),
            channel_capacity,
            stride
        );

        Ok(ScoreChunk {
            header,
            frames,
            warnings,
        })
    }

    pub fn is_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, DecodeWarning::ScoreTruncated { .. }))
    }
}

pub fn decode(
    data: &[u8],
    byte_order: ByteOrder,
    layout: ScoreLayout,
    channel_capacity: u16,
) -> Result<ScoreChunk, ScoreError> {
    ScoreChunk::read(data, byte_order, layout, channel_capacity)
}
