use log::debug;

use crate::director::error::LabelError;
use crate::io::reader::{decode_text, ByteOrder, Cursor, TextEncoding};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLabel {
    pub frame_num: u32,
    pub label: String,
}

/// Frame labels (`VWLB`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameLabelsChunk {
    pub labels: Vec<FrameLabel>,
}

impl FrameLabelsChunk {
    /// Layout:
    ///   count (u16)
    ///   count * { frameNum (u16), labelOffset (u16) }
    ///   textLength (u32)
    ///   text block, label `i` spans `[offset_i, offset_i+1)`
    pub fn read(data: &[u8], byte_order: ByteOrder) -> Result<FrameLabelsChunk, LabelError> {
        let mut cursor = Cursor::new(data, byte_order);

        let labels_count = cursor.read_u16()? as usize;
        let label_frames = (0..labels_count)
            .map(|_| {
                let frame_num = cursor.read_u16()? as u32;
                let label_offset = cursor.read_u16()? as usize;
                Ok((frame_num, label_offset))
            })
            .collect::<Result<Vec<_>, LabelError>>()?;

        let text_length = cursor.read_u32()? as usize;
        let text = cursor.read_fixed_bytes(text_length)?;

        let mut labels = Vec::with_capacity(labels_count);
        for (index, &(frame_num, label_offset)) in label_frames.iter().enumerate() {
            let label_end = label_frames
                .get(index + 1)
                .map_or(text_length, |&(_, next)| next);
            if label_offset > label_end || label_end > text_length {
                return Err(LabelError::InvalidOffset {
                    index,
                    offset: label_offset,
                    text_length,
                });
            }
            labels.push(FrameLabel {
                frame_num,
                label: decode_text(&text[label_offset..label_end], TextEncoding::Latin1),
            });
        }

        debug!("FrameLabelsChunk: {} labels", labels.len());
        Ok(FrameLabelsChunk { labels })
    }
}
