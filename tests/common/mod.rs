#![allow(dead_code)]

use dirscore::{ByteOrder, ScoreLayout};

/// Writes integers in a fixed byte order.
#[derive(Clone)]
pub struct Writer {
    pub order: ByteOrder,
    pub out: Vec<u8>,
}

impl Writer {
    pub fn new(order: ByteOrder) -> Self {
        Writer { order, out: vec![] }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.out.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        let bytes = match self.order {
            ByteOrder::BigEndian => v.to_be_bytes(),
            ByteOrder::LittleEndian => v.to_le_bytes(),
        };
        self.out.extend_from_slice(&bytes);
        self
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.u16(v as u16)
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        let bytes = match self.order {
            ByteOrder::BigEndian => v.to_be_bytes(),
            ByteOrder::LittleEndian => v.to_le_bytes(),
        };
        self.out.extend_from_slice(&bytes);
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.u32(v as u32)
    }

    /// Tag as stored on disk: reversed in little-endian files.
    pub fn tag(&mut self, tag: &[u8; 4]) -> &mut Self {
        match self.order {
            ByteOrder::BigEndian => self.out.extend_from_slice(tag),
            ByteOrder::LittleEndian => self.out.extend(tag.iter().rev()),
        }
        self
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.out.extend_from_slice(data);
        self
    }

    pub fn zeros(&mut self, n: usize) -> &mut Self {
        self.out.resize(self.out.len() + n, 0);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct Sprite {
    pub cast_lib: u16,
    pub cast_member: u16,
    pub loc_h: i16,
    pub loc_v: i16,
    pub width: u16,
    pub height: u16,
    pub ink: u8,
    pub blend: u8,
    pub hidden: bool,
    pub sprite_type: u8,
}

#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub tempo: i8,
    pub transition_type: u8,
    pub transition_duration: u8,
    pub palette_id: i16,
    pub script_id: u16,
    pub sprites: Vec<Sprite>,
}

fn write_frame(w: &mut Writer, layout: ScoreLayout, frame: &Frame, channels: u16, stride: usize) {
    let start = w.out.len();
    match layout {
        ScoreLayout::Legacy => {
            w.u8(frame.tempo as u8)
                .u8(frame.transition_type)
                .u8(frame.transition_duration)
                .u8(0)
                .i16(frame.palette_id)
                .u16(frame.script_id);
        }
        ScoreLayout::Extended => {
            w.u32(frame.script_id as u32)
                .i16(frame.palette_id)
                .u16(frame.transition_duration as u16)
                .u8(frame.transition_type)
                .u8(frame.tempo as u8)
                .zeros(6);
        }
    }
    for idx in 0..channels as usize {
        let sprite = frame.sprites.get(idx).cloned().unwrap_or_default();
        match layout {
            ScoreLayout::Legacy => {
                let flags = (sprite.ink & 0x3f) | if sprite.hidden { 0x80 } else { 0 };
                w.u8(sprite.sprite_type)
                    .u8(flags)
                    .u8(sprite.cast_lib as u8)
                    .u8(0)
                    .u16(sprite.cast_member)
                    .i16(sprite.loc_v)
                    .i16(sprite.loc_h)
                    .u16(sprite.height)
                    .u16(sprite.width)
                    .zeros(2);
            }
            ScoreLayout::Extended => {
                w.u8(sprite.sprite_type)
                    .u8(sprite.ink & 0x3f)
                    .u8(if sprite.hidden { 1 } else { 0 })
                    .u8(sprite.blend)
                    .u16(sprite.cast_lib)
                    .u16(sprite.cast_member)
                    .i32(sprite.loc_v as i32)
                    .i32(sprite.loc_h as i32)
                    .u16(sprite.height)
                    .u16(sprite.width)
                    .u32(0)
                    .zeros(4);
            }
        }
    }
    let written = w.out.len() - start;
    w.zeros(stride - written);
}

/// Builds a movie file around a score in either byte order and layout.
#[derive(Clone)]
pub struct MovieBuilder {
    pub order: ByteOrder,
    pub layout: ScoreLayout,
    pub channels: u16,
    pub stride_padding: usize,
    pub frames: Vec<Frame>,
    /// Overrides the frame count written in the score header.
    pub declared_frames: Option<u32>,
    /// Bytes cut from the end of the score payload.
    pub score_cut: usize,
    /// `(top, left, bottom, right, channels, fps)`
    pub config: Option<(i16, i16, i16, i16, u16, u8)>,
    pub labels: Vec<(u16, String)>,
    /// Extra chunks placed before the score, written verbatim.
    pub extra_chunks: Vec<([u8; 4], Vec<u8>)>,
    pub wrap_score_in_list: bool,
}

impl MovieBuilder {
    pub fn new(order: ByteOrder, layout: ScoreLayout, channels: u16) -> Self {
        MovieBuilder {
            order,
            layout,
            channels,
            stride_padding: 0,
            frames: vec![],
            declared_frames: None,
            score_cut: 0,
            config: None,
            labels: vec![],
            extra_chunks: vec![],
            wrap_score_in_list: false,
        }
    }

    pub fn stride(&self) -> usize {
        self.layout.frame_stride(self.channels) + self.stride_padding
    }

    pub fn score_payload(&self) -> Vec<u8> {
        let stride = self.stride();
        let mut w = Writer::new(self.order);
        w.u32(12)
            .u32(self.declared_frames.unwrap_or(self.frames.len() as u32))
            .u16(stride as u16)
            .u16(self.channels);
        for frame in &self.frames {
            write_frame(&mut w, self.layout, frame, self.channels, stride);
        }
        let keep = w.out.len() - self.score_cut;
        w.out.truncate(keep);
        w.out
    }

    fn config_payload(
        &self,
        (top, left, bottom, right, channels, fps): (i16, i16, i16, i16, u16, u8),
    ) -> Vec<u8> {
        let mut w = Writer::new(self.order);
        w.u16(18)
            .u16(0x045D)
            .i16(top)
            .i16(left)
            .i16(bottom)
            .i16(right)
            .u16(channels)
            .u8(fps)
            .u8(0)
            .u16(0x04C7);
        w.out
    }

    fn labels_payload(&self) -> Vec<u8> {
        let mut w = Writer::new(self.order);
        w.u16(self.labels.len() as u16);
        let mut offset = 0u16;
        for (frame, label) in &self.labels {
            w.u16(*frame).u16(offset);
            offset += label.len() as u16;
        }
        w.u32(offset as u32);
        for (_, label) in &self.labels {
            w.bytes(label.as_bytes());
        }
        w.out
    }

    pub fn chunk(&self, tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut w = Writer::new(self.order);
        w.tag(tag).u32(payload.len() as u32).bytes(payload);
        if payload.len() % 2 == 1 {
            w.u8(0);
        }
        w.out
    }

    pub fn body(&self) -> Vec<u8> {
        let mut body = vec![];
        if let Some(config) = self.config {
            body.extend(self.chunk(b"VWCF", &self.config_payload(config)));
        }
        for (tag, payload) in &self.extra_chunks {
            body.extend(self.chunk(tag, payload));
        }
        let score = self.chunk(b"VWSC", &self.score_payload());
        if self.wrap_score_in_list {
            body.extend(self.chunk(b"LIST", &score));
        } else {
            body.extend(score);
        }
        if !self.labels.is_empty() {
            body.extend(self.chunk(b"VWLB", &self.labels_payload()));
        }
        body
    }

    pub fn build(&self) -> Vec<u8> {
        let body = self.body();
        let magic = match self.order {
            ByteOrder::BigEndian => b"RIFX",
            ByteOrder::LittleEndian => b"XFIR",
        };
        let format = match self.layout {
            ScoreLayout::Legacy => b"MV93",
            ScoreLayout::Extended => b"MV97",
        };
        let mut w = Writer::new(self.order);
        w.bytes(magic)
            .u32(body.len() as u32 + 4)
            .tag(format)
            .bytes(&body);
        w.out
    }
}

pub fn sprite(cast_member: u16, loc_h: i16, loc_v: i16) -> Sprite {
    Sprite {
        cast_lib: 1,
        cast_member,
        loc_h,
        loc_v,
        width: 32,
        height: 24,
        ink: 8,
        blend: 100,
        hidden: false,
        sprite_type: 1,
    }
}
