//! Error types for container, directory and score decoding.

use thiserror::Error;

use crate::io::reader::CursorError;

use super::utils::fourcc_to_string;

fn tag_name(tag: &u32) -> String {
    fourcc_to_string(*tag)
}

/// Bounds violations found while building the chunk directory.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Fewer bytes left in the parent than one chunk header needs.
    #[error("chunk header at offset {offset} needs {needed} bytes, {available} left in parent")]
    ChunkTruncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Declared payload runs past the parent's (or the buffer's) end.
    #[error("chunk {} at offset {offset} declares {declared} bytes, only {available} available", tag_name(.tag))]
    ChunkOverflow {
        tag: u32,
        offset: usize,
        declared: u32,
        available: usize,
    },

    #[error("chunk nesting deeper than {max} at offset {offset}")]
    TooDeep { offset: usize, max: u16 },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// The score chunk is too short for its fixed header.
    #[error("score header needs {needed} bytes, chunk has {available}")]
    Truncated { needed: usize, available: usize },

    #[error("score header length {header_length} invalid for chunk of {chunk_length} bytes")]
    InvalidHeader {
        header_length: u32,
        chunk_length: usize,
    },

    #[error("frame stride {stride} smaller than the {required} bytes {channels} channels need")]
    StrideTooSmall {
        stride: u16,
        required: usize,
        channels: u16,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("config chunk needs {needed} bytes, has {available}")]
    Truncated { needed: usize, available: usize },

    #[error("stage rect ({left}, {top}, {right}, {bottom}) has negative size")]
    InvalidStageRect {
        left: i16,
        top: i16,
        right: i16,
        bottom: i16,
    },

    #[error("config declares zero channels")]
    InvalidChannelCount,

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LabelError {
    #[error("label {index} offset {offset} outside text block of {text_length} bytes")]
    InvalidOffset {
        index: usize,
        offset: usize,
        text_length: usize,
    },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Fatal decode failure. No document is produced alongside one of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unrecognized container magic {magic:02x?}")]
    UnrecognizedFormat { magic: [u8; 4] },

    #[error("unsupported format version {}", tag_name(.tag))]
    UnsupportedVersion { tag: u32 },

    /// A read past the end of the buffer while parsing the envelope header.
    #[error("truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("seek to {target} outside buffer of length {length}")]
    OutOfBounds { target: i64, length: usize },

    #[error("invalid chunk structure: {0}")]
    Chunk(#[from] ChunkError),

    #[error("movie has no score chunk")]
    MissingScoreChunk,

    #[error("invalid score: {0}")]
    Score(#[from] ScoreError),

    #[error("invalid movie config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid frame labels: {0}")]
    Labels(#[from] LabelError),
}

impl From<CursorError> for ParseError {
    fn from(err: CursorError) -> Self {
        match err {
            CursorError::Truncated {
                offset,
                needed,
                available,
            } => ParseError::Truncated {
                offset,
                needed,
                available,
            },
            CursorError::OutOfBounds { target, length } => {
                ParseError::OutOfBounds { target, length }
            }
        }
    }
}
