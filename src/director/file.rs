use log::{debug, warn};

use crate::io::reader::Cursor;

use super::{
    chunks::{
        config::ConfigChunk,
        is_container_tag,
        labels::FrameLabelsChunk,
        score::{self, ScoreChunkHeader},
        Chunk, ChunkDirectory,
    },
    error::ParseError,
    movie::{DecodeWarning, MovieConfig, MovieDocument},
    rifx::RifxHeader,
    utils::{fourcc_to_string, hex_preview, FOURCC},
};

pub const SCORE_TAG: u32 = FOURCC("VWSC");
pub const CONFIG_TAG: u32 = FOURCC("VWCF");
pub const LABELS_TAG: u32 = FOURCC("VWLB");

/// Top-level tags that are expected in a movie file. Only the score,
/// config and labels are decoded; the rest are skipped silently.
pub const KNOWN_TAGS: [u32; 30] = [
    SCORE_TAG,
    CONFIG_TAG,
    LABELS_TAG,
    FOURCC("imap"),
    FOURCC("mmap"),
    FOURCC("KEY*"),
    FOURCC("CAS*"),
    FOURCC("CASt"),
    FOURCC("MCsL"),
    FOURCC("Cinf"),
    FOURCC("Lctx"),
    FOURCC("LctX"),
    FOURCC("Lnam"),
    FOURCC("Lscr"),
    FOURCC("VWFI"),
    FOURCC("VWFM"),
    FOURCC("VWtc"),
    FOURCC("VWtk"),
    FOURCC("Sord"),
    FOURCC("SCRF"),
    FOURCC("DRCF"),
    FOURCC("BITD"),
    FOURCC("CLUT"),
    FOURCC("STXT"),
    FOURCC("snd "),
    FOURCC("sndH"),
    FOURCC("sndS"),
    FOURCC("THUM"),
    FOURCC("free"),
    FOURCC("junk"),
];

pub fn is_known_tag(tag: u32) -> bool {
    KNOWN_TAGS.contains(&tag) || is_container_tag(tag)
}

/// A movie file with its envelope validated and its chunks indexed.
/// Borrows the source buffer; everything decoded from it is owned.
pub struct DirectorFile<'a> {
    buffer: &'a [u8],
    pub header: RifxHeader,
    pub directory: ChunkDirectory,
}

impl<'a> DirectorFile<'a> {
    pub fn read(buffer: &'a [u8]) -> Result<DirectorFile<'a>, ParseError> {
        let header = RifxHeader::read(buffer)?;
        let body = header.body_range();

        let mut cursor = Cursor::new(buffer, header.byte_order);
        let directory = ChunkDirectory::build(&mut cursor, body.start, body.len())?;
        debug!(
            "DirectorFile: {} chunks ({} top-level)",
            directory.len(),
            directory.top_level().count()
        );

        Ok(DirectorFile {
            buffer,
            header,
            directory,
        })
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Payload of the first chunk with `tag`.
    pub fn get_chunk(&self, tag: u32) -> Option<&'a [u8]> {
        self.directory
            .get(tag)
            .map(|chunk| self.chunk_payload(chunk))
    }

    pub fn get_all_chunks(&self, tag: u32) -> Vec<&'a [u8]> {
        self.directory
            .get_all(tag)
            .map(|chunk| self.chunk_payload(chunk))
            .collect()
    }

    fn chunk_payload(&self, chunk: &Chunk) -> &'a [u8] {
        self.directory.payload(chunk, self.buffer)
    }

    /// One warning per top-level chunk whose tag is not in `KNOWN_TAGS`.
    pub fn unknown_chunks(&self) -> Vec<DecodeWarning> {
        self.directory
            .top_level()
            .filter(|chunk| !is_known_tag(chunk.tag))
            .map(|chunk| {
                warn!(
                    "Skipping unknown chunk {} at offset {} [{}]",
                    fourcc_to_string(chunk.tag),
                    chunk.absolute_offset,
                    hex_preview(self.chunk_payload(chunk), 16)
                );
                DecodeWarning::UnknownChunk {
                    tag: chunk.tag,
                    offset: chunk.absolute_offset,
                }
            })
            .collect()
    }

    pub fn read_config(&self) -> Result<Option<ConfigChunk>, ParseError> {
        self.get_chunk(CONFIG_TAG)
            .map(|data| ConfigChunk::read(data, self.header.byte_order))
            .transpose()
            .map_err(ParseError::from)
    }

    pub fn read_labels(&self) -> Result<Option<FrameLabelsChunk>, ParseError> {
        self.get_chunk(LABELS_TAG)
            .map(|data| FrameLabelsChunk::read(data, self.header.byte_order))
            .transpose()
            .map_err(ParseError::from)
    }

    /// Decodes the score, config and labels into an owned document.
    pub fn to_movie(&self) -> Result<MovieDocument, ParseError> {
        let byte_order = self.header.byte_order;
        let layout = self.header.layout;
        let score_data = self
            .get_chunk(SCORE_TAG)
            .ok_or(ParseError::MissingScoreChunk)?;

        let mut config = MovieConfig {
            version: self.header.format,
            byte_order,
            layout,
            ..MovieConfig::default()
        };
        match self.read_config()? {
            Some(config_chunk) => config.apply_config_chunk(&config_chunk),
            None => {
                // Without a config the score header gives the channel count
                let score_header = ScoreChunkHeader::peek(score_data, byte_order)?;
                config.channel_count = score_header.channel_count;
            }
        }

        let score = score::decode(score_data, byte_order, layout, config.channel_count)?;
        config.frame_count = score.header.frame_count;

        let labels = self
            .read_labels()?
            .map(|chunk| chunk.labels)
            .unwrap_or_default();

        let mut warnings = self.unknown_chunks();
        warnings.extend(score.warnings);

        Ok(MovieDocument {
            config,
            frames: score.frames,
            labels,
            warnings,
        })
    }
}
