//! Decoder for RIFX movie containers and their score timeline.
//!
//! ```no_run
//! let bytes = std::fs::read("movie.dir").unwrap();
//! let movie = dirscore::decode_movie(&bytes).unwrap();
//! for frame in &movie.frames {
//!     println!("frame {}: {} sprites", frame.frame_num, frame.occupied_channels().count());
//! }
//! ```

pub mod director;
pub mod io;

pub use director::{
    chunks::{score::ScoreLayout, Chunk, ChunkDirectory},
    error::{ChunkError, ConfigError, LabelError, ParseError, ScoreError},
    file::DirectorFile,
    movie::{ChannelInfo, DecodeWarning, FrameInfo, FrameLabel, MovieConfig, MovieDocument},
};
pub use io::reader::{ByteOrder, Cursor, CursorError, TextEncoding};

/// Decodes a whole movie file. The returned document owns all of its data.
pub fn decode_movie(buffer: &[u8]) -> Result<MovieDocument, ParseError> {
    DirectorFile::read(buffer)?.to_movie()
}
