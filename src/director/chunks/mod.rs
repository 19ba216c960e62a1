pub mod config;
pub mod labels;
pub mod score;

use fxhash::FxHashMap;
use log::trace;

use crate::io::reader::Cursor;

use super::{
    error::ChunkError,
    utils::{fourcc_to_string, FOURCC},
};

/// Tag + declared size.
pub const CHUNK_HEADER_SIZE: usize = 8;
/// Chunk payloads are padded to even offsets.
pub const CHUNK_ALIGNMENT: usize = 2;
pub const MAX_CHUNK_DEPTH: u16 = 32;

/// Chunks whose payload is itself a sequence of chunks.
pub const CONTAINER_TAGS: [u32; 2] = [FOURCC("LIST"), FOURCC("RIFX")];

pub fn is_container_tag(tag: u32) -> bool {
    CONTAINER_TAGS.contains(&tag)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub tag: u32,
    pub absolute_offset: u32,
    pub declared_size: u32,
    pub payload_offset: u32,
    /// Arena index of the enclosing container chunk, if nested.
    pub parent: Option<usize>,
    pub depth: u16,
}

impl Chunk {
    pub fn payload_range(&self) -> std::ops::Range<usize> {
        let start = self.payload_offset as usize;
        start..start + self.declared_size as usize
    }

    pub fn tag_name(&self) -> String {
        fourcc_to_string(self.tag)
    }
}

/// Flat index over every chunk in a file, nested ones included.
///
/// Chunks live in an arena in discovery order; the lookup maps a tag to
/// the arena positions of every chunk carrying it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkDirectory {
    chunks: Vec<Chunk>,
    lookup: FxHashMap<u32, Vec<usize>>,
}

impl ChunkDirectory {
    /// Walks `[root_offset, root_offset + root_size)` and every container
    /// chunk inside it.
    pub fn build(
        cursor: &mut Cursor,
        root_offset: usize,
        root_size: usize,
    ) -> Result<ChunkDirectory, ChunkError> {
        let root_end = root_offset
            .checked_add(root_size)
            .filter(|&end| end <= cursor.len());
        let root_end = match root_end {
            Some(end) => end,
            None => {
                return Err(ChunkError::ChunkOverflow {
                    tag: 0,
                    offset: root_offset,
                    declared: root_size as u32,
                    available: cursor.len().saturating_sub(root_offset),
                })
            }
        };

        let mut directory = ChunkDirectory::default();
        directory.walk(cursor, root_offset, root_end, None, 0)?;
        Ok(directory)
    }

    fn walk(
        &mut self,
        cursor: &mut Cursor,
        start: usize,
        end: usize,
        parent: Option<usize>,
        depth: u16,
    ) -> Result<(), ChunkError> {
        if depth > MAX_CHUNK_DEPTH {
            return Err(ChunkError::TooDeep {
                offset: start,
                max: MAX_CHUNK_DEPTH,
            });
        }

        cursor.seek(start)?;
        while cursor.position() < end {
            let offset = cursor.position();
            let available = end - offset;
            if available < CHUNK_HEADER_SIZE {
                return Err(ChunkError::ChunkTruncated {
                    offset,
                    needed: CHUNK_HEADER_SIZE,
                    available,
                });
            }

            let tag = cursor.read_fourcc()?;
            let declared_size = cursor.read_u32()?;
            let payload_offset = offset + CHUNK_HEADER_SIZE;
            let payload_available = end - payload_offset;
            if declared_size as usize > payload_available {
                return Err(ChunkError::ChunkOverflow {
                    tag,
                    offset,
                    declared: declared_size,
                    available: payload_available,
                });
            }

            let index = self.insert(Chunk {
                tag,
                absolute_offset: offset as u32,
                declared_size,
                payload_offset: payload_offset as u32,
                parent,
                depth,
            });
            trace!(
                "chunk #{} {} at {} size {} depth {}",
                index,
                fourcc_to_string(tag),
                offset,
                declared_size,
                depth
            );

            let payload_end = payload_offset + declared_size as usize;
            if is_container_tag(tag) {
                self.walk(cursor, payload_offset, payload_end, Some(index), depth + 1)?;
            }

            // A trailing pad byte may sit past the parent end
            let padding = (CHUNK_ALIGNMENT - payload_end % CHUNK_ALIGNMENT) % CHUNK_ALIGNMENT;
            cursor.seek((payload_end + padding).min(end))?;
        }
        Ok(())
    }

    fn insert(&mut self, chunk: Chunk) -> usize {
        let index = self.chunks.len();
        self.lookup.entry(chunk.tag).or_insert_with(Vec::new).push(index);
        self.chunks.push(chunk);
        index
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// First chunk with `tag` in discovery order.
    #[inline]
    pub fn get(&self, tag: u32) -> Option<&Chunk> {
        self.lookup
            .get(&tag)
            .and_then(|positions| positions.first())
            .map(|&idx| &self.chunks[idx])
    }

    pub fn get_all(&self, tag: u32) -> impl Iterator<Item = &Chunk> + '_ {
        self.lookup
            .get(&tag)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.chunks[idx])
    }

    pub fn count(&self, tag: u32) -> usize {
        self.lookup.get(&tag).map_or(0, |positions| positions.len())
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks
            .iter()
            .filter(move |chunk| chunk.parent == Some(index))
    }

    pub fn top_level(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().filter(|chunk| chunk.parent.is_none())
    }

    /// Payload bytes of `chunk` inside the buffer the directory was built from.
    pub fn payload<'a>(&self, chunk: &Chunk, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[chunk.payload_range()]
    }
}
