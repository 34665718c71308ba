//! Encapsulated pixel data: an ordered sequence of opaque fragments.
//!
//! Each fragment holds one self-contained codestream. Sequences can be
//! written to and read from the DICOM encapsulated item stream
//! (basic offset table item, one item per fragment, sequence delimiter).

use std::io::{ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use dicom::core::Tag;

use crate::error::{Result, TranscodeError};

/// Item tag introducing each fragment.
pub const ITEM_START: Tag = Tag(0xFFFE, 0xE000);

/// Tag closing the fragment sequence.
pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);

/// One fragment of encapsulated pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    tag: Tag,
    data: Vec<u8>,
}

impl Fragment {
    /// Create a fragment with the given item tag.
    pub fn new(tag: Tag, data: Vec<u8>) -> Self {
        Self { tag, data }
    }

    /// Item tag of the fragment.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Payload bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the fragment carries no payload.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy the payload into the start of `dest`, returning the bytes copied.
    ///
    /// Fails when `dest` is shorter than the payload.
    pub fn copy_into(&self, dest: &mut [u8]) -> Result<usize> {
        let available = dest.len();
        let target = dest.get_mut(..self.data.len()).ok_or_else(|| {
            TranscodeError::InvalidFormat(format!(
                "destination of {} bytes cannot hold a {} byte fragment",
                available,
                self.data.len()
            ))
        })?;
        target.copy_from_slice(&self.data);
        Ok(self.data.len())
    }

    /// Copy of the payload.
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Take the payload.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Ordered list of fragments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSequence {
    item_tag: Tag,
    fragments: Vec<Fragment>,
}

impl Default for FragmentSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl FragmentSequence {
    /// Empty sequence tagging its items with [`ITEM_START`].
    pub fn new() -> Self {
        Self::with_item_tag(ITEM_START)
    }

    /// Empty sequence tagging its items with `item_tag`.
    pub fn with_item_tag(item_tag: Tag) -> Self {
        Self {
            item_tag,
            fragments: Vec::new(),
        }
    }

    /// Sequence holding the given payloads, in order.
    pub fn from_payloads<I>(item_tag: Tag, payloads: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let fragments = payloads
            .into_iter()
            .map(|data| Fragment::new(item_tag, data))
            .collect();
        Self {
            item_tag,
            fragments,
        }
    }

    /// Tag given to appended fragments.
    pub fn item_tag(&self) -> Tag {
        self.item_tag
    }

    /// Append a payload as a new fragment.
    pub fn push(&mut self, data: Vec<u8>) {
        self.fragments.push(Fragment::new(self.item_tag, data));
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the sequence has no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment at `index`.
    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    /// Iterate over fragments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Fragment> {
        self.fragments.iter()
    }

    /// All fragments.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Sum of payload lengths.
    pub fn payload_len(&self) -> usize {
        self.fragments.iter().map(Fragment::len).sum()
    }

    /// All payloads concatenated in order.
    pub fn to_contiguous(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.payload_len());
        for fragment in &self.fragments {
            buffer.extend_from_slice(fragment.data());
        }
        buffer
    }

    /// Write the DICOM item stream.
    ///
    /// Odd payloads get a trailing zero byte, as items must have even length.
    /// With `with_offset_table` the basic offset table lists the start of each
    /// fragment item; otherwise it is left empty.
    pub fn write_to<W: Write>(&self, writer: &mut W, with_offset_table: bool) -> Result<()> {
        let mut offsets = Vec::with_capacity(self.fragments.len());
        if with_offset_table {
            let mut offset = 0u64;
            for fragment in &self.fragments {
                offsets.push(u32::try_from(offset).map_err(|_| {
                    TranscodeError::InvalidFormat("offset table overflow".into())
                })?);
                offset += 8 + padded_len(fragment.len()) as u64;
            }
        }

        write_tag(writer, ITEM_START)?;
        writer.write_u32::<LittleEndian>(item_length(offsets.len() * 4)?)?;
        for offset in &offsets {
            writer.write_u32::<LittleEndian>(*offset)?;
        }

        for fragment in &self.fragments {
            let padded = padded_len(fragment.len());
            write_tag(writer, fragment.tag())?;
            writer.write_u32::<LittleEndian>(item_length(padded)?)?;
            writer.write_all(fragment.data())?;
            if padded != fragment.len() {
                writer.write_u8(0)?;
            }
        }

        write_tag(writer, SEQUENCE_DELIMITER)?;
        writer.write_u32::<LittleEndian>(0)?;
        Ok(())
    }

    /// Parse a DICOM item stream written by [`FragmentSequence::write_to`].
    ///
    /// A missing sequence delimiter at end of input is tolerated.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let first = read_tag(reader)?
            .ok_or_else(|| TranscodeError::InvalidFormat("empty fragment stream".into()))?;
        if first != ITEM_START {
            return Err(TranscodeError::InvalidFormat(format!(
                "expected basic offset table item, found {}",
                first
            )));
        }
        let table_len = read_length(reader)?;
        if table_len % 4 != 0 {
            return Err(TranscodeError::InvalidFormat(format!(
                "basic offset table length {} is not a multiple of 4",
                table_len
            )));
        }
        let mut table = vec![0u8; table_len as usize];
        reader.read_exact(&mut table).map_err(truncated)?;
        log::debug!("Basic offset table holds {} entries", table_len / 4);

        let mut sequence = FragmentSequence::new();
        while let Some(tag) = read_tag(reader)? {
            if tag == SEQUENCE_DELIMITER {
                read_length(reader)?;
                break;
            }
            if tag != ITEM_START {
                return Err(TranscodeError::InvalidFormat(format!(
                    "unexpected tag {} in fragment stream",
                    tag
                )));
            }
            let length = read_length(reader)?;
            if length % 2 != 0 {
                return Err(TranscodeError::InvalidFormat(format!(
                    "fragment {} has odd length {}",
                    sequence.len(),
                    length
                )));
            }
            let mut data = Vec::new();
            reader
                .by_ref()
                .take(u64::from(length))
                .read_to_end(&mut data)
                .map_err(truncated)?;
            if data.len() != length as usize {
                return Err(truncated(ErrorKind::UnexpectedEof.into()));
            }
            sequence.push(data);
        }

        Ok(sequence)
    }
}

impl<'a> IntoIterator for &'a FragmentSequence {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

fn padded_len(len: usize) -> usize {
    len + (len & 1)
}

fn item_length(len: usize) -> Result<u32> {
    // 0xFFFFFFFF is reserved for undefined length.
    u32::try_from(len)
        .ok()
        .filter(|&l| l != u32::MAX)
        .ok_or_else(|| TranscodeError::InvalidFormat(format!("item of {} bytes is too long", len)))
}

fn truncated(err: std::io::Error) -> TranscodeError {
    if err.kind() == ErrorKind::UnexpectedEof {
        TranscodeError::InvalidFormat("fragment stream is truncated".into())
    } else {
        TranscodeError::Io(err)
    }
}

fn write_tag<W: Write>(writer: &mut W, tag: Tag) -> Result<()> {
    writer.write_u16::<LittleEndian>(tag.0)?;
    writer.write_u16::<LittleEndian>(tag.1)?;
    Ok(())
}

fn read_length<R: Read>(reader: &mut R) -> Result<u32> {
    reader.read_u32::<LittleEndian>().map_err(truncated)
}

/// Read a tag, or `None` at a clean end of input.
fn read_tag<R: Read>(reader: &mut R) -> Result<Option<Tag>> {
    let mut first = [0u8; 1];
    loop {
        match reader.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(TranscodeError::Io(e)),
        }
    }
    let mut rest = [0u8; 3];
    reader.read_exact(&mut rest).map_err(truncated)?;
    let group = u16::from_le_bytes([first[0], rest[0]]);
    let element = u16::from_le_bytes([rest[1], rest[2]]);
    Ok(Some(Tag(group, element)))
}
