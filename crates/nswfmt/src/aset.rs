//! The asset section (`ASET`) appended to homebrew executables: an icon, a NACP control record
//! and a romfs image, located through a small offset table.

use binrw::{BinRead, BinWrite};
use easyerr::{Error, ResultExt};
use std::io::Cursor;

/// Magic at the start of an asset section.
pub const MAGIC: [u8; 4] = *b"ASET";

/// Size of the magic, the reserved word and the entry table. The first payload starts here.
pub const TABLE_SIZE: u64 = 0x38;

/// The payloads an asset section can carry, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum PayloadKind {
    Icon,
    Nacp,
    Romfs,
}

/// Location of a payload within the asset section.
#[derive(Debug, Clone, Copy, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Entry {
    /// Offset of the payload from the start of the section. Zero if the payload is empty.
    pub offset: u64,
    /// Size of the payload. Zero if the payload is empty.
    pub size: u64,
}

/// The header of an asset section.
#[derive(Debug, Clone, BinRead, BinWrite)]
#[brw(little, magic = b"ASET")]
pub struct Header {
    #[brw(pad_before = 0x4)]
    pub icon: Entry,
    pub nacp: Entry,
    pub romfs: Entry,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("asset section is shorter than its own entry table")]
    Table { source: binrw::Error },
    #[error("{kind} payload ({size} bytes at offset {offset:#x}) is out of bounds")]
    Payload {
        kind: PayloadKind,
        offset: u64,
        size: u64,
    },
}

/// An asset section, with its payloads already sliced out of the table.
///
/// All three payloads are opaque to this crate; [`crate::nacp`] interprets the control record
/// when the caller wants to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Aset {
    pub icon: Vec<u8>,
    pub nacp: Vec<u8>,
    pub romfs: Vec<u8>,
}

impl Aset {
    /// Parses an asset section out of `data`, which must span from the section magic to the end
    /// of the file.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let header = Header::read(&mut Cursor::new(data)).context(ParseCtx::Table)?;

        Ok(Self {
            icon: payload(data, PayloadKind::Icon, header.icon)?,
            nacp: payload(data, PayloadKind::Nacp, header.nacp)?,
            romfs: payload(data, PayloadKind::Romfs, header.romfs)?,
        })
    }

    /// Serializes the section: entry table first, then the non-empty payloads in table order.
    ///
    /// Empty payloads get a fully zeroed entry and reserve no bytes, which is how readers tell
    /// an absent payload apart from a present one.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut cursor = TABLE_SIZE;
        let mut entry = |payload: &[u8]| {
            if payload.is_empty() {
                return Entry::default();
            }

            let entry = Entry {
                offset: cursor,
                size: payload.len() as u64,
            };
            cursor += entry.size;
            entry
        };

        let header = Header {
            icon: entry(&self.icon),
            nacp: entry(&self.nacp),
            romfs: entry(&self.romfs),
        };

        let capacity = cursor as usize;
        let mut out = Cursor::new(Vec::with_capacity(capacity));
        header.write(&mut out).unwrap();

        let mut out = out.into_inner();
        out.extend_from_slice(&self.icon);
        out.extend_from_slice(&self.nacp);
        out.extend_from_slice(&self.romfs);
        out
    }
}

fn payload(data: &[u8], kind: PayloadKind, entry: Entry) -> Result<Vec<u8>, ParseError> {
    if entry.size == 0 {
        return Ok(Vec::new());
    }

    match entry.offset.checked_add(entry.size) {
        Some(end) if end <= data.len() as u64 => {
            Ok(data[entry.offset as usize..end as usize].to_vec())
        }
        _ => Err(ParseError::Payload {
            kind,
            offset: entry.offset,
            size: entry.size,
        }),
    }
}
