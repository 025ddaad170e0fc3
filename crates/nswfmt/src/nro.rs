//! A `.nro` file is the executable format used by homebrew on the Switch: a relocatable image,
//! optionally followed by an asset section holding an icon, a NACP record and a romfs.

use crate::aset::{self, Aset};
use binrw::BinRead;
use easyerr::{Error, ResultExt};
use std::{io::Cursor, path::Path};

/// Offset of the header within the image. The bytes before it are the entrypoint shim and the
/// module header offset, which this crate treats as opaque.
pub const HEADER_OFFSET: u64 = 0x10;

/// A segment of the executable image.
#[derive(Debug, Clone, Copy, BinRead)]
#[br(little)]
pub struct Segment {
    /// Offset of the segment into the image.
    pub offset: u32,
    /// Size of the segment.
    pub size: u32,
}

/// The header of a .nro file, located at [`HEADER_OFFSET`].
///
/// Read-only: the image is never edited, so the header is never written back.
#[derive(Debug, Clone, BinRead)]
#[br(little, magic = b"NRO0")]
pub struct Header {
    pub version: u32,
    /// Size of the executable image. The asset section, if any, starts here.
    pub size: u32,
    pub flags: u32,
    pub text: Segment,
    pub ro: Segment,
    pub data: Segment,
    /// Size of the bss segment.
    pub bss_size: u32,
    /// Build id of the module.
    #[br(pad_before = 0x4)]
    pub module_id: [u8; 0x20],
    pub dso_handle_offset: u32,
    #[br(pad_before = 0x4)]
    pub api_info: Segment,
    pub dynstr: Segment,
    pub dynsym: Segment,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("buffer does not contain a valid NRO header")]
    Header { source: binrw::Error },
    #[error(transparent)]
    Asset { source: aset::ParseError },
}

#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Io { source: std::io::Error },
    #[error(transparent)]
    Parse { source: ParseError },
}

/// A .nro executable, split into its image and optional asset section.
#[derive(Debug, Clone)]
pub struct Nro {
    /// Parsed copy of the header. The image below already contains its bytes.
    pub header: Header,
    /// The executable image, kept byte-exact.
    pub image: Vec<u8>,
    /// The asset section appended to the image, if any.
    pub asset: Option<Aset>,
}

impl Nro {
    /// Parses a whole `.nro` file.
    ///
    /// An asset section is recognized only if the file extends past the image size in the
    /// header and the section magic sits right at that boundary. Anything else trailing the
    /// image is kept as part of it.
    pub fn parse(raw: &[u8]) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(raw);
        cursor.set_position(HEADER_OFFSET);
        let header = Header::read(&mut cursor).context(ParseCtx::Header)?;

        let size = header.size as usize;
        let has_asset =
            raw.len() as u64 > u64::from(header.size) + 4 && raw[size..size + 4] == aset::MAGIC;

        let (image, asset) = if has_asset {
            let asset = Aset::parse(&raw[size..]).context(ParseCtx::Asset)?;
            (raw[..size].to_vec(), Some(asset))
        } else {
            (raw.to_vec(), None)
        };

        Ok(Self {
            header,
            image,
            asset,
        })
    }

    /// Reassembles the file: the image verbatim, then the asset section if there is one.
    ///
    /// The size field in the header keeps pointing at the section boundary because the image
    /// is never mutated.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.image.clone();
        if let Some(asset) = &self.asset {
            out.extend_from_slice(&asset.to_bytes());
        }
        out
    }

    /// Reads and parses the file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let raw = std::fs::read(path).context(OpenCtx::Io)?;
        Self::parse(&raw).context(OpenCtx::Parse)
    }

    /// Writes the reassembled file to `path` in a single transfer.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), std::io::Error> {
        std::fs::write(path, self.to_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::{Nro, ParseError};
    use crate::aset::Aset;

    fn image(size: u32) -> Vec<u8> {
        let mut raw = vec![0u8; size as usize];
        raw[0x10..0x14].copy_from_slice(b"NRO0");
        raw[0x18..0x1C].copy_from_slice(&size.to_le_bytes());
        raw
    }

    #[test]
    fn image_without_asset_section() {
        let raw = image(0x1000);
        let nro = Nro::parse(&raw).unwrap();

        assert_eq!(nro.header.size, 0x1000);
        assert_eq!(nro.image, raw);
        assert!(nro.asset.is_none());
        assert_eq!(nro.to_bytes(), raw);
    }

    #[test]
    fn image_with_asset_section() {
        let section = Aset {
            icon: vec![1, 2, 3],
            nacp: vec![0; 0x4000],
            romfs: vec![],
        };

        let mut raw = image(0x1000);
        raw.extend_from_slice(&section.to_bytes());

        let nro = Nro::parse(&raw).unwrap();
        assert_eq!(nro.image.len(), 0x1000);
        assert_eq!(nro.asset, Some(section));
        assert_eq!(nro.to_bytes(), raw);
    }

    #[test]
    fn trailing_bytes_without_magic_stay_in_the_image() {
        let mut raw = image(0x1000);
        raw.extend_from_slice(&[0xFF; 0x40]);

        let nro = Nro::parse(&raw).unwrap();
        assert!(nro.asset.is_none());
        assert_eq!(nro.image, raw);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut raw = image(0x1000);
        raw[0x10..0x14].copy_from_slice(b"ELF!");

        let result = Nro::parse(&raw);
        assert!(matches!(result, Err(ParseError::Header { .. })));
    }
}
