//! The NACP control record stored in an asset section: localized application titles and a
//! display version, in fixed-width NUL-padded fields.
//!
//! The record is kept as raw bytes and edited in place, so fields this crate does not
//! interpret round trip untouched.

use easyerr::Error;

/// Size of the name field of a title slot.
pub const NAME_LEN: usize = 0x200;
/// Size of the author field of a title slot.
pub const AUTHOR_LEN: usize = 0x100;
/// Size of the display version field.
pub const VERSION_LEN: usize = 0x10;
/// Number of title slots, one per supported locale.
pub const TITLE_COUNT: usize = 16;
/// Minimum size of a control record. Shorter records are zero extended up to this.
pub const MIN_LEN: usize = 0x4000;

const TITLE_LEN: usize = NAME_LEN + AUTHOR_LEN;
const VERSION_OFFSET: usize = 0x3060;

/// The text fields of a control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Field {
    Name,
    Author,
    Version,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{f0} field is not valid UTF-8")]
    NotUtf8(Field),
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("{field} is {len} bytes when encoded, over the {max} byte field size")]
    TooLong {
        field: Field,
        len: usize,
        max: usize,
    },
}

/// Which of the title slots an edit writes to.
///
/// Existing tools leave the last slot untouched when writing a new title. It is unclear
/// whether that is intentional, so the choice is explicit here instead of baked into the
/// edit loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleSlots {
    /// Write every slot except the last.
    #[default]
    AllButLast,
    /// Write all [`TITLE_COUNT`] slots.
    All,
}

impl TitleSlots {
    fn count(self) -> usize {
        match self {
            Self::AllButLast => TITLE_COUNT - 1,
            Self::All => TITLE_COUNT,
        }
    }
}

/// A NACP control record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nacp {
    data: Vec<u8>,
}

impl Nacp {
    /// Wraps a control record, zero extending it to [`MIN_LEN`] if it is shorter. Longer
    /// records keep their length.
    pub fn new(mut data: Vec<u8>) -> Self {
        if data.len() < MIN_LEN {
            data.resize(MIN_LEN, 0);
        }

        Self { data }
    }

    /// Application name of the first title slot.
    pub fn name(&self) -> Result<&str, DecodeError> {
        self.field(Field::Name, 0, NAME_LEN)
    }

    /// Application author of the first title slot.
    pub fn author(&self) -> Result<&str, DecodeError> {
        self.field(Field::Author, NAME_LEN, AUTHOR_LEN)
    }

    /// Display version of the application.
    pub fn version(&self) -> Result<&str, DecodeError> {
        self.field(Field::Version, VERSION_OFFSET, VERSION_LEN)
    }

    fn field(&self, field: Field, offset: usize, len: usize) -> Result<&str, DecodeError> {
        let text = std::str::from_utf8(&self.data[offset..offset + len])
            .map_err(|_| DecodeError::NotUtf8(field))?;

        Ok(text.trim_end_matches('\0'))
    }

    /// Sets the application name and author in the slots `slots` selects.
    ///
    /// The record is untouched if either field does not fit.
    pub fn set_title(
        &mut self,
        name: &str,
        author: &str,
        slots: TitleSlots,
    ) -> Result<(), EditError> {
        check(Field::Name, name, NAME_LEN)?;
        check(Field::Author, author, AUTHOR_LEN)?;

        for slot in 0..slots.count() {
            let base = slot * TITLE_LEN;
            put(&mut self.data[base..base + NAME_LEN], name);
            put(&mut self.data[base + NAME_LEN..base + TITLE_LEN], author);
        }

        Ok(())
    }

    /// Sets the display version. The record is untouched if the field does not fit.
    pub fn set_version(&mut self, version: &str) -> Result<(), EditError> {
        check(Field::Version, version, VERSION_LEN)?;
        put(
            &mut self.data[VERSION_OFFSET..VERSION_OFFSET + VERSION_LEN],
            version,
        );

        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

fn check(field: Field, text: &str, max: usize) -> Result<(), EditError> {
    if text.len() > max {
        return Err(EditError::TooLong {
            field,
            len: text.len(),
            max,
        });
    }

    Ok(())
}

fn put(dst: &mut [u8], text: &str) {
    dst.fill(0);
    dst[..text.len()].copy_from_slice(text.as_bytes());
}

#[cfg(test)]
mod test {
    use super::{
        EditError, Field, MIN_LEN, NAME_LEN, Nacp, TITLE_COUNT, TITLE_LEN, TitleSlots, VERSION_LEN,
    };

    #[test]
    fn fields_round_trip() {
        let mut nacp = Nacp::new(vec![0; MIN_LEN]);
        nacp.set_title("Demo", "Me", TitleSlots::default()).unwrap();
        nacp.set_version("1.0").unwrap();

        assert_eq!(nacp.name().unwrap(), "Demo");
        assert_eq!(nacp.author().unwrap(), "Me");
        assert_eq!(nacp.version().unwrap(), "1.0");
    }

    #[test]
    fn fields_are_nul_padded_in_place() {
        let mut nacp = Nacp::new(vec![0; MIN_LEN]);
        nacp.set_title("Demo", "Me", TitleSlots::default()).unwrap();
        nacp.set_version("1.0").unwrap();

        let data = nacp.as_bytes();
        assert_eq!(&data[0..4], b"Demo");
        assert!(data[4..NAME_LEN].iter().all(|&b| b == 0));
        assert_eq!(&data[0x3060..0x3063], b"1.0");
        assert!(data[0x3063..0x3070].iter().all(|&b| b == 0));
    }

    #[test]
    fn last_slot_is_left_alone_by_default() {
        let mut nacp = Nacp::new(vec![0; MIN_LEN]);
        nacp.set_title("Demo", "Me", TitleSlots::default()).unwrap();

        let last = (TITLE_COUNT - 1) * TITLE_LEN;
        let data = nacp.as_bytes();
        assert_eq!(&data[last - TITLE_LEN..last - TITLE_LEN + 4], b"Demo");
        assert!(data[last..last + TITLE_LEN].iter().all(|&b| b == 0));

        nacp.set_title("Demo", "Me", TitleSlots::All).unwrap();
        assert_eq!(&nacp.as_bytes()[last..last + 4], b"Demo");
    }

    #[test]
    fn short_records_are_zero_extended() {
        let nacp = Nacp::new(vec![0xFF; 0x100]);
        assert_eq!(nacp.as_bytes().len(), MIN_LEN);
        assert!(nacp.as_bytes()[0x100..].iter().all(|&b| b == 0));
    }

    #[test]
    fn long_records_keep_their_length() {
        let nacp = Nacp::new(vec![0; MIN_LEN + 0x123]);
        assert_eq!(nacp.as_bytes().len(), MIN_LEN + 0x123);
    }

    #[test]
    fn oversized_fields_leave_the_record_untouched() {
        let mut nacp = Nacp::new(vec![0; MIN_LEN]);
        let before = nacp.clone();

        let long = "x".repeat(NAME_LEN + 1);
        let result = nacp.set_title(&long, "Me", TitleSlots::default());
        assert!(matches!(
            result,
            Err(EditError::TooLong {
                field: Field::Name,
                ..
            })
        ));
        assert_eq!(nacp, before);

        // fits as characters, too long once encoded
        let long = "é".repeat(VERSION_LEN);
        let result = nacp.set_version(&long);
        assert!(matches!(
            result,
            Err(EditError::TooLong {
                field: Field::Version,
                ..
            })
        ));
        assert_eq!(nacp, before);
    }

    #[test]
    fn non_utf8_fields_are_reported() {
        let mut data = vec![0; MIN_LEN];
        data[0] = 0xFF;

        let nacp = Nacp::new(data);
        assert!(nacp.name().is_err());
        assert!(nacp.author().is_ok());
    }

    #[test]
    fn multibyte_titles_round_trip() {
        let mut nacp = Nacp::new(Vec::new());
        nacp.set_title("デモ", "私", TitleSlots::default()).unwrap();

        assert_eq!(nacp.name().unwrap(), "デモ");
        assert_eq!(nacp.author().unwrap(), "私");
    }
}
