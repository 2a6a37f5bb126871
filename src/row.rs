//! The id is stored in the host's native byte order. Files written on a
//! little-endian machine cannot be read back on a big-endian one.

use std::fmt;

use crate::error::PrepareError;
use crate::pager::Page;

pub const COLUMN_USERNAME_SIZE: usize = 32;
pub const COLUMN_EMAIL_SIZE: usize = 255;

pub const ID_SIZE: usize = size_of::<u32>();
pub const USERNAME_SIZE: usize = size_of::<[u8; COLUMN_USERNAME_SIZE + 1]>();
pub const EMAIL_SIZE: usize = size_of::<[u8; COLUMN_EMAIL_SIZE + 1]>();

pub const ID_OFFSET: usize = 0;
pub const USERNAME_OFFSET: usize = ID_OFFSET + ID_SIZE;
pub const EMAIL_OFFSET: usize = USERNAME_OFFSET + USERNAME_SIZE;
pub const ROW_SIZE: usize = ID_SIZE + USERNAME_SIZE + EMAIL_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    id: u32,
    username: String,
    email: String,
}

impl Row {
    pub fn new(
        id: u32,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, PrepareError> {
        let username = username.into();
        let email = email.into();
        if username.len() > COLUMN_USERNAME_SIZE || email.len() > COLUMN_EMAIL_SIZE {
            return Err(PrepareError::StringTooLong);
        }
        // a NUL would end the text early when read back
        if username.contains('\0') || email.contains('\0') {
            return Err(PrepareError::EmbeddedNul);
        }
        Ok(Self {
            id,
            username,
            email,
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Writes the row into `page` at `offset`. Every field is written for its
    /// full width; bytes past the end of a string are zeroed.
    pub fn serialize(&self, page: &mut Page, offset: usize) {
        debug_assert!(offset + ROW_SIZE <= page.len());
        let slot = &mut page[offset..offset + ROW_SIZE];

        slot[ID_OFFSET..ID_OFFSET + ID_SIZE].copy_from_slice(&self.id.to_ne_bytes());
        write_text(
            &mut slot[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE],
            &self.username,
        );
        write_text(
            &mut slot[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE],
            &self.email,
        );
    }

    pub fn deserialize(page: &Page, offset: usize) -> Self {
        debug_assert!(offset + ROW_SIZE <= page.len());
        let slot = &page[offset..offset + ROW_SIZE];

        let mut id = [0u8; ID_SIZE];
        id.copy_from_slice(&slot[ID_OFFSET..ID_OFFSET + ID_SIZE]);

        Self {
            id: u32::from_ne_bytes(id),
            username: read_text(&slot[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_SIZE]),
            email: read_text(&slot[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_SIZE]),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn write_text(field: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    field.fill(0);
    field[..bytes.len()].copy_from_slice(bytes);
}

fn read_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
