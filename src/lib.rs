pub mod cursor;
pub mod error;
pub mod pager;
pub mod row;
pub mod statement;
pub mod table;

pub use cursor::Cursor;
pub use error::{ExecuteError, PrepareError, StorageError, StorageResult};
pub use pager::{Page, Pager};
pub use row::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_OFFSET, EMAIL_SIZE, ID_OFFSET, ID_SIZE,
    ROW_SIZE, Row, USERNAME_OFFSET, USERNAME_SIZE,
};
pub use statement::Statement;
pub use table::Table;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;
pub const ROWS_PER_PAGE: usize = PAGE_SIZE / ROW_SIZE;
pub const TABLE_MAX_ROWS: usize = ROWS_PER_PAGE * TABLE_MAX_PAGES;

const _: () = assert!(ROW_SIZE <= PAGE_SIZE);
const _: () = assert!(ROWS_PER_PAGE >= 1);
