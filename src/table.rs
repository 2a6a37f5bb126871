use std::path::Path;

use log::{debug, warn};

use crate::cursor::Cursor;
use crate::error::{ExecuteError, StorageError, StorageResult};
use crate::pager::{Page, Pager};
use crate::row::{ROW_SIZE, Row};
use crate::{PAGE_SIZE, ROWS_PER_PAGE, TABLE_MAX_PAGES, TABLE_MAX_ROWS};

pub struct Table {
    pager: Pager,
    num_rows: usize,
}

pub fn locate(row_num: usize) -> (usize, usize) {
    let page_num = row_num / ROWS_PER_PAGE;
    let byte_offset = (row_num % ROWS_PER_PAGE) * ROW_SIZE;
    (page_num, byte_offset)
}

/// Number of whole rows stored in a file of `file_length` bytes. Full pages
/// hold [`ROWS_PER_PAGE`] rows each; a trailing partial page holds as many
/// rows as fit in what remains.
fn rows_in_file(file_length: u64) -> usize {
    let full_pages = (file_length / PAGE_SIZE as u64) as usize;
    let tail = (file_length % PAGE_SIZE as u64) as usize;
    full_pages * ROWS_PER_PAGE + (tail / ROW_SIZE).min(ROWS_PER_PAGE)
}

impl Table {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let pager = Pager::open(path)?;
        let file_length = pager.file_length();

        let max = (TABLE_MAX_PAGES * PAGE_SIZE) as u64;
        if file_length > max {
            return Err(StorageError::FileTooLarge { file_length, max });
        }

        let num_rows = rows_in_file(file_length);
        let tail = (file_length % PAGE_SIZE as u64) as usize;
        if tail % ROW_SIZE != 0 {
            warn!(
                "{}: dropping {} trailing bytes that do not form a whole row",
                path.display(),
                tail % ROW_SIZE
            );
        }

        debug!("opened table with {num_rows} rows");
        Ok(Self { pager, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub(crate) fn row_slot(&mut self, row_num: usize) -> StorageResult<(&mut Page, usize)> {
        let (page_num, byte_offset) = locate(row_num);
        let page = self.pager.get_page(page_num)?;
        Ok((page, byte_offset))
    }

    pub fn insert(&mut self, row: &Row) -> Result<(), ExecuteError> {
        if self.num_rows >= TABLE_MAX_ROWS {
            return Err(ExecuteError::TableFull);
        }

        let mut cursor = Cursor::end(self);
        let (page, offset) = cursor.value()?;
        row.serialize(page, offset);

        self.num_rows += 1;
        Ok(())
    }

    pub fn select(&mut self) -> StorageResult<Vec<Row>> {
        let mut rows = Vec::with_capacity(self.num_rows);
        let mut cursor = Cursor::start(self);
        while !cursor.end_of_table() {
            let (page, offset) = cursor.value()?;
            rows.push(Row::deserialize(page, offset));
            cursor.advance()?;
        }
        Ok(rows)
    }

    pub fn close(mut self) -> StorageResult<()> {
        let num_full_pages = self.num_rows / ROWS_PER_PAGE;
        for page_num in 0..num_full_pages {
            if !self.pager.is_loaded(page_num) {
                continue;
            }
            self.pager.flush(page_num, PAGE_SIZE)?;
            self.pager.release(page_num);
        }

        let num_additional_rows = self.num_rows % ROWS_PER_PAGE;
        if num_additional_rows > 0 {
            let page_num = num_full_pages;
            if self.pager.is_loaded(page_num) {
                self.pager.flush(page_num, num_additional_rows * ROW_SIZE)?;
                self.pager.release(page_num);
            }
        }

        debug!("closing table with {} rows", self.num_rows);
        self.pager.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(i: usize) -> Row {
        Row::new(i as u32, format!("user{i}"), format!("person{i}@example.com")).unwrap()
    }

    #[test]
    fn locates_rows_by_page_and_offset() {
        assert_eq!(locate(0), (0, 0));
        assert_eq!(locate(1), (0, ROW_SIZE));
        assert_eq!(locate(ROWS_PER_PAGE - 1), (0, (ROWS_PER_PAGE - 1) * ROW_SIZE));
        assert_eq!(locate(ROWS_PER_PAGE), (1, 0));
        assert_eq!(locate(TABLE_MAX_ROWS - 1).0, TABLE_MAX_PAGES - 1);
    }

    #[test]
    fn counts_rows_page_aware() {
        assert_eq!(rows_in_file(0), 0);
        assert_eq!(rows_in_file(ROW_SIZE as u64), 1);
        assert_eq!(rows_in_file((ROW_SIZE + 10) as u64), 1);
        assert_eq!(rows_in_file(PAGE_SIZE as u64), ROWS_PER_PAGE);
        assert_eq!(
            rows_in_file((2 * PAGE_SIZE + 3 * ROW_SIZE) as u64),
            2 * ROWS_PER_PAGE + 3
        );
    }

    #[test]
    fn select_returns_rows_in_insertion_order() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(&dir.path().join("t.db")).unwrap();

        for i in 0..5 {
            table.insert(&row(i)).unwrap();
        }

        assert_eq!(table.num_rows(), 5);
        assert_eq!(table.select().unwrap(), (0..5).map(row).collect::<Vec<_>>());
    }

    #[test]
    fn select_on_empty_table_returns_nothing() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(&dir.path().join("t.db")).unwrap();

        assert!(table.select().unwrap().is_empty());
        assert_eq!(table.pager().resident_pages(), 0);
    }

    #[test]
    fn full_first_page_does_not_touch_the_second() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(&dir.path().join("t.db")).unwrap();

        for i in 0..ROWS_PER_PAGE {
            table.insert(&row(i)).unwrap();
        }
        assert!(table.pager().is_loaded(0));
        assert!(!table.pager().is_loaded(1));

        table.insert(&row(ROWS_PER_PAGE)).unwrap();
        assert!(table.pager().is_loaded(1));

        let (page, offset) = table.row_slot(ROWS_PER_PAGE).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(Row::deserialize(page, offset), row(ROWS_PER_PAGE));
    }

    #[test]
    fn rejects_inserts_once_full() {
        let dir = tempdir().unwrap();
        let mut table = Table::open(&dir.path().join("t.db")).unwrap();
        for i in 0..TABLE_MAX_ROWS {
            table.insert(&row(i)).unwrap();
        }

        let err = table.insert(&row(TABLE_MAX_ROWS)).unwrap_err();

        assert!(matches!(err, ExecuteError::TableFull));
        assert_eq!(table.num_rows(), TABLE_MAX_ROWS);
        let rows = table.select().unwrap();
        assert_eq!(rows.len(), TABLE_MAX_ROWS);
        assert_eq!(rows.last(), Some(&row(TABLE_MAX_ROWS - 1)));
    }

    #[test]
    fn rows_survive_close_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        let count = 2 * ROWS_PER_PAGE + 3;

        let mut table = Table::open(&path).unwrap();
        for i in 0..count {
            table.insert(&row(i)).unwrap();
        }
        table.close().unwrap();

        let expected_len = (2 * PAGE_SIZE + 3 * ROW_SIZE) as u64;
        assert_eq!(std::fs::metadata(&path).unwrap().len(), expected_len);

        let mut table = Table::open(&path).unwrap();
        assert_eq!(table.num_rows(), count);
        assert_eq!(table.select().unwrap(), (0..count).map(row).collect::<Vec<_>>());
    }

    #[test]
    fn appends_after_reopen_land_on_a_fresh_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");

        let mut table = Table::open(&path).unwrap();
        for i in 0..ROWS_PER_PAGE {
            table.insert(&row(i)).unwrap();
        }
        table.close().unwrap();

        // page 1 lies past the end of the file and is materialised zeroed
        let mut table = Table::open(&path).unwrap();
        table.insert(&row(ROWS_PER_PAGE)).unwrap();
        table.close().unwrap();

        let mut table = Table::open(&path).unwrap();
        assert_eq!(table.num_rows(), ROWS_PER_PAGE + 1);
        assert_eq!(
            table.select().unwrap(),
            (0..=ROWS_PER_PAGE).map(row).collect::<Vec<_>>()
        );
    }

    #[test]
    fn unloaded_pages_are_not_rewritten_on_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");

        let mut table = Table::open(&path).unwrap();
        table.insert(&row(0)).unwrap();
        table.close().unwrap();

        let table = Table::open(&path).unwrap();
        assert_eq!(table.pager().resident_pages(), 0);
        table.close().unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), ROW_SIZE as u64);
    }

    #[test]
    fn truncated_trailing_row_is_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");

        let mut table = Table::open(&path).unwrap();
        table.insert(&row(0)).unwrap();
        table.insert(&row(1)).unwrap();
        table.close().unwrap();

        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len((2 * ROW_SIZE - 1) as u64).unwrap();
        drop(file);

        let mut table = Table::open(&path).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.select().unwrap(), vec![row(0)]);
    }

    #[test]
    fn refuses_files_larger_than_the_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len((TABLE_MAX_PAGES * PAGE_SIZE + 1) as u64).unwrap();
        drop(file);

        let err = Table::open(&path).err().unwrap();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }
}
