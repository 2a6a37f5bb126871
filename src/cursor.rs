use crate::error::{StorageError, StorageResult};
use crate::pager::Page;
use crate::table::Table;

pub struct Cursor<'a> {
    table: &'a mut Table,
    row_num: usize,
    end_of_table: bool,
}

impl<'a> Cursor<'a> {
    pub fn start(table: &'a mut Table) -> Self {
        let end_of_table = table.num_rows() == 0;
        Self {
            table,
            row_num: 0,
            end_of_table,
        }
    }

    /// Positioned one past the last row, where the next insert goes.
    pub fn end(table: &'a mut Table) -> Self {
        let row_num = table.num_rows();
        Self {
            table,
            row_num,
            end_of_table: true,
        }
    }

    pub fn row_num(&self) -> usize {
        self.row_num
    }

    pub fn end_of_table(&self) -> bool {
        self.end_of_table
    }

    pub fn advance(&mut self) -> StorageResult<()> {
        if self.end_of_table {
            return Err(StorageError::CursorExhausted {
                row_num: self.row_num,
            });
        }
        self.row_num += 1;
        self.end_of_table = self.row_num >= self.table.num_rows();
        Ok(())
    }

    pub fn value(&mut self) -> StorageResult<(&mut Page, usize)> {
        self.table.row_slot(self.row_num)
    }
}
