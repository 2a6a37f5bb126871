use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, trace};

use crate::error::{StorageError, StorageResult};
use crate::{PAGE_SIZE, TABLE_MAX_PAGES};

pub type Page = [u8; PAGE_SIZE];

pub struct Pager {
    file: File,
    file_length: u64,
    pages: [Option<Box<Page>>; TABLE_MAX_PAGES],
}

impl Pager {
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let file_length = file
            .metadata()
            .map_err(|source| StorageError::Metadata {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        debug!("opened {} ({} bytes)", path.display(), file_length);

        Ok(Self {
            file,
            file_length,
            pages: std::array::from_fn(|_| None),
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    pub fn is_loaded(&self, page_num: usize) -> bool {
        self.pages.get(page_num).is_some_and(Option::is_some)
    }

    pub fn resident_pages(&self) -> usize {
        self.pages.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn get_page(&mut self, page_num: usize) -> StorageResult<&mut Page> {
        if page_num >= TABLE_MAX_PAGES {
            return Err(StorageError::PageOutOfBounds {
                page_num,
                max: TABLE_MAX_PAGES,
            });
        }

        let slot = &mut self.pages[page_num];
        let page = match slot {
            Some(page) => {
                trace!("page {page_num} cache hit");
                page
            }
            None => slot.insert(load_page(&mut self.file, self.file_length, page_num)?),
        };
        Ok(&mut **page)
    }

    pub fn flush(&mut self, page_num: usize, byte_count: usize) -> StorageResult<()> {
        if byte_count > PAGE_SIZE {
            return Err(StorageError::FlushTooLarge {
                page_num,
                byte_count,
            });
        }
        let Some(page) = self.pages.get(page_num).and_then(Option::as_deref) else {
            return Err(StorageError::FlushEmptyPage { page_num });
        };

        self.file
            .seek(SeekFrom::Start(page_offset(page_num)))
            .map_err(|source| StorageError::Seek { page_num, source })?;
        self.file
            .write_all(&page[..byte_count])
            .map_err(|source| StorageError::Write { page_num, source })?;

        debug!("flushed {byte_count} bytes of page {page_num}");
        Ok(())
    }

    pub fn release(&mut self, page_num: usize) {
        if let Some(slot) = self.pages.get_mut(page_num) {
            if slot.take().is_some() {
                trace!("released page {page_num}");
            }
        }
    }

    /// Releases every remaining page and closes the file. Anything not
    /// flushed beforehand is discarded.
    pub fn close(mut self) -> StorageResult<()> {
        let leftover = self.resident_pages();
        if leftover > 0 {
            debug!("discarding {leftover} unflushed pages");
        }
        self.pages.iter_mut().for_each(|slot| *slot = None);

        self.file.sync_all().map_err(StorageError::Close)?;
        debug!("closed database file");
        Ok(())
    }
}

fn page_offset(page_num: usize) -> u64 {
    page_num as u64 * PAGE_SIZE as u64
}

fn load_page(file: &mut File, file_length: u64, page_num: usize) -> StorageResult<Box<Page>> {
    let mut page = Box::new([0u8; PAGE_SIZE]);
    let pages_on_disk = file_length.div_ceil(PAGE_SIZE as u64);

    if (page_num as u64) < pages_on_disk {
        file.seek(SeekFrom::Start(page_offset(page_num)))
            .map_err(|source| StorageError::Seek { page_num, source })?;

        let mut filled = 0;
        while filled < PAGE_SIZE {
            match file.read(&mut page[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => return Err(StorageError::Read { page_num, source }),
            }
        }
        trace!("loaded page {page_num} from disk ({filled} bytes)");
    } else {
        trace!("allocated fresh page {page_num}");
    }

    Ok(page)
}
