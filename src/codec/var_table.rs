// Variable table: the append-only dictionary shared by the DonnBits and
// byte-wise grammars.
//
// The table has a fixed byte budget taken from the header. Entries are laid
// out as if filling that budget from the end toward the front: entry `i`
// spans `offset(i)..offset(i - 1)`, with `offset(-1)` the budget end, so
// offsets strictly decrease (or repeat, for empty entries) as the index
// grows. Storage only grows as entries arrive; the budget is never
// allocated up front.

use std::fmt;

use crate::error::DecompressError;

/// Size of one entry record in the legacy layout; the budget always has
/// at least this much slack.
const ENTRY_SIZE: usize = 2;

#[derive(Debug, Clone)]
pub struct VarTable {
    /// Entry bytes in insertion order.
    data: Vec<u8>,
    /// End of entry `i` within `data`.
    ends: Vec<usize>,
    alloc_size: usize,
}

impl VarTable {
    /// Size the budget from the header's ratio and the decompressed size:
    /// `(unpacked * (ratio + 1)) / 256 + 2` bytes.
    pub fn new(ratio: u8, unpacked_size: usize) -> Result<Self, DecompressError> {
        let scaled = unpacked_size
            .checked_mul(usize::from(ratio) + 1)
            .map(|n| (n >> 8) + ENTRY_SIZE)
            .ok_or(DecompressError::MemFull {
                bytes: unpacked_size,
            })?;
        Ok(Self::with_capacity(scaled))
    }

    /// A table that accepts at most `alloc_size` bytes of entries.
    pub fn with_capacity(alloc_size: usize) -> Self {
        Self {
            data: Vec::new(),
            ends: Vec::new(),
            alloc_size,
        }
    }

    /// Copy `data` into a new entry and return its index.
    ///
    /// Fails without touching existing entries if the budget lacks room.
    pub fn remember(&mut self, data: &[u8]) -> Result<usize, DecompressError> {
        let available = self.available();
        if data.len() > available {
            return Err(DecompressError::DictionaryFull {
                needed: data.len(),
                available,
            });
        }
        self.data
            .try_reserve(data.len())
            .map_err(|_| DecompressError::MemFull { bytes: data.len() })?;
        self.ends.try_reserve(1).map_err(|_| DecompressError::MemFull {
            bytes: std::mem::size_of::<usize>(),
        })?;

        self.data.extend_from_slice(data);
        self.ends.push(self.data.len());
        Ok(self.ends.len() - 1)
    }

    /// Borrow the bytes of a previously remembered entry.
    pub fn fetch(&self, index: usize) -> Result<&[u8], DecompressError> {
        let end = *self
            .ends
            .get(index)
            .ok_or(DecompressError::DictionaryIndex {
                index,
                entries: self.ends.len(),
            })?;
        let start = match index {
            0 => 0,
            i => self.ends[i - 1],
        };
        Ok(&self.data[start..end])
    }

    /// Start of entry `index` in the back-to-front legacy layout.
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.ends.get(index).map(|&end| self.alloc_size - end)
    }

    /// Number of remembered entries.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Bytes stored across all entries.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn alloc_size(&self) -> usize {
        self.alloc_size
    }

    pub fn available(&self) -> usize {
        self.alloc_size - self.data.len()
    }
}

impl fmt::Display for VarTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable table:")?;
        writeln!(f, "  Entries:    {}", self.len())?;
        writeln!(f, "  Data size:  {}", self.data_size())?;
        write!(f, "  Alloc size: {}", self.alloc_size)?;
        for (i, end) in self.ends.iter().take(10).enumerate() {
            write!(f, "\n  Entry {i}: offset={}", self.alloc_size - end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_follows_ratio() {
        assert_eq!(VarTable::new(255, 100).unwrap().alloc_size(), 102);
        assert_eq!(VarTable::new(0, 512).unwrap().alloc_size(), 4);
        assert_eq!(VarTable::new(127, 0).unwrap().alloc_size(), 2);
    }

    #[test]
    fn remember_then_fetch() {
        let mut t = VarTable::with_capacity(16);
        assert_eq!(t.remember(b"abcd").unwrap(), 0);
        assert_eq!(t.remember(b"xyz").unwrap(), 1);
        assert_eq!(t.fetch(0).unwrap(), b"abcd");
        assert_eq!(t.fetch(1).unwrap(), b"xyz");
        assert_eq!(t.len(), 2);
        assert_eq!(t.data_size(), 7);
        assert_eq!(t.available(), 9);
    }

    #[test]
    fn fetch_unpopulated_index_fails() {
        let mut t = VarTable::with_capacity(8);
        assert_eq!(
            t.fetch(0),
            Err(DecompressError::DictionaryIndex {
                index: 0,
                entries: 0
            })
        );
        t.remember(b"ab").unwrap();
        assert!(t.fetch(1).is_err());
    }

    #[test]
    fn overflowing_insert_leaves_entries_intact() {
        let mut t = VarTable::with_capacity(10);
        t.remember(b"0123").unwrap();
        t.remember(b"4567").unwrap();
        let err = t.remember(b"89AB").unwrap_err();
        assert_eq!(
            err,
            DecompressError::DictionaryFull {
                needed: 4,
                available: 2
            }
        );
        assert_eq!(t.len(), 2);
        assert_eq!(t.fetch(0).unwrap(), b"0123");
        assert_eq!(t.fetch(1).unwrap(), b"4567");
        // Exactly filling the remainder still works.
        assert_eq!(t.remember(b"CD").unwrap(), 2);
        assert_eq!(t.available(), 0);
    }

    #[test]
    fn empty_entries_are_allowed() {
        let mut t = VarTable::with_capacity(2);
        t.remember(b"").unwrap();
        t.remember(b"ab").unwrap();
        assert_eq!(t.fetch(0).unwrap(), b"");
        assert_eq!(t.fetch(1).unwrap(), b"ab");
    }

    #[test]
    fn offsets_grow_back_to_front() {
        let mut t = VarTable::with_capacity(10);
        t.remember(b"abc").unwrap();
        t.remember(b"").unwrap();
        t.remember(b"defg").unwrap();
        assert_eq!(t.offset(0), Some(7));
        assert_eq!(t.offset(1), Some(7));
        assert_eq!(t.offset(2), Some(3));
        assert_eq!(t.offset(3), None);
    }

    #[test]
    fn huge_budget_is_not_allocated_up_front() {
        let mut t = VarTable::new(255, 1 << 30).unwrap();
        assert_eq!(t.alloc_size(), (1 << 30) + 2);
        assert_eq!(t.data_size(), 0);
        t.remember(b"xy").unwrap();
        assert_eq!(t.fetch(0).unwrap(), b"xy");
        assert_eq!(t.available(), 1 << 30);
    }

    #[test]
    fn display_summarizes_table() {
        let mut t = VarTable::with_capacity(4);
        t.remember(b"ab").unwrap();
        let text = t.to_string();
        assert!(text.contains("Entries:    1"));
        assert!(text.contains("Entry 0: offset=2"));
    }
}
