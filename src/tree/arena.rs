//! Owning storage for every node of a tree.
//!
//! Nodes refer to each other through [`DirId`] and [`FileId`] handles, so
//! ownership always flows through the arena and parent links are plain,
//! non-owning handles.

use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

use super::error::{ResourceSnafu, TreeError};
use super::node::{DirEntry, DirId, EntryRef, FileEntry, FileId};

/// Slot vector with a vacancy list for reuse of released slots.
#[derive(Debug, Clone)]
struct Slots<T> {
    entries: Vec<Option<T>>,
    vacant: Vec<usize>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, value: T) -> Result<usize, T> {
        if let Some(slot) = self.vacant.pop() {
            self.entries[slot] = Some(value);
            return Ok(slot);
        }
        if self.entries.try_reserve(1).is_err() {
            return Err(value);
        }
        self.entries.push(Some(value));
        Ok(self.entries.len() - 1)
    }

    fn remove(&mut self, slot: usize) -> Option<T> {
        let value = self.entries.get_mut(slot)?.take()?;
        self.vacant.push(slot);
        Some(value)
    }

    fn get(&self, slot: usize) -> Option<&T> {
        self.entries.get(slot)?.as_ref()
    }

    fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.entries.get_mut(slot)?.as_mut()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.vacant.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct Arena<'c> {
    dirs: Slots<DirEntry>,
    files: Slots<FileEntry<'c>>,
    live: usize,
    node_limit: Option<NonZeroUsize>,
}

impl<'c> Arena<'c> {
    pub fn new(node_limit: Option<NonZeroUsize>) -> Self {
        Self {
            node_limit,
            ..Self::default()
        }
    }

    /// Number of live nodes of both kinds.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn dir(&self, id: DirId) -> Option<&DirEntry> {
        self.dirs.get(id.slot())
    }

    pub fn file(&self, id: FileId) -> Option<&FileEntry<'c>> {
        self.files.get(id.slot())
    }

    pub(crate) fn dir_mut(&mut self, id: DirId) -> Option<&mut DirEntry> {
        self.dirs.get_mut(id.slot())
    }

    pub(crate) fn file_mut(&mut self, id: FileId) -> Option<&mut FileEntry<'c>> {
        self.files.get_mut(id.slot())
    }

    pub fn dir_entry(&self, id: DirId) -> Option<EntryRef<'_, 'c>> {
        self.dir(id).map(EntryRef::Dir)
    }

    pub fn file_entry(&self, id: FileId) -> Option<EntryRef<'_, 'c>> {
        self.file(id).map(EntryRef::File)
    }

    pub(crate) fn alloc_dir(&mut self, entry: DirEntry) -> Result<DirId, TreeError> {
        self.ensure_room(entry.path())?;
        match self.dirs.insert(entry) {
            Ok(slot) => {
                self.live += 1;
                Ok(DirId::new(slot))
            }
            Err(entry) => ResourceSnafu { path: entry.path }.fail(),
        }
    }

    pub(crate) fn alloc_file(&mut self, entry: FileEntry<'c>) -> Result<FileId, TreeError> {
        self.ensure_room(entry.path())?;
        match self.files.insert(entry) {
            Ok(slot) => {
                self.live += 1;
                Ok(FileId::new(slot))
            }
            Err(entry) => ResourceSnafu { path: entry.path }.fail(),
        }
    }

    pub(crate) fn release_dir(&mut self, id: DirId) -> Option<DirEntry> {
        let entry = self.dirs.remove(id.slot())?;
        self.live -= 1;
        Some(entry)
    }

    pub(crate) fn release_file(&mut self, id: FileId) -> Option<FileEntry<'c>> {
        let entry = self.files.remove(id.slot())?;
        self.live -= 1;
        Some(entry)
    }

    pub(crate) fn clear(&mut self) {
        self.dirs.clear();
        self.files.clear();
        self.live = 0;
    }

    /// Binary search of a sorted directory list by path.
    pub fn search_dirs(&self, children: &[DirId], path: &str) -> Result<usize, usize> {
        children.binary_search_by(|id| self[*id].path().cmp(path))
    }

    /// Binary search of a sorted file list by path.
    pub fn search_files(&self, children: &[FileId], path: &str) -> Result<usize, usize> {
        children.binary_search_by(|id| self[*id].path().cmp(path))
    }

    fn ensure_room(&self, path: &str) -> Result<(), TreeError> {
        match self.node_limit {
            Some(limit) if self.live >= limit.get() => ResourceSnafu { path }.fail(),
            _ => Ok(()),
        }
    }
}

impl<'c> Index<DirId> for Arena<'c> {
    type Output = DirEntry;

    fn index(&self, id: DirId) -> &Self::Output {
        match self.dir(id) {
            Some(entry) => entry,
            None => panic!("{id} is not a live directory"),
        }
    }
}

impl<'c> IndexMut<DirId> for Arena<'c> {
    fn index_mut(&mut self, id: DirId) -> &mut Self::Output {
        match self.dir_mut(id) {
            Some(entry) => entry,
            None => panic!("{id} is not a live directory"),
        }
    }
}

impl<'c> Index<FileId> for Arena<'c> {
    type Output = FileEntry<'c>;

    fn index(&self, id: FileId) -> &Self::Output {
        match self.file(id) {
            Some(entry) => entry,
            None => panic!("{id} is not a live file"),
        }
    }
}

impl<'c> IndexMut<FileId> for Arena<'c> {
    fn index_mut(&mut self, id: FileId) -> &mut Self::Output {
        match self.file_mut(id) {
            Some(entry) => entry,
            None => panic!("{id} is not a live file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_slots_are_reused() {
        let mut arena = Arena::new(None);
        let first = arena.alloc_dir(DirEntry::new("a".into(), None)).unwrap();
        let second = arena.alloc_dir(DirEntry::new("b".into(), None)).unwrap();
        assert_eq!(arena.len(), 2);

        let released = arena.release_dir(first).unwrap();
        assert_eq!(released.path(), "a");
        assert!(arena.dir(first).is_none());
        assert_eq!(arena.len(), 1);

        let third = arena.alloc_dir(DirEntry::new("c".into(), None)).unwrap();
        assert_eq!(third, first);
        assert_eq!(arena[third].path(), "c");
        assert_eq!(arena[second].path(), "b");
    }

    #[test]
    fn releasing_twice_yields_nothing() {
        let mut arena = Arena::new(None);
        let id = arena.alloc_file(FileEntry::new("a".into(), None, b"x")).unwrap();
        assert!(arena.release_file(id).is_some());
        assert!(arena.release_file(id).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn node_limit_counts_both_kinds() {
        let mut arena = Arena::new(NonZeroUsize::new(2));
        arena.alloc_dir(DirEntry::new("a".into(), None)).unwrap();
        arena
            .alloc_file(FileEntry::new("a/b".into(), None, b""))
            .unwrap();

        let result = arena.alloc_dir(DirEntry::new("a/c".into(), None));

        assert_eq!(
            result,
            Err(TreeError::ResourceError {
                path: "a/c".into()
            })
        );
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn search_uses_path_order() {
        let mut arena = Arena::new(None);
        let ids = ["a/a", "a/c", "a/e"]
            .into_iter()
            .map(|path| arena.alloc_dir(DirEntry::new(path.into(), None)).unwrap())
            .collect::<Vec<_>>();

        assert_eq!(arena.search_dirs(&ids, "a/c"), Ok(1));
        assert_eq!(arena.search_dirs(&ids, "a/b"), Err(1));
        assert_eq!(arena.search_dirs(&ids, "a/f"), Err(3));
    }
}
