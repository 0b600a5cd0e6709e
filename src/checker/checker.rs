use std::cmp::Ordering;

use snafu::prelude::*;

use crate::tree::path::{is_direct_child, is_within};
use crate::tree::{Arena, DirId, EntryKind, EntryRef, FileId, RootRef};

/// First broken invariant found while auditing a tree.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum InvariantViolation {
    #[snafu(display("Tree is not initialized but claims {} directories", count))]
    UninitializedWithCount { count: usize },
    #[snafu(display("Tree is not initialized but has a root"))]
    UninitializedWithRoot,
    #[snafu(display("Tree has no root but claims {} directories", count))]
    EmptyWithCount { count: usize },
    #[snafu(display("Root is a file but the tree claims {} directories", count))]
    FileRootWithCount { count: usize },
    #[snafu(display("Root '{}' has a parent", path))]
    RootHasParent { path: String },
    #[snafu(display("Reference to {} does not lead to a live directory", id))]
    DanglingDirectory { id: DirId },
    #[snafu(display("Reference to {} does not lead to a live file", id))]
    DanglingFile { id: FileId },
    #[snafu(display("A {} has an empty path", kind))]
    EmptyPath { kind: EntryKind },
    #[snafu(display(
        "Children of '{}' are out of order: '{}' is not before '{}'",
        parent,
        first,
        second
    ))]
    Unsorted {
        parent: String,
        first: String,
        second: String,
    },
    #[snafu(display("'{}' is not a path below its parent '{}'", child, parent))]
    NotBelowParent { parent: String, child: String },
    #[snafu(display("'{}' is more than one level below its parent '{}'", child, parent))]
    NotDirectChild { parent: String, child: String },
    #[snafu(display("'{}' is not linked back to its parent '{}'", child, parent))]
    WrongParent { parent: String, child: String },
    #[snafu(display("'{}' is both a directory and a file", path))]
    NamespaceOverlap { path: String },
    #[snafu(display("Claimed {} directories but found {}", claimed, counted))]
    CountMismatch { claimed: usize, counted: usize },
}

/// Verifies every structural invariant of the tree described by the inputs,
/// stopping at the first violation.
pub fn check_tree(
    initialized: bool,
    nodes: &Arena<'_>,
    root: RootRef,
    claimed_dir_count: usize,
) -> Result<(), InvariantViolation> {
    if !initialized {
        ensure!(
            claimed_dir_count == 0,
            UninitializedWithCountSnafu {
                count: claimed_dir_count
            }
        );
        ensure!(root == RootRef::Empty, UninitializedWithRootSnafu);
    }

    let counted = match root {
        RootRef::Empty => {
            ensure!(
                claimed_dir_count == 0,
                EmptyWithCountSnafu {
                    count: claimed_dir_count
                }
            );
            0
        }
        RootRef::File(id) => {
            let file = nodes.file_entry(id).context(DanglingFileSnafu { id })?;
            check_root(&file)?;
            ensure!(
                !file.path().is_empty(),
                EmptyPathSnafu {
                    kind: EntryKind::File
                }
            );
            ensure!(
                claimed_dir_count == 0,
                FileRootWithCountSnafu {
                    count: claimed_dir_count
                }
            );
            0
        }
        RootRef::Directory(id) => {
            let dir = nodes.dir_entry(id).context(DanglingDirectorySnafu { id })?;
            check_root(&dir)?;
            walk(nodes, id)?
        }
    };

    ensure!(
        counted == claimed_dir_count,
        CountMismatchSnafu {
            claimed: claimed_dir_count,
            counted
        }
    );
    Ok(())
}

fn check_root(root: &EntryRef<'_, '_>) -> Result<(), InvariantViolation> {
    ensure!(
        root.parent().is_none(),
        RootHasParentSnafu { path: root.path() }
    );
    Ok(())
}

/// Pre-order walk from `top`, returning the number of directories visited.
fn walk(nodes: &Arena<'_>, top: DirId) -> Result<usize, InvariantViolation> {
    let mut pending = vec![top];
    let mut visited = 0;

    while let Some(id) = pending.pop() {
        let dir = nodes.dir(id).context(DanglingDirectorySnafu { id })?;
        visited += 1;

        ensure!(
            !dir.path().is_empty(),
            EmptyPathSnafu {
                kind: EntryKind::Directory
            }
        );
        if let Some(parent) = dir.parent() {
            let parent = nodes.dir(parent).context(DanglingDirectorySnafu { id: parent })?;
            check_placement(parent.path(), dir.path())?;
        }

        let child_dirs = dir
            .child_dirs()
            .iter()
            .map(|child| nodes.dir_entry(*child).context(DanglingDirectorySnafu { id: *child }))
            .collect::<Result<Vec<_>, _>>()?;
        let child_files = dir
            .child_files()
            .iter()
            .map(|child| nodes.file_entry(*child).context(DanglingFileSnafu { id: *child }))
            .collect::<Result<Vec<_>, _>>()?;

        check_sorted(dir.path(), &child_dirs)?;
        check_sorted(dir.path(), &child_files)?;
        check_disjoint(&child_dirs, &child_files)?;

        for file in &child_files {
            ensure!(
                !file.path().is_empty(),
                EmptyPathSnafu {
                    kind: EntryKind::File
                }
            );
            check_back_link(id, dir.path(), file)?;
            check_placement(dir.path(), file.path())?;
        }

        for child in &child_dirs {
            check_back_link(id, dir.path(), child)?;
        }
        pending.extend(dir.child_dirs().iter().rev().copied());
    }

    Ok(visited)
}

/// Strictly increasing paths, compared pairwise.
fn check_sorted(parent: &str, children: &[EntryRef<'_, '_>]) -> Result<(), InvariantViolation> {
    for pair in children.windows(2) {
        ensure!(
            pair[0].compare(&pair[1]) == Ordering::Less,
            UnsortedSnafu {
                parent,
                first: pair[0].path(),
                second: pair[1].path(),
            }
        );
    }
    Ok(())
}

/// No path may name both a child directory and a child file.
fn check_disjoint(
    dirs: &[EntryRef<'_, '_>],
    files: &[EntryRef<'_, '_>],
) -> Result<(), InvariantViolation> {
    let (mut d, mut f) = (0, 0);
    while d < dirs.len() && f < files.len() {
        match dirs[d].compare(&files[f]) {
            Ordering::Less => d += 1,
            Ordering::Greater => f += 1,
            Ordering::Equal => {
                return NamespaceOverlapSnafu {
                    path: dirs[d].path(),
                }
                .fail();
            }
        }
    }
    Ok(())
}

fn check_placement(parent: &str, child: &str) -> Result<(), InvariantViolation> {
    ensure!(
        is_within(parent, child) && parent != child,
        NotBelowParentSnafu { parent, child }
    );
    ensure!(
        is_direct_child(parent, child),
        NotDirectChildSnafu { parent, child }
    );
    Ok(())
}

/// The child's parent reference must be this very directory, not merely one
/// with the same path.
fn check_back_link(
    id: DirId,
    parent_path: &str,
    child: &EntryRef<'_, '_>,
) -> Result<(), InvariantViolation> {
    ensure!(
        child.parent() == Some(id),
        WrongParentSnafu {
            parent: parent_path,
            child: child.path(),
        }
    );
    Ok(())
}
