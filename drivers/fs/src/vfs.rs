//! Virtual Filesystem contract
//!
//! This is the boundary the kernel's VFS framework owns: superblock /
//! inode / dentry records and the operation vtables a concrete filesystem
//! publishes against them. The framework itself (mount registry, generic
//! path resolution across multiple filesystem types, the page/buffer
//! cache) lives outside this crate; what's defined here is the shape a
//! filesystem must present to plug into it.

use crate::FsError;
use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use spin::RwLock;

/// What an inode represents on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeAttribute {
    File,
    Directory,
}

/// In-core inode: VFS-visible metadata plus filesystem-private state.
///
/// `Private` is the per-filesystem payload (`Fat32InodeInfo` for us) that
/// the rest of the VFS never looks inside.
pub struct Inode<Private> {
    pub attribute: InodeAttribute,
    /// File size in bytes (0 for directories).
    pub file_size: u64,
    /// Blocks of `block_size` allocated to the file, rounded up to whole
    /// clusters.
    pub blocks: u64,
    pub private: Private,
}

/// A directory entry: a name bound to an inode, linked into the dentry
/// tree.
///
/// The root dentry is its own parent (a deliberate self-cycle, matching
/// the sentinel the boot loader constructs). Every other parent link is a
/// [`Weak`] reference so that a subtree can be dropped without the parent
/// keeping it alive — see the cycle note in the data model.
pub struct Dentry<Private> {
    pub name: String,
    parent: RwLock<Weak<Dentry<Private>>>,
    pub children: RwLock<Vec<Arc<Dentry<Private>>>>,
    pub subdirs: RwLock<Vec<Arc<Dentry<Private>>>>,
    pub inode: RwLock<Option<Arc<RwLock<Inode<Private>>>>>,
}

impl<Private> Dentry<Private> {
    pub fn new(name: String) -> Arc<Self> {
        Arc::new(Dentry {
            name,
            parent: RwLock::new(Weak::new()),
            children: RwLock::new(Vec::new()),
            subdirs: RwLock::new(Vec::new()),
            inode: RwLock::new(None),
        })
    }

    /// Construct the root dentry, whose parent link points back to itself.
    pub fn new_root(name: String) -> Arc<Self> {
        let root = Self::new(name);
        *root.parent.write() = Arc::downgrade(&root);
        root
    }

    pub fn set_parent(&self, parent: &Arc<Dentry<Private>>) {
        *self.parent.write() = Arc::downgrade(parent);
    }

    pub fn parent(&self) -> Option<Arc<Dentry<Private>>> {
        self.parent.read().upgrade()
    }

    pub fn bind_inode(&self, inode: Inode<Private>) {
        *self.inode.write() = Some(Arc::new(RwLock::new(inode)));
    }
}

/// Operations a filesystem publishes against its superblock.
pub trait SuperblockOps<Private> {
    /// Flush superblock-level metadata (FSInfo hints, etc). A no-op is a
    /// conforming implementation when there is nothing dirty to flush.
    fn write_superblock(&self) -> Result<(), FsError>;

    /// Release the superblock, its root dentry and root inode.
    fn put_superblock(self);

    /// Persist an inode's VFS-visible fields (size, first cluster) back to
    /// its on-disk directory entry.
    fn write_inode(&self, inode: &Inode<Private>) -> Result<(), FsError>;
}

/// Operations a filesystem publishes against an inode.
///
/// Only `lookup` has a core implementation here; everything that mutates
/// the filesystem is out of scope and returns [`FsError::ReadOnly`] so
/// that callers get a typed, stable answer rather than a stub panic.
pub trait InodeOps<Private> {
    fn lookup(
        &self,
        parent: &Inode<Private>,
        target: &Arc<Dentry<Private>>,
    ) -> Result<(), FsError>;

    fn create(&self, _parent: &Inode<Private>, _name: &str) -> Result<(), FsError> {
        Err(FsError::ReadOnly)
    }

    fn mkdir(&self, _parent: &Inode<Private>, _name: &str) -> Result<(), FsError> {
        Err(FsError::ReadOnly)
    }

    fn rmdir(&self, _parent: &Inode<Private>, _name: &str) -> Result<(), FsError> {
        Err(FsError::ReadOnly)
    }

    fn rename(&self, _old: &Inode<Private>, _new: &Inode<Private>, _name: &str) -> Result<(), FsError> {
        Err(FsError::ReadOnly)
    }

    fn get_attr(&self, _dentry: &Dentry<Private>) -> Result<(), FsError> {
        Err(FsError::PermissionDenied)
    }

    fn set_attr(&self, _dentry: &Dentry<Private>) -> Result<(), FsError> {
        Err(FsError::ReadOnly)
    }
}

/// Flags accepted by `path_walk`.
pub mod path_walk_flags {
    /// Resolve to the dentry of the final component's *parent* directory
    /// rather than the component itself.
    pub const RETURN_PARENT: u64 = 1;
}

/// Descriptor a filesystem registers with the mount machinery.
pub struct FilesystemType {
    pub name: &'static str,
    pub flags: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopPriv;

    #[test]
    fn root_dentry_is_its_own_parent() {
        let root = Dentry::<NoopPriv>::new_root(String::from("/"));
        assert!(Arc::ptr_eq(&root.parent().unwrap(), &root));
    }

    #[test]
    fn child_parent_link_does_not_keep_child_alive() {
        let root = Dentry::<NoopPriv>::new_root(String::from("/"));
        let child = Dentry::<NoopPriv>::new(String::from("child"));
        child.set_parent(&root);
        assert!(Arc::ptr_eq(&child.parent().unwrap(), &root));
        drop(child);
        // root holds no strong reference to child, so nothing leaked.
    }
}
