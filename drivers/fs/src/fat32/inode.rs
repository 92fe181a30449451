//! Path walker, inode flush, and the superblock that owns a FAT32 mount.
//!
//! Ties components A-D together into the `SuperblockOps`/`InodeOps`
//! vtables the VFS contract expects.

use crate::fat32::boot_sector::{self, FsInfo, Geometry};
use crate::fat32::chain::ClusterChainIter;
use crate::fat32::dir_entry::{self, ATTR_DIRECTORY, ATTR_LONG_NAME, NAME_DELETED, NAME_FREE, NAME_LITERAL_E5};
use crate::vfs::{self, Dentry, Inode, InodeAttribute};
use crate::FsError;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use rinux_block::device::BlockDevice;
use rinux_block::partition::MbrPartitionEntry;

/// Timestamps are carried through unread; nothing in this driver decodes
/// the packed FAT date/time format.
#[derive(Debug, Clone, Copy, Default)]
pub struct FatTimestamp {
    pub date: u16,
    pub time: u16,
}

/// Private inode payload: everything needed to locate and rewrite the
/// owning 32-byte directory entry.
#[derive(Debug, Clone, Copy)]
pub struct Fat32InodeInfo {
    pub first_cluster: u32,
    /// 0 is the root sentinel; writing to the root inode is refused.
    pub dentry_location_cluster: u32,
    pub dentry_location_offset: u32,
    pub created: FatTimestamp,
    pub modified: FatTimestamp,
}

pub struct Fat32Superblock {
    pub device: Arc<dyn BlockDevice>,
    pub geometry: Geometry,
    pub fsinfo: FsInfo,
    pub root: Arc<Dentry<Fat32InodeInfo>>,
}

fn is_fat32_partition_type(partition_type: u8) -> bool {
    matches!(partition_type, 0x0B | 0x0C | 0x1B | 0x1C)
}

fn blocks_for_size(size: u64, geometry: &Geometry) -> u64 {
    if size == 0 {
        return 0;
    }
    let clusters = (size + geometry.bytes_per_cluster as u64 - 1) / geometry.bytes_per_cluster as u64;
    clusters * geometry.sectors_per_cluster as u64
}

/// `mount(device_id, partition_index) -> Superblock`
pub fn mount(device: Arc<dyn BlockDevice>, partition_index: usize) -> Result<Arc<Fat32Superblock>, FsError> {
    let entry: MbrPartitionEntry = rinux_block::partition::partition(device.clone(), partition_index)?;
    if entry.is_empty() || !is_fat32_partition_type(entry.partition_type) {
        return Err(FsError::InvalidArgument);
    }

    let mut boot_sector_buf = vec![0u8; 512];
    device.read_blocks(entry.starting_lba, &mut boot_sector_buf)?;
    let geometry = boot_sector::parse_boot_sector(&boot_sector_buf, entry.starting_lba, entry.total_sectors)?;

    let mut fsinfo_buf = vec![0u8; geometry.bytes_per_sector as usize];
    device.read_blocks(geometry.fsinfo_lba, &mut fsinfo_buf)?;
    let fsinfo = boot_sector::parse_fsinfo(&fsinfo_buf);

    let root = Dentry::new_root(String::from("/"));
    root.bind_inode(Inode {
        attribute: InodeAttribute::Directory,
        file_size: 0,
        blocks: 0,
        private: Fat32InodeInfo {
            first_cluster: geometry.root_cluster,
            dentry_location_cluster: 0,
            dentry_location_offset: 0,
            created: FatTimestamp::default(),
            modified: FatTimestamp::default(),
        },
    });

    kernel::kinfo!(
        "fat32: mounted partition {} at lba {} ({} clusters)",
        partition_index,
        entry.starting_lba,
        geometry.total_clusters
    );

    Ok(Arc::new(Fat32Superblock {
        device,
        geometry,
        fsinfo,
        root,
    }))
}

/// `lookup(parent_inode, target_dentry) -> dentry | NotFound`
pub fn lookup(
    sb: &Fat32Superblock,
    parent: &Inode<Fat32InodeInfo>,
    target: &Arc<Dentry<Fat32InodeInfo>>,
) -> Result<(), FsError> {
    let target_bytes = target.name.as_bytes();
    let target_utf16: Vec<u16> = target.name.encode_utf16().collect();
    let bytes_per_cluster = sb.geometry.bytes_per_cluster as usize;
    let entries_per_cluster = bytes_per_cluster / dir_entry::DIR_ENTRY_SIZE;

    let chain = ClusterChainIter::new(sb.device.as_ref(), &sb.geometry, parent.private.first_cluster);

    for chain_entry in chain {
        let chain_entry = chain_entry?;
        let mut buf = vec![0u8; bytes_per_cluster];
        sb.device.read_blocks(chain_entry.data_lba, &mut buf)?;

        let mut i = 0usize;
        while i < entries_per_cluster {
            let offset = i * dir_entry::DIR_ENTRY_SIZE;
            let raw = &buf[offset..offset + dir_entry::DIR_ENTRY_SIZE];
            let first_byte = raw[0];
            let attr = raw[11];

            if attr == ATTR_LONG_NAME {
                i += 1;
                continue;
            }
            if first_byte == NAME_FREE {
                // Canonical semantics: an unused entry ends the directory.
                return Err(FsError::NotFound);
            }
            if first_byte == NAME_LITERAL_E5 || first_byte == NAME_DELETED {
                i += 1;
                continue;
            }

            let sfn = dir_entry::parse_sfn(raw);
            let fragments = dir_entry::collect_preceding_lfns(&buf, i);
            let matched = (!fragments.is_empty() && dir_entry::matches_lfn_chain(&fragments, &target_utf16))
                || dir_entry::matches_sfn(&sfn, target_bytes);

            if matched {
                let is_dir = sfn.attr & ATTR_DIRECTORY != 0;
                let first_cluster = ((sfn.fst_clus_hi as u32) << 16) | sfn.fst_clus_lo as u32;
                let file_size = sfn.file_size as u64;
                target.bind_inode(Inode {
                    attribute: if is_dir { InodeAttribute::Directory } else { InodeAttribute::File },
                    file_size,
                    blocks: blocks_for_size(file_size, &sb.geometry),
                    private: Fat32InodeInfo {
                        first_cluster,
                        dentry_location_cluster: chain_entry.cluster,
                        dentry_location_offset: offset as u32,
                        created: FatTimestamp {
                            date: sfn.crt_date,
                            time: sfn.crt_time,
                        },
                        modified: FatTimestamp {
                            date: sfn.wrt_date,
                            time: sfn.wrt_time,
                        },
                    },
                });
                return Ok(());
            }

            i += 1;
        }
    }

    Err(FsError::NotFound)
}

/// `path_walk(path, flags) -> dentry | NotFound`
pub fn path_walk(
    sb: &Arc<Fat32Superblock>,
    path: &str,
    flags: u64,
) -> Result<Arc<Dentry<Fat32InodeInfo>>, FsError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return Ok(sb.root.clone());
    }

    let components: Vec<&str> = trimmed.split('/').filter(|segment| !segment.is_empty()).collect();
    let mut parent = sb.root.clone();
    let mut last_child: Option<Arc<Dentry<Fat32InodeInfo>>> = None;

    for (idx, component) in components.iter().enumerate() {
        let child = Dentry::new(String::from(*component));
        child.set_parent(&parent);

        let parent_inode = parent.inode.read().clone().ok_or(FsError::NotFound)?;
        {
            let parent_inode = parent_inode.read();
            lookup(sb, &parent_inode, &child)?;
        }

        parent.children.write().push(child.clone());
        let child_is_dir = child
            .inode
            .read()
            .as_ref()
            .map(|inode| inode.read().attribute == InodeAttribute::Directory)
            .unwrap_or(false);
        if child_is_dir {
            parent.subdirs.write().push(child.clone());
        }

        if idx + 1 == components.len() {
            last_child = Some(child);
        } else {
            parent = child;
        }
    }

    if flags & vfs::path_walk_flags::RETURN_PARENT != 0 {
        Ok(parent)
    } else {
        last_child.ok_or(FsError::NotFound)
    }
}

/// `write_inode(inode)`: patch `DIR_FileSize`/`DIR_FstClusLO`/`DIR_FstClusHI`
/// in place, preserving the reserved top 4 bits of the HI field.
pub fn write_inode(sb: &Fat32Superblock, inode: &Inode<Fat32InodeInfo>) -> Result<(), FsError> {
    if inode.private.dentry_location_cluster == 0 {
        return Err(FsError::RefusedRootInodeWrite);
    }

    let lba = sb.geometry.cluster_to_lba(inode.private.dentry_location_cluster);
    let bytes_per_cluster = sb.geometry.bytes_per_cluster as usize;
    let mut buf = vec![0u8; bytes_per_cluster];
    sb.device.read_blocks(lba, &mut buf)?;

    let offset = inode.private.dentry_location_offset as usize;
    buf[offset + 28..offset + 32].copy_from_slice(&(inode.file_size as u32).to_le_bytes());

    let old_hi = u16::from_le_bytes([buf[offset + 20], buf[offset + 21]]);
    let new_hi = (old_hi & 0xF000) | (((inode.private.first_cluster >> 16) & 0x0FFF) as u16);
    buf[offset + 20..offset + 22].copy_from_slice(&new_hi.to_le_bytes());
    buf[offset + 26..offset + 28]
        .copy_from_slice(&((inode.private.first_cluster & 0xFFFF) as u16).to_le_bytes());

    sb.device.write_blocks(lba, &buf)?;
    Ok(())
}

impl vfs::SuperblockOps<Fat32InodeInfo> for Fat32Superblock {
    fn write_superblock(&self) -> Result<(), FsError> {
        Ok(())
    }

    fn put_superblock(self) {
        kernel::kinfo!("fat32: unmounted {}", self.device.name());
        // geometry, root inode and root dentry drop in field declaration
        // order as `self` goes out of scope.
    }

    fn write_inode(&self, inode: &Inode<Fat32InodeInfo>) -> Result<(), FsError> {
        write_inode(self, inode)
    }
}

impl vfs::InodeOps<Fat32InodeInfo> for Fat32Superblock {
    fn lookup(&self, parent: &Inode<Fat32InodeInfo>, target: &Arc<Dentry<Fat32InodeInfo>>) -> Result<(), FsError> {
        lookup(self, parent, target)
    }
}
