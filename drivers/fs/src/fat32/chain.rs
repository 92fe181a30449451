//! Cluster-chain iterator: translates a FAT chain into a lazy sequence of
//! data LBAs. Not restartable — each traversal re-reads the FAT from the
//! given start cluster. Bounded by `total_clusters` so a corrupt or
//! cyclic FAT cannot spin the walk forever.

use crate::fat32::boot_sector::Geometry;
use crate::fat32::table::{self, is_end_of_chain};
use crate::FsError;
use rinux_block::device::BlockDevice;

#[derive(Debug, Clone, Copy)]
pub struct ClusterChainEntry {
    pub cluster: u32,
    pub data_lba: u64,
    pub sectors_per_cluster: u8,
}

pub struct ClusterChainIter<'a> {
    device: &'a dyn BlockDevice,
    geometry: &'a Geometry,
    next: Option<u32>,
    pending_error: Option<FsError>,
    steps: u64,
}

impl<'a> ClusterChainIter<'a> {
    pub fn new(device: &'a dyn BlockDevice, geometry: &'a Geometry, start_cluster: u32) -> Self {
        ClusterChainIter {
            device,
            geometry,
            next: Some(start_cluster),
            pending_error: None,
            steps: 0,
        }
    }
}

impl<'a> Iterator for ClusterChainIter<'a> {
    type Item = Result<ClusterChainEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err));
        }

        let cluster = self.next?;

        if self.steps >= self.geometry.total_clusters {
            self.next = None;
            return Some(Err(FsError::CorruptChain));
        }
        self.steps += 1;

        let entry = ClusterChainEntry {
            cluster,
            data_lba: self.geometry.cluster_to_lba(cluster),
            sectors_per_cluster: self.geometry.sectors_per_cluster,
        };

        match table::read_fat_entry(self.device, self.geometry, cluster) {
            Ok(value) if is_end_of_chain(value) => self.next = None,
            Ok(value) => self.next = Some(value),
            Err(err) => {
                self.next = None;
                self.pending_error = Some(err);
            }
        }

        Some(Ok(entry))
    }
}
