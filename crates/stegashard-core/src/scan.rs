use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ShardError;
use crate::extract::{extract_file, ExtractOptions};
use crate::fragment::Fragment;
use crate::media::is_image_file;
use crate::result::Result;

/// Fragments collected so far, keyed by their index.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReassemblyState {
    fragments: BTreeMap<u32, Vec<u8>>,
    total: Option<u32>,
}

impl ReassemblyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fragment found in `origin`, returns false if its index was already known.
    ///
    /// The first occurrence of an index wins. A `total` different from the first one seen is only reported.
    pub fn accept(&mut self, fragment: Fragment, origin: &Path) -> bool {
        match self.total {
            None => self.total = Some(fragment.total),
            Some(total) if total != fragment.total => {
                warn!(
                    "inconsistent total {} vs {} in {:?}",
                    total, fragment.total, origin
                );
            }
            Some(_) => {}
        }

        if self.fragments.contains_key(&fragment.index) {
            warn!(
                "duplicate fragment {} in {:?}, keeping the first occurrence",
                fragment.index, origin
            );
            return false;
        }

        info!(
            "found fragment {}/{} in {:?}",
            fragment.index, fragment.total, origin
        );
        self.fragments.insert(fragment.index, fragment.payload);
        true
    }

    /// the total announced by the first fragment
    pub fn total(&self) -> Option<u32> {
        self.total
    }

    pub fn fragments(&self) -> &BTreeMap<u32, Vec<u8>> {
        &self.fragments
    }

    pub fn into_fragments(self) -> BTreeMap<u32, Vec<u8>> {
        self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[derive(Debug)]
pub struct ScanReport {
    pub state: ReassemblyState,
    pub images_seen: usize,
    pub fragments_found: usize,
}

/// Walks a directory tree and collects the fragments hidden in its images.
#[derive(Debug, Default)]
pub struct Scanner {
    options: ExtractOptions,
}

impl Scanner {
    pub fn new(options: ExtractOptions) -> Self {
        Self { options }
    }

    /// Scans every image below `root`, images that carry no fragment or cannot be read are skipped.
    pub fn scan(&self, root: &Path) -> Result<ScanReport> {
        if !root.exists() {
            return Err(ShardError::DirectoryNotFound(root.to_path_buf()));
        }

        let images = list_images_recursive(root);
        let mut state = ReassemblyState::new();
        let mut fragments_found = 0;

        for image in &images {
            match extract_file(image, &self.options) {
                Ok(Some(fragment)) => {
                    fragments_found += 1;
                    state.accept(fragment, image);
                }
                Ok(None) => debug!("no fragment in {image:?}"),
                Err(e) => debug!("skipping {image:?}: {e}"),
            }
        }

        Ok(ScanReport {
            state,
            images_seen: images.len(),
            fragments_found,
        })
    }
}

/// All image files below `root` in a stable, sorted walk order.
pub fn list_images_recursive(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("cannot access directory entry: {e}, skipping");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_image_file(e.path()))
        .map(|e| e.into_path())
        .collect()
}
