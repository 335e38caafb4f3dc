use std::path::{Path, PathBuf};

use log::info;

use crate::distribute::{plan, DestinationSet, DistributionPlan, MappingTable, Placement, PlacementMode};
use crate::error::ShardError;
use crate::media::list_images;

pub fn prepare() -> DistributeApi {
    DistributeApi::default()
}

#[derive(Debug)]
pub struct DistributeApi {
    stego_folder: Option<PathBuf>,
    destination_root: Option<PathBuf>,
    destinations: Vec<String>,
    mode: PlacementMode,
    mapping_file: Option<PathBuf>,
    seed: Option<u64>,
    dry_run: bool,
}

impl Default for DistributeApi {
    fn default() -> Self {
        Self {
            stego_folder: None,
            destination_root: None,
            destinations: Vec::new(),
            mode: PlacementMode::Random,
            mapping_file: None,
            seed: None,
            dry_run: false,
        }
    }
}

impl DistributeApi {
    /// Folder holding the stego images to scatter
    pub fn from_stego_folder<A: AsRef<Path>>(mut self, folder: A) -> Self {
        self.stego_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    /// Root all destinations are relative to
    pub fn into_destination_root<A: AsRef<Path>>(mut self, root: A) -> Self {
        self.destination_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Adds a `name=relative/path` destination, without any the default layout is used
    pub fn with_destination(mut self, spec: impl Into<String>) -> Self {
        self.destinations.push(spec.into());
        self
    }

    pub fn with_mode(mut self, mode: PlacementMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn use_mapping_file<A: AsRef<Path>>(mut self, file: A) -> Self {
        self.mapping_file = Some(file.as_ref().to_path_buf());
        self
    }

    /// Makes random placement reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn execute(self) -> Result<DistributionPlan, ShardError> {
        let Some(stego_folder) = self.stego_folder else {
            return Err(ShardError::MissingArgument("stego folder"));
        };
        let Some(root) = self.destination_root else {
            return Err(ShardError::MissingArgument("destination root"));
        };

        let images = list_images(&stego_folder)?;
        if images.is_empty() {
            return Err(ShardError::NoCarrierImages(stego_folder));
        }

        let destinations = if self.destinations.is_empty() {
            DestinationSet::default_layout(&root)
        } else {
            DestinationSet::from_specs(&root, self.destinations.as_slice())?
        };

        let placement = match self.mode {
            PlacementMode::Random => Placement::Random { seed: self.seed },
            PlacementMode::RoundRobin => Placement::RoundRobin,
            PlacementMode::Mapping => {
                let Some(file) = self.mapping_file else {
                    return Err(ShardError::MissingArgument("mapping file"));
                };
                Placement::Mapping(MappingTable::load(&file)?)
            }
        };

        if !self.dry_run {
            destinations.ensure()?;
        }
        let plan = plan(&images, &destinations, &placement)?;
        plan.apply(self.dry_run)?;
        info!(
            "{} {} images below {:?}",
            if self.dry_run { "would place" } else { "placed" },
            plan.copies.len(),
            root
        );

        Ok(plan)
    }
}
