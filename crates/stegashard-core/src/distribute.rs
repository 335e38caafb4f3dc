//! Scatters stego images over a set of destination directories.
//!
//! Planning is pure, [`DistributionPlan::apply`] is the only part touching the filesystem.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::ShardError;
use crate::result::Result;

/// destinations used when none are given explicitly, as `(name, path below the root)`
pub const DEFAULT_DESTINATIONS: [(&str, &str); 3] = [
    ("vacances", "Images/vacances"),
    ("famille", "Images/famille"),
    ("downloads", "Downloads"),
];

/// Named destination directories below a common root, in a fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSet {
    root: PathBuf,
    entries: Vec<(String, PathBuf)>,
}

impl DestinationSet {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            entries: Vec::new(),
        }
    }

    pub fn default_layout(root: impl AsRef<Path>) -> Self {
        DEFAULT_DESTINATIONS
            .iter()
            .fold(Self::new(root), |set, (name, rel)| set.with(*name, rel))
    }

    /// Builds the set from `name=relative/path` entries.
    pub fn from_specs<S: AsRef<str>>(root: impl AsRef<Path>, specs: &[S]) -> Result<Self> {
        let mut set = Self::new(root);
        for spec in specs {
            let spec = spec.as_ref();
            let Some((name, rel)) = spec.split_once('=') else {
                return Err(ShardError::InvalidDestination(spec.to_string()));
            };
            let (name, rel) = (name.trim(), rel.trim());
            if name.is_empty() || rel.is_empty() || set.get(name).is_some() {
                return Err(ShardError::InvalidDestination(spec.to_string()));
            }
            set = set.with(name, rel);
        }
        Ok(set)
    }

    /// Adds a destination, `rel` is resolved against the root.
    pub fn with(mut self, name: impl Into<String>, rel: impl AsRef<Path>) -> Self {
        let path = self.root.join(rel);
        self.entries.push((name.into(), path));
        self
    }

    /// creates all destination directories, existing ones are fine
    pub fn ensure(&self) -> Result<()> {
        for (_, dir) in &self.entries {
            fs::create_dir_all(dir).map_err(|source| ShardError::WriteError { source })?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.as_path())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `file name → destination` pairs read from a mapping file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable(HashMap<String, String>);

impl MappingTable {
    /// Loads a mapping file, one `filename,destination` pair per line.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ShardError::MappingFileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ShardError::ReadError { source })?;
        Ok(Self::parse(&content))
    }

    /// Blank lines and `#` comments are ignored, malformed lines are skipped with a warning.
    pub fn parse(content: &str) -> Self {
        let mut table = HashMap::new();
        for (no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(',') {
                Some((file, target)) if !file.trim().is_empty() && !target.trim().is_empty() => {
                    table.insert(file.trim().to_string(), target.trim().to_string());
                }
                _ => warn!("skipping malformed mapping line {}: {line:?}", no + 1),
            }
        }
        Self(table)
    }

    pub fn insert(&mut self, file: impl Into<String>, target: impl Into<String>) {
        self.0.insert(file.into(), target.into());
    }

    pub fn get(&self, file: &str) -> Option<&str> {
        self.0.get(file).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// uniformly random destination, reproducible when seeded
    Random { seed: Option<u64> },
    /// destination `i mod n` for the i-th image
    RoundRobin,
    /// destination looked up by file name
    Mapping(MappingTable),
}

/// names of the placement modes as accepted by [`PlacementMode::from_str`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    Random,
    RoundRobin,
    Mapping,
}

impl FromStr for PlacementMode {
    type Err = ShardError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "roundrobin" | "round-robin" => Ok(Self::RoundRobin),
            "mapping" => Ok(Self::Mapping),
            _ => Err(ShardError::UnknownPlacement(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl PlannedCopy {
    pub fn target(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.destination.join(name),
            None => self.destination.clone(),
        }
    }
}

impl fmt::Display for PlannedCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        write!(f, "{} -> {}", name, self.destination.display())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPlan {
    pub copies: Vec<PlannedCopy>,
    /// images without a mapping entry
    pub skipped: Vec<PathBuf>,
}

impl DistributionPlan {
    /// Copies every image to its destination, creating directories on demand.
    ///
    /// With `dry_run` nothing is written, the plan is only logged.
    pub fn apply(&self, dry_run: bool) -> Result<()> {
        for copy in &self.copies {
            if dry_run {
                info!("[dry-run] {copy}");
                continue;
            }
            fs::create_dir_all(&copy.destination)
                .map_err(|source| ShardError::WriteError { source })?;
            fs::copy(&copy.source, copy.target())
                .map_err(|source| ShardError::WriteError { source })?;
            info!("copied {copy}");
        }
        Ok(())
    }

    fn push(&mut self, image: &Path, destinations: &DestinationSet, name: &str) {
        if let Some(dir) = destinations.get(name) {
            self.copies.push(PlannedCopy {
                source: image.to_path_buf(),
                destination: dir.to_path_buf(),
            });
        }
    }
}

/// Decides for every image where it goes, without touching the filesystem.
pub fn plan(
    images: &[PathBuf],
    destinations: &DestinationSet,
    placement: &Placement,
) -> Result<DistributionPlan> {
    let mut plan = DistributionPlan::default();

    match placement {
        Placement::Random { seed } => {
            let names = destination_names(destinations)?;
            let mut rng = match seed {
                Some(seed) => ChaCha20Rng::seed_from_u64(*seed),
                None => ChaCha20Rng::from_entropy(),
            };
            for image in images {
                let Some(name) = names.choose(&mut rng) else {
                    continue;
                };
                plan.push(image, destinations, name);
            }
        }
        Placement::RoundRobin => {
            let names = destination_names(destinations)?;
            for (i, image) in images.iter().enumerate() {
                plan.push(image, destinations, names[i % names.len()]);
            }
        }
        Placement::Mapping(table) => {
            for image in images {
                let name = image
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                match table.get(&name) {
                    Some(target) => {
                        let destination = match destinations.get(target) {
                            Some(dir) => dir.to_path_buf(),
                            None => destinations.root().join(target),
                        };
                        plan.copies.push(PlannedCopy {
                            source: image.clone(),
                            destination,
                        });
                    }
                    None => {
                        warn!("no mapping entry for {name}, skipping");
                        plan.skipped.push(image.clone());
                    }
                }
            }
        }
    }
    debug!(
        "planned {} copies, skipped {}",
        plan.copies.len(),
        plan.skipped.len()
    );

    Ok(plan)
}

fn destination_names(destinations: &DestinationSet) -> Result<Vec<&str>> {
    if destinations.is_empty() {
        return Err(ShardError::MissingArgument("at least one destination"));
    }
    Ok(destinations.names().collect())
}
