use std::path::{Path, PathBuf};

use crate::error::ShardError;
use crate::fragment::{split_file, SplitReport};

/// fragment count used when none is given
pub const DEFAULT_FRAGMENTS: usize = 4;

pub fn prepare() -> SplitApi {
    SplitApi::default()
}

#[derive(Default, Debug)]
pub struct SplitApi {
    source: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    fragments: Option<usize>,
}

impl SplitApi {
    /// The file that gets split
    pub fn with_source<A: AsRef<Path>>(mut self, source: A) -> Self {
        self.source = Some(source.as_ref().to_path_buf());
        self
    }

    /// The folder the fragment files and the digest sidecar are written to
    pub fn into_output_folder<A: AsRef<Path>>(mut self, output_folder: A) -> Self {
        self.output_folder = Some(output_folder.as_ref().to_path_buf());
        self
    }

    pub fn with_fragments(mut self, fragments: usize) -> Self {
        self.fragments = Some(fragments);
        self
    }

    pub fn execute(self) -> Result<SplitReport, ShardError> {
        let Some(source) = self.source else {
            return Err(ShardError::MissingArgument("source file"));
        };
        let Some(output_folder) = self.output_folder else {
            return Err(ShardError::MissingArgument("output folder"));
        };

        split_file(
            &source,
            &output_folder,
            self.fragments.unwrap_or(DEFAULT_FRAGMENTS),
        )
    }
}
