use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardError {
    /// Represents a fragment count below the minimum of 3
    #[error("Invalid fragment count {0}: at least 3 fragments are required")]
    InvalidFragmentCount(usize),

    /// Represents a channel count outside of 1..=3
    #[error("Invalid channel count {0}: only 1, 2 or 3 color channels can be used")]
    InvalidChannelCount(u8),

    /// Represents a header field that does not fit into its reserved digit width
    #[error("Header field `{field}` value {value} exceeds its {width} digit budget")]
    HeaderFieldOverflow {
        field: &'static str,
        value: u64,
        width: usize,
    },

    /// Represents an unknown placement policy name
    #[error("Unknown placement mode `{0}`")]
    UnknownPlacement(String),

    /// Represents a malformed `name=path` destination entry
    #[error("Invalid destination `{0}`, expected `name=relative/path`")]
    InvalidDestination(String),

    #[error("Argument Error: {0}")]
    MissingArgument(&'static str),

    #[error(
        "Capacity Error: the carrier {width}x{height} with {channels} channel(s) holds {capacity} bits, but {needed} bits are needed"
    )]
    CapacityExceeded {
        width: u32,
        height: u32,
        channels: u8,
        capacity: u64,
        needed: u64,
    },

    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Mapping file not found: {0}")]
    MappingFileNotFound(PathBuf),

    #[error("No fragment files `part_*.bin` found in {0}")]
    NoFragmentFiles(PathBuf),

    #[error("No carrier images found in {0}")]
    NoCarrierImages(PathBuf),

    #[error("Not enough carrier images ({images}) for {fragments} fragments")]
    NotEnoughCarriers { images: usize, fragments: usize },

    #[error("No fragment found in any image below {0}")]
    NoFragmentsFound(PathBuf),

    /// Represents an unsupported carrier media, anything else than PNG or JPEG
    #[error("Media format is not supported")]
    UnsupportedMedia,

    /// Represents an invalid carrier image media. For example, a broken PNG file
    #[error("Image media is invalid")]
    InvalidImageMedia,

    /// Represents a failure when encoding an image file.
    #[error("Image encoding error")]
    ImageEncodingError,

    #[error("No fragments were provided for reassembly")]
    EmptyReassembly,

    #[error("Missing fragments: {0:?}")]
    MissingFragments(Vec<u32>),

    /// The chunks produced by a split did not concatenate back to the input
    #[error("Split verification failed: fragments do not reproduce the source")]
    SplitVerificationFailed,

    #[error("Execution of {program} failed")]
    ExecutionFailed {
        program: String,
        source: std::io::Error,
    },

    /// Represents a failure to read from input.
    #[error("Read error")]
    ReadError { source: std::io::Error },

    /// Represents a failure to write target file.
    #[error("Write error")]
    WriteError { source: std::io::Error },

    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

/// Failure classes a stage can end with, each with its own process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadArgument,
    MissingInput,
    Capacity,
    Reconstruction,
    Io,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Io => 1,
            ErrorCategory::BadArgument => 2,
            ErrorCategory::MissingInput => 3,
            ErrorCategory::Capacity => 4,
            ErrorCategory::Reconstruction => 5,
        }
    }
}

impl ShardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShardError::InvalidFragmentCount(_)
            | ShardError::InvalidChannelCount(_)
            | ShardError::HeaderFieldOverflow { .. }
            | ShardError::UnknownPlacement(_)
            | ShardError::InvalidDestination(_)
            | ShardError::MissingArgument(_)
            | ShardError::UnsupportedMedia => ErrorCategory::BadArgument,
            ShardError::SourceNotFound(_)
            | ShardError::DirectoryNotFound(_)
            | ShardError::MappingFileNotFound(_)
            | ShardError::NoFragmentFiles(_)
            | ShardError::NoCarrierImages(_)
            | ShardError::NotEnoughCarriers { .. }
            | ShardError::InvalidImageMedia => ErrorCategory::MissingInput,
            ShardError::CapacityExceeded { .. } => ErrorCategory::Capacity,
            ShardError::NoFragmentsFound(_)
            | ShardError::EmptyReassembly
            | ShardError::MissingFragments(_)
            | ShardError::SplitVerificationFailed => ErrorCategory::Reconstruction,
            ShardError::ImageEncodingError
            | ShardError::ExecutionFailed { .. }
            | ShardError::ReadError { .. }
            | ShardError::WriteError { .. }
            | ShardError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_give_each_failure_class_a_distinct_exit_code() {
        let codes = [
            ShardError::InvalidChannelCount(7).exit_code(),
            ShardError::SourceNotFound("x".into()).exit_code(),
            ShardError::CapacityExceeded {
                width: 8,
                height: 8,
                channels: 3,
                capacity: 192,
                needed: 224,
            }
            .exit_code(),
            ShardError::MissingFragments(vec![2]).exit_code(),
        ];

        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn should_list_missing_fragments_in_message() {
        let e = ShardError::MissingFragments(vec![2, 5]);
        assert_eq!(e.to_string(), "Missing fragments: [2, 5]");
    }
}
