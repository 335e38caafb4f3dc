use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::ShardError;
use crate::extract::ExtractOptions;
use crate::fragment::{digest, read_digest_file, read_digest_sidecar};
use crate::media::Channels;
use crate::reassemble::{reassemble, verify, DigestCheck, Executor};
use crate::scan::Scanner;

pub const DEFAULT_OUTPUT_NAME: &str = "reconstructed.bin";

pub fn prepare() -> ReconstructApi {
    ReconstructApi::default()
}

#[derive(Default, Debug)]
pub struct ReconstructApi {
    root: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    output_name: Option<String>,
    digest_file: Option<PathBuf>,
    options: ExtractOptions,
}

/// Outcome of a reconstruction, the digest check is advisory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructReport {
    pub output_file: PathBuf,
    pub digest: String,
    pub check: DigestCheck,
    /// fragment indices that went into the file
    pub fragments: Vec<u32>,
    /// the total announced by the first fragment found
    pub total: Option<u32>,
    pub images_seen: usize,
}

impl ReconstructReport {
    /// Hands the reconstructed file to `executor` and returns the exit code of the run.
    pub fn hand_off(&self, executor: &dyn Executor, arg: Option<&str>) -> Result<i32, ShardError> {
        executor.execute(&self.output_file, arg)
    }
}

impl ReconstructApi {
    /// The directory tree that is searched for stego images
    pub fn from_root<A: AsRef<Path>>(mut self, root: A) -> Self {
        self.root = Some(root.as_ref().to_path_buf());
        self
    }

    pub fn into_output_folder<A: AsRef<Path>>(mut self, folder: A) -> Self {
        self.output_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    /// file name of the reconstructed file, defaults to [`DEFAULT_OUTPUT_NAME`]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Compares against this digest file instead of the sidecar in the output folder
    pub fn verify_against<A: AsRef<Path>>(mut self, digest_file: A) -> Self {
        self.digest_file = Some(digest_file.as_ref().to_path_buf());
        self
    }

    /// Only tries the given channel count instead of detecting it
    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.options.channels = Some(channels);
        self
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn execute(self) -> Result<ReconstructReport, ShardError> {
        let Some(root) = self.root else {
            return Err(ShardError::MissingArgument("root folder"));
        };
        let Some(output_folder) = self.output_folder else {
            return Err(ShardError::MissingArgument("output folder"));
        };

        let report = Scanner::new(self.options).scan(&root)?;
        if report.images_seen == 0 {
            return Err(ShardError::NoCarrierImages(root));
        }
        if report.state.is_empty() {
            return Err(ShardError::NoFragmentsFound(root));
        }

        let total = report.state.total();
        let fragments = report.state.into_fragments();
        let indices: Vec<u32> = fragments.keys().copied().collect();
        if let Some(total) = total {
            if indices.len() < total as usize {
                warn!("found {} of {} announced fragments", indices.len(), total);
            }
        }
        let data = reassemble(&fragments)?;

        fs::create_dir_all(&output_folder).map_err(|source| ShardError::WriteError { source })?;
        let output_file =
            output_folder.join(self.output_name.as_deref().unwrap_or(DEFAULT_OUTPUT_NAME));
        fs::write(&output_file, &data).map_err(|source| ShardError::WriteError { source })?;

        let expected = match &self.digest_file {
            Some(file) => read_digest_file(file)?,
            None => read_digest_sidecar(&output_folder)?,
        };
        let check = verify(&data, expected.as_deref());
        info!(
            "reconstructed {:?} from {} fragments ({} bytes), digest {}",
            output_file,
            indices.len(),
            data.len(),
            check
        );

        Ok(ReconstructReport {
            output_file,
            digest: digest(&data),
            check,
            fragments: indices,
            total,
            images_seen: report.images_seen,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::{embed_fragment, EmbedOptions};
    use crate::fragment::{Fragment, DIGEST_SIDECAR};
    use crate::test_utils::prepare_noise_carrier;
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn hide(dir: &Path, fragment: &Fragment) {
        fs::create_dir_all(dir).unwrap();
        embed_fragment(
            &prepare_noise_carrier(12, 12, fragment.index),
            fragment,
            &EmbedOptions::default(),
        )
        .unwrap()
        .save_png(&dir.join(format!("stego_{:02}_img.png", fragment.index)))
        .unwrap();
    }

    #[derive(Default)]
    struct RecordingExecutor {
        calls: RefCell<Vec<(PathBuf, Option<String>)>>,
    }

    impl Executor for RecordingExecutor {
        fn execute(&self, program: &Path, arg: Option<&str>) -> Result<i32, ShardError> {
            self.calls
                .borrow_mut()
                .push((program.to_path_buf(), arg.map(str::to_string)));
            Ok(3)
        }
    }

    #[test]
    fn should_reconstruct_and_verify_against_the_sidecar() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("victim");
        hide(&root.join("Downloads"), &Fragment::new(2, 3, b"o Wo".to_vec()));
        hide(&root.join("Images"), &Fragment::new(1, 3, b"Hell".to_vec()));
        hide(&root, &Fragment::new(3, 3, b"rld!".to_vec()));

        let out = temp_dir.path().join("reconstruction");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join(DIGEST_SIDECAR), digest(b"Hello World!")).unwrap();

        let report = prepare()
            .from_root(&root)
            .into_output_folder(&out)
            .execute()
            .unwrap();

        assert_eq!(fs::read(&report.output_file).unwrap(), b"Hello World!");
        assert_eq!(report.output_file, out.join(DEFAULT_OUTPUT_NAME));
        assert_eq!(report.check, DigestCheck::Match);
        assert_eq!(report.fragments, vec![1, 2, 3]);
        assert_eq!(report.total, Some(3));
    }

    #[test]
    fn should_report_a_mismatch_without_failing() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("victim");
        hide(&root, &Fragment::new(1, 1, b"abc".to_vec()));
        let digest_file = temp_dir.path().join("expected.txt");
        fs::write(&digest_file, digest(b"something else")).unwrap();

        let report = prepare()
            .from_root(&root)
            .into_output_folder(temp_dir.path().join("out"))
            .with_output_name("payload.txt")
            .verify_against(&digest_file)
            .execute()
            .unwrap();

        assert!(!report.check.is_ok());
        assert_eq!(fs::read(&report.output_file).unwrap(), b"abc");
    }

    #[test]
    fn should_list_missing_fragments() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("victim");
        hide(&root, &Fragment::new(1, 3, b"AB".to_vec()));
        hide(&root, &Fragment::new(3, 3, b"CD".to_vec()));

        let result = prepare()
            .from_root(&root)
            .into_output_folder(temp_dir.path().join("out"))
            .execute();

        match result {
            Err(ShardError::MissingFragments(missing)) => assert_eq!(missing, vec![2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_distinguish_no_images_from_no_fragments() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("victim");
        fs::create_dir_all(&root).unwrap();

        let empty = prepare()
            .from_root(&root)
            .into_output_folder(temp_dir.path().join("out"))
            .execute();
        assert!(matches!(empty, Err(ShardError::NoCarrierImages(_))));

        prepare_noise_carrier(8, 8, 5)
            .save_png(&root.join("plain.png"))
            .unwrap();
        let plain = prepare()
            .from_root(&root)
            .into_output_folder(temp_dir.path().join("out"))
            .execute();
        assert!(matches!(plain, Err(ShardError::NoFragmentsFound(_))));
    }

    #[test]
    fn should_hand_off_the_reconstructed_file() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path().join("victim");
        hide(&root, &Fragment::new(1, 1, b"#!/bin/sh\n".to_vec()));

        let report = prepare()
            .from_root(&root)
            .into_output_folder(temp_dir.path().join("out"))
            .execute()
            .unwrap();
        let executor = RecordingExecutor::default();

        assert_eq!(report.hand_off(&executor, Some("--flag")).unwrap(), 3);
        assert_eq!(
            executor.calls.borrow().as_slice(),
            &[(report.output_file.clone(), Some("--flag".to_string()))]
        );
    }
}
