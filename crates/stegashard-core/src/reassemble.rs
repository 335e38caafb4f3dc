use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Command;

use log::{info, warn};

use crate::error::ShardError;
use crate::fragment::digest;
use crate::result::Result;

/// Concatenates fragments `1..=max` in ascending order.
///
/// Every index up to the highest one found must be present, otherwise all gaps are reported.
pub fn reassemble(fragments: &BTreeMap<u32, Vec<u8>>) -> Result<Vec<u8>> {
    let Some(&max_index) = fragments.keys().next_back() else {
        return Err(ShardError::EmptyReassembly);
    };

    let missing: Vec<u32> = (1..=max_index)
        .filter(|i| !fragments.contains_key(i))
        .collect();
    if !missing.is_empty() {
        return Err(ShardError::MissingFragments(missing));
    }

    Ok((1..=max_index)
        .filter_map(|i| fragments.get(&i))
        .flat_map(|payload| payload.iter().copied())
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestCheck {
    Match,
    Mismatch { expected: String, actual: String },
    /// no digest was persisted to compare against
    Unavailable,
}

impl DigestCheck {
    pub fn is_ok(&self) -> bool {
        !matches!(self, DigestCheck::Mismatch { .. })
    }
}

impl fmt::Display for DigestCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestCheck::Match => write!(f, "OK"),
            DigestCheck::Mismatch { expected, actual } => {
                write!(f, "MISMATCH (expected {expected}, got {actual})")
            }
            DigestCheck::Unavailable => write!(f, "no original digest available"),
        }
    }
}

/// Compares the digest of `data` with `expected`, a mismatch is reported and never an error.
pub fn verify(data: &[u8], expected: Option<&str>) -> DigestCheck {
    let Some(expected) = expected else {
        return DigestCheck::Unavailable;
    };
    let actual = digest(data);
    if actual.eq_ignore_ascii_case(expected.trim()) {
        DigestCheck::Match
    } else {
        warn!("digest mismatch: expected {expected}, got {actual}");
        DigestCheck::Mismatch {
            expected: expected.trim().to_string(),
            actual,
        }
    }
}

/// Runs a reconstructed file outside of this process.
pub trait Executor {
    /// runs `program` with an optional argument and returns its exit code
    fn execute(&self, program: &Path, arg: Option<&str>) -> Result<i32>;
}

/// Starts the program as a child process, optionally through an interpreter like `python3`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessExecutor {
    pub interpreter: Option<String>,
}

impl ProcessExecutor {
    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: Some(interpreter.into()),
        }
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, program: &Path, arg: Option<&str>) -> Result<i32> {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(program);
                cmd
            }
            None => {
                make_executable(program)?;
                Command::new(program)
            }
        };
        if let Some(arg) = arg {
            cmd.arg(arg);
        }

        info!("executing {cmd:?}");
        let status = cmd.status().map_err(|source| ShardError::ExecutionFailed {
            program: program.display().to_string(),
            source,
        })?;

        Ok(status.code().unwrap_or_else(|| {
            warn!("{program:?} was terminated by a signal");
            1
        }))
    }
}

#[cfg(unix)]
fn make_executable(program: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = std::fs::metadata(program)?.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    std::fs::set_permissions(program, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_program: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments(pairs: &[(u32, &[u8])]) -> BTreeMap<u32, Vec<u8>> {
        pairs.iter().map(|(i, b)| (*i, b.to_vec())).collect()
    }

    #[test]
    fn should_concatenate_in_index_order() {
        let map = fragments(&[(3, b"rld!"), (1, b"Hell"), (2, b"o Wo")]);
        assert_eq!(reassemble(&map).unwrap(), b"Hello World!".to_vec());
    }

    #[test]
    fn should_report_exactly_the_missing_index() {
        let map = fragments(&[(1, b"AB"), (3, b"CD")]);
        match reassemble(&map) {
            Err(ShardError::MissingFragments(missing)) => assert_eq!(missing, vec![2]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_report_all_gaps() {
        let map = fragments(&[(2, b"x"), (5, b"y")]);
        match reassemble(&map) {
            Err(ShardError::MissingFragments(missing)) => assert_eq!(missing, vec![1, 3, 4]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_fail_on_empty_input() {
        assert!(matches!(
            reassemble(&BTreeMap::new()),
            Err(ShardError::EmptyReassembly)
        ));
    }

    #[test]
    fn should_keep_empty_fragments() {
        let map = fragments(&[(1, b"ab"), (2, b""), (3, b"")]);
        assert_eq!(reassemble(&map).unwrap(), b"ab".to_vec());
    }

    #[test]
    fn should_verify_digests() {
        let data = b"Hello World!";
        let expected = digest(data);

        assert_eq!(verify(data, Some(&expected)), DigestCheck::Match);
        assert_eq!(
            verify(data, Some(&format!("{}\n", expected.to_uppercase()))),
            DigestCheck::Match
        );
        assert!(!verify(b"Hello World?", Some(&expected)).is_ok());
        assert_eq!(verify(data, None), DigestCheck::Unavailable);
    }

    #[cfg(unix)]
    #[test]
    fn should_propagate_the_exit_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("script.sh");
        std::fs::write(&script, "exit \"$1\"\n").unwrap();

        let code = ProcessExecutor::with_interpreter("sh")
            .execute(&script, Some("7"))
            .unwrap();
        assert_eq!(code, 7);
    }
}
