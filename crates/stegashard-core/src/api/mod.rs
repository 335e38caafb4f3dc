//! One builder per pipeline stage, each started with `prepare()` and run with `execute()`.

pub mod distribute;
pub mod embed;
pub mod reconstruct;
pub mod split;
