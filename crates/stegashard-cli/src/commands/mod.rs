pub mod distribute;
pub mod embed;
pub mod reconstruct;
pub mod split;
