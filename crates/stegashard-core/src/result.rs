use crate::error::ShardError;

pub type Result<T> = std::result::Result<T, ShardError>;
