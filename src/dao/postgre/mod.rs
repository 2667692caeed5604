pub use self::types::{PoolOption, PoolType};
mod entity;
mod types;
