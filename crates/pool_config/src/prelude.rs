pub use crate::{
    builder::PoolConfigBuilder,
    config::{ConnectHandler, PoolConfig},
    options::{ConnectOptions, PoolOptions},
    rotation::{Cursor, RoundRobin, TargetProvider},
    target::{PendingTarget, Target, TargetResult, TargetShape},
};
pub mod errors {
    pub use crate::errors::*;
}
