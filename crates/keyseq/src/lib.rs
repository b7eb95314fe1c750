//! `keyseq` — a per-key sequential task executor.
//!
//! Tasks submitted under the same key run one at a time, in submission
//! order; tasks under different keys run in parallel up to the dispatcher's
//! concurrency ceiling. Build this into anything needing "serialize per
//! entity, parallelize across entities" (message consumers, entity-keyed
//! workflows) without writing the bookkeeping by hand.
//!
//! ```no_run
//! use keyseq::Factory;
//!
//! # async fn run() -> keyseq::KeyseqResult<()> {
//! let factory = Factory::<String>::new()?;
//! let handle = factory.handle("order-42".to_string());
//! let result = handle.submit(async { 1 + 1 })?.await?;
//! assert_eq!(result, 2);
//! factory.close();
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatcher;
mod error;
mod executor;
mod factory;
mod key;
mod lane;
mod serialize_gate;
mod shutdown;
mod task;

pub use config::{FactoryConfig, LaneStrategyKind};
pub use error::{KeyseqError, KeyseqResult};
pub use executor::Executor;
pub use factory::Factory;
pub use key::SequenceKey;
