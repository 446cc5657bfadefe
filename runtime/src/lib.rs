#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round state machine and fixed-rate loop thread around the simulation core.
//!
//! Presentation code talks to the loop exclusively through [`Channels`] and
//! reads aggregate state from the [`SharedSnapshot`].

mod channels;
mod driver;
mod machine;
mod snapshot;

pub use channels::Channels;
pub use driver::{GameLoop, LoopConfig, LoopError};
pub use machine::{RoundConfig, RoundMachine};
pub use snapshot::SharedSnapshot;
