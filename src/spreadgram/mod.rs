//! Spreadgram: sigmoid-weighted iterative spreading.
//!
//! ```text
//! initial ─► spread_step ─► spread_step ─► … ─► activation ─► gradient
//!               │                                                │
//!               └──────────────── sigmoid ───────────────────────┘
//! ```

pub mod gradient;
pub mod sigmoid;
pub mod step;

pub use gradient::gradient;
pub use sigmoid::{sigmoid, NeighborState};
pub use step::{spread, spread_step, SpreadRun};
