//! Replay engine: configuration, per-bar Greeks, the position lifecycle and
//! the driver that ties them to a bar series.
//!
//! Per bar:
//! 1. Indicators (precomputed once for the whole series)
//! 2. Greeks from the configured source
//! 3. Lifecycle decision: skip, enter, hold, re-hedge or exit
//! 4. Equity point and balance-floor check

pub mod config;
pub mod greeks_source;
pub mod lifecycle;
pub mod replay;
pub mod warmup;

pub use config::{ConfigError, EngineConfig, GreeksSource, VolatilitySource};
pub use greeks_source::{greeks_for_bar, HeldOption};
pub use lifecycle::{BarOutcome, BarSignals, EntryCondition, PositionLifecycleManager, PositionState};
pub use replay::{
    EquityPoint, ReplayDriver, ReplayError, ReplayReport, SkipReason, SkippedBar, Termination,
};
pub use warmup::WarmupState;
