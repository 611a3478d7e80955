//! Domain types for GammaLab

pub mod bar;
pub mod position;
pub mod trade;

pub use bar::{check_ordering, check_series, Bar, DataError};
pub use position::{PnlMark, Position};
pub use trade::{ExitReason, Trade};
