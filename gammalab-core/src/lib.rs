//! GammaLab Core — Greeks model, indicators and the delta-hedged position engine.
//!
//! This crate contains the replay engine for a gamma-scalping strategy:
//! - Domain types (bars, positions, trades)
//! - Black-Scholes Greeks with input guards
//! - Indicators (RSI, VWAP, Bollinger, volume average, realized volatility)
//!   and synthetic Greeks proxies
//! - Single-position lifecycle state machine with declarative exit rules
//! - Replay driver owning the balance for one bar series

pub mod domain;
pub mod engine;
pub mod greeks;
pub mod indicators;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: report and config types are Send + Sync so the
    /// runner can replay datasets on worker threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        // Greeks
        require_send::<greeks::GreeksSnapshot>();
        require_sync::<greeks::GreeksSnapshot>();
        require_send::<greeks::OptionParams>();
        require_sync::<greeks::OptionParams>();

        // Indicators
        require_send::<indicators::IndicatorDeriver>();
        require_sync::<indicators::IndicatorDeriver>();
        require_send::<indicators::IndicatorSet>();
        require_sync::<indicators::IndicatorSet>();

        // Engine types
        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::ReplayDriver>();
        require_sync::<engine::ReplayDriver>();
        require_send::<engine::ReplayReport>();
        require_sync::<engine::ReplayReport>();
        require_send::<engine::ReplayError>();
        require_sync::<engine::ReplayError>();
        require_send::<engine::PositionLifecycleManager>();
        require_sync::<engine::PositionLifecycleManager>();
    }

    /// Architecture contract: the lifecycle manager never sees the bar
    /// history, only the current bar and its signals.
    #[test]
    fn lifecycle_sees_one_bar_at_a_time() {
        fn _check_signature(
            manager: &mut engine::PositionLifecycleManager,
            bar: &domain::Bar,
            signals: &engine::BarSignals,
            balance: &mut f64,
        ) -> engine::BarOutcome {
            manager.on_bar(0, bar, signals, balance)
        }
    }
}
