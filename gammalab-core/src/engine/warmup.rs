use crate::engine::config::EngineConfig;
use crate::indicators::IndicatorDeriver;

/// Counts bars until the indicator stack can produce decisions.
///
/// Used by the replay driver only to label skips; the lifecycle manager
/// itself skips on undefined signals regardless of the bar count.
#[derive(Debug, Clone)]
pub struct WarmupState {
    warmup_bars: usize,
    bars_processed: usize,
}

impl WarmupState {
    pub fn new(warmup_bars: usize) -> Self {
        Self {
            warmup_bars,
            bars_processed: 0,
        }
    }

    /// Warm-up for a config: the indicator stack, plus realized volatility
    /// when the Greeks source reads it.
    pub fn for_config(config: &EngineConfig, deriver: &IndicatorDeriver) -> Self {
        let mut warmup_bars = deriver.warmup_bars();
        if config.greeks.uses_realized_vol() {
            warmup_bars = warmup_bars.max(deriver.realized_vol_lookback());
        }
        Self::new(warmup_bars)
    }

    pub fn process_bar(&mut self) {
        self.bars_processed += 1;
    }

    /// True once the bar about to be processed is past the warm-up window.
    pub fn is_warm(&self) -> bool {
        self.bars_processed >= self.warmup_bars
    }

    pub fn bars_until_warm(&self) -> usize {
        self.warmup_bars.saturating_sub(self.bars_processed)
    }

    pub fn warmup_bars(&self) -> usize {
        self.warmup_bars
    }
}
