//! Black-Scholes Greeks for European options.
//!
//! Pure functions of `(spot, strike, time_to_expiry, rate, volatility, option_type)`:
//! no state, no I/O. Time to expiry is floored at [`MIN_TIME_TO_EXPIRY`] so the
//! `σ√T` denominator never reaches zero; non-positive spot, strike or volatility
//! is rejected with [`InvalidInputError`] rather than coerced.

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};
use thiserror::Error;

/// One day, in years.
pub const MIN_TIME_TO_EXPIRY: f64 = 1.0 / 365.0;

/// Rejected Greeks input. The caller is expected to skip the bar.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidInputError {
    #[error("spot must be positive and finite, got {0}")]
    Spot(f64),
    #[error("strike must be positive and finite, got {0}")]
    Strike(f64),
    #[error("volatility must be positive and finite, got {0}")]
    Volatility(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Call,
    Put,
}

/// Delta, gamma, theta and vega at one point in time.
///
/// Theta is per year and vega per unit (1.00) of volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksSnapshot {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

impl GreeksSnapshot {
    /// All-NaN snapshot, used for bars where no Greeks can be derived.
    pub fn undefined() -> Self {
        Self {
            delta: f64::NAN,
            gamma: f64::NAN,
            theta: f64::NAN,
            vega: f64::NAN,
        }
    }

    /// True when the values that drive decisions (delta, gamma, vega) are all finite.
    pub fn is_defined(&self) -> bool {
        self.delta.is_finite() && self.gamma.is_finite() && self.vega.is_finite()
    }
}

/// Black-Scholes inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParams {
    pub spot: f64,
    pub strike: f64,
    /// Years to expiry.
    pub time_to_expiry: f64,
    pub rate: f64,
    pub volatility: f64,
    pub option_type: OptionType,
}

impl OptionParams {
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        rate: f64,
        volatility: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            rate,
            volatility,
            option_type,
        }
    }

    fn validate(&self) -> Result<(), InvalidInputError> {
        if !(self.spot.is_finite() && self.spot > 0.0) {
            return Err(InvalidInputError::Spot(self.spot));
        }
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(InvalidInputError::Strike(self.strike));
        }
        if !(self.volatility.is_finite() && self.volatility > 0.0) {
            return Err(InvalidInputError::Volatility(self.volatility));
        }
        Ok(())
    }

    /// Time to expiry after the floor is applied. NaN input floors as well.
    pub fn effective_time(&self) -> f64 {
        if self.time_to_expiry > MIN_TIME_TO_EXPIRY {
            self.time_to_expiry
        } else {
            MIN_TIME_TO_EXPIRY
        }
    }

    fn d1_d2(&self) -> (f64, f64) {
        let t = self.effective_time();
        let sigma_sqrt_t = self.volatility * t.sqrt();
        let d1 = ((self.spot / self.strike).ln()
            + (self.rate + 0.5 * self.volatility * self.volatility) * t)
            / sigma_sqrt_t;
        (d1, d1 - sigma_sqrt_t)
    }

    /// Compute the four Greeks.
    pub fn greeks(&self) -> Result<GreeksSnapshot, InvalidInputError> {
        self.validate()?;
        let t = self.effective_time();
        let sqrt_t = t.sqrt();
        let (d1, d2) = self.d1_d2();
        let pdf_d1 = norm_pdf(d1);
        let discount = (-self.rate * t).exp();

        let gamma = pdf_d1 / (self.spot * self.volatility * sqrt_t);
        let vega = self.spot * sqrt_t * pdf_d1;
        let decay = -(self.spot * self.volatility * pdf_d1) / (2.0 * sqrt_t);

        let (delta, theta) = match self.option_type {
            OptionType::Call => (
                norm_cdf(d1),
                decay - self.rate * self.strike * discount * norm_cdf(d2),
            ),
            OptionType::Put => (
                norm_cdf(d1) - 1.0,
                decay + self.rate * self.strike * discount * norm_cdf(-d2),
            ),
        };

        Ok(GreeksSnapshot {
            delta,
            gamma,
            theta,
            vega,
        })
    }

    /// Black-Scholes premium.
    pub fn price(&self) -> Result<f64, InvalidInputError> {
        self.validate()?;
        let t = self.effective_time();
        let (d1, d2) = self.d1_d2();
        let discounted_strike = self.strike * (-self.rate * t).exp();
        Ok(match self.option_type {
            OptionType::Call => self.spot * norm_cdf(d1) - discounted_strike * norm_cdf(d2),
            OptionType::Put => discounted_strike * norm_cdf(-d2) - self.spot * norm_cdf(-d1),
        })
    }
}

/// Standard normal CDF Φ(x).
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / SQRT_2))
}

/// Standard normal PDF φ(x).
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-3;

    fn reference(option_type: OptionType) -> OptionParams {
        OptionParams::new(100.0, 100.0, 0.25, 0.05, 0.20, option_type)
    }

    #[test]
    fn reference_call_greeks() {
        // d1 = (0 + (0.05 + 0.02) * 0.25) / (0.2 * 0.5) = 0.175
        let g = reference(OptionType::Call).greeks().unwrap();
        assert!((g.delta - 0.56946).abs() < TOL, "delta {}", g.delta);
        assert!((g.gamma - 0.039288).abs() < TOL, "gamma {}", g.gamma);
        assert!((g.vega - 19.644).abs() < TOL, "vega {}", g.vega);
        assert!((g.theta - -10.4742).abs() < TOL, "theta {}", g.theta);
    }

    #[test]
    fn reference_put_theta() {
        let g = reference(OptionType::Put).greeks().unwrap();
        assert!((g.theta - -5.5363).abs() < TOL, "theta {}", g.theta);
    }

    #[test]
    fn reference_prices_satisfy_parity() {
        let call = reference(OptionType::Call).price().unwrap();
        let put = reference(OptionType::Put).price().unwrap();
        assert!((call - 4.615).abs() < TOL);
        // C - P = S - K e^{-rT}
        let parity = 100.0 - 100.0 * (-0.05_f64 * 0.25).exp();
        assert!((call - put - parity).abs() < 1e-9);
    }

    #[test]
    fn delta_parity_holds() {
        let call = reference(OptionType::Call).greeks().unwrap();
        let put = reference(OptionType::Put).greeks().unwrap();
        assert!((call.delta - put.delta - 1.0).abs() < 1e-12);
        assert_eq!(call.gamma, put.gamma);
        assert_eq!(call.vega, put.vega);
    }

    #[test]
    fn zero_time_is_floored() {
        let floored = OptionParams::new(100.0, 100.0, 0.0, 0.05, 0.2, OptionType::Call);
        let one_day =
            OptionParams::new(100.0, 100.0, MIN_TIME_TO_EXPIRY, 0.05, 0.2, OptionType::Call);
        let g = floored.greeks().unwrap();
        assert!(g.gamma.is_finite());
        assert_eq!(g, one_day.greeks().unwrap());
    }

    #[test]
    fn negative_time_is_floored() {
        let p = OptionParams::new(100.0, 100.0, -3.0, 0.05, 0.2, OptionType::Put);
        assert_eq!(p.effective_time(), MIN_TIME_TO_EXPIRY);
        assert!(p.greeks().unwrap().is_defined());
    }

    #[test]
    fn invalid_inputs_rejected() {
        let base = reference(OptionType::Call);
        let bad_vol = OptionParams {
            volatility: 0.0,
            ..base
        };
        let bad_spot = OptionParams { spot: -1.0, ..base };
        let bad_strike = OptionParams {
            strike: f64::NAN,
            ..base
        };
        assert_eq!(bad_vol.greeks(), Err(InvalidInputError::Volatility(0.0)));
        assert_eq!(bad_spot.greeks(), Err(InvalidInputError::Spot(-1.0)));
        assert!(matches!(
            bad_strike.greeks(),
            Err(InvalidInputError::Strike(_))
        ));
        assert!(bad_vol.price().is_err());
    }

    #[test]
    fn deep_itm_call_delta_near_one() {
        let p = OptionParams::new(200.0, 100.0, 0.1, 0.0, 0.2, OptionType::Call);
        assert!(p.greeks().unwrap().delta > 0.999);
    }

    #[test]
    fn undefined_snapshot_is_not_defined() {
        assert!(!GreeksSnapshot::undefined().is_defined());
        let partial = GreeksSnapshot {
            delta: 0.5,
            gamma: f64::NAN,
            theta: 0.0,
            vega: 1.0,
        };
        assert!(!partial.is_defined());
    }

    #[test]
    fn norm_cdf_symmetry() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((norm_cdf(1.3) + norm_cdf(-1.3) - 1.0).abs() < 1e-15);
    }
}
