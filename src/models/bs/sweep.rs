//! Lazy sensitivity sweeps over the underlying price.
//!
//! Reporting code (delta/gamma charts across a ±10% spot range and similar)
//! pulls `(spot, PricingResult)` pairs on demand instead of materialising an
//! array up front. A sweep is finite, knows its length, and can be rewound.

use super::{price_with_greeks, PricingResult};
use crate::contract::OptionContract;
use crate::error::{ensure_positive, PricingError, PricingResultOf};

/// Evenly spaced spot grid `[lo, hi]` with `points` entries, priced lazily.
#[derive(Debug, Clone)]
pub struct SpotSweep {
    contract: OptionContract,
    sigma: f64,
    lo: f64,
    hi: f64,
    points: usize,
    next: usize,
}

impl SpotSweep {
    /// Validates the grid and the contract once; iteration is then infallible.
    pub fn new(
        contract: OptionContract,
        sigma: f64,
        lo: f64,
        hi: f64,
        points: usize,
    ) -> PricingResultOf<Self> {
        contract.validate()?;
        ensure_positive("sigma", sigma)?;
        ensure_positive("sweep_lo", lo)?;
        ensure_positive("sweep_hi", hi)?;
        if hi <= lo {
            return Err(PricingError::InvalidConfig(format!(
                "Sweep upper bound {} must exceed lower bound {}",
                hi, lo
            )));
        }
        if points < 2 {
            return Err(PricingError::InvalidConfig(format!(
                "Sweep needs at least 2 points, got {}",
                points
            )));
        }
        Ok(Self {
            contract,
            sigma,
            lo,
            hi,
            points,
            next: 0,
        })
    }

    /// Symmetric sweep of `±fraction` around the contract's current spot.
    pub fn around_spot(
        contract: OptionContract,
        sigma: f64,
        fraction: f64,
        points: usize,
    ) -> PricingResultOf<Self> {
        ensure_positive("sweep_fraction", fraction)?;
        if fraction >= 1.0 {
            return Err(PricingError::InvalidInput {
                field: "sweep_fraction",
                value: fraction,
            });
        }
        let s = contract.spot;
        Self::new(contract, sigma, s * (1.0 - fraction), s * (1.0 + fraction), points)
    }

    /// Rewinds to the first grid point.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    fn spot_at(&self, i: usize) -> f64 {
        if i + 1 == self.points {
            return self.hi;
        }
        self.lo + (self.hi - self.lo) * i as f64 / (self.points - 1) as f64
    }
}

impl Iterator for SpotSweep {
    type Item = (f64, PricingResult);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.points {
            return None;
        }
        let spot = self.spot_at(self.next);
        self.next += 1;
        // Spot, sigma and the rest of the contract were validated in `new`.
        price_with_greeks(&self.contract.with_spot(spot), self.sigma)
            .ok()
            .map(|result| (spot, result))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.points - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpotSweep {}
