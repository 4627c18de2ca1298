// Copyright 2023 Björn Stenqvist and Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! # Screened pair kernel

use crate::{Cutoff, Result, SumError};
#[cfg(test)]
use approx::assert_relative_eq;

/// # Short-range function for electrostatic interaction schemes
///
/// The short-range function, _S(q)_, is a function of the reduced distance _q_ = _r_ / _r<sub>c</sub>_,
/// where _r_ is the distance between the interacting particles and _r<sub>c</sub>_ is the cutoff
/// distance. In connection with Ewald summation it is also known as the _splitting function_.
/// The energy between two point charges is,
/// $$ u(r) = \frac{z_1 z_2}{r} \cdot S(q) $$
/// and the radial derivative follows from the product rule,
/// $$ \frac{du}{dr} = z_1 z_2 \left ( \frac{S'(q)}{r r_c} - \frac{S(q)}{r^2} \right ) $$
pub trait ShortRangeFunction: Cutoff {
    /// Short-range function.
    fn short_range_f0(&self, q: f64) -> f64;
    /// First derivative of the short-range function.
    fn short_range_f1(&self, q: f64) -> f64;

    /// Interaction energy between two point charges at `distance`.
    ///
    /// Zero at and beyond the cutoff.
    #[inline]
    fn ion_ion_energy(&self, charge_product: f64, distance: f64) -> f64 {
        if distance >= self.cutoff() {
            return 0.0;
        }
        let q = distance / self.cutoff();
        charge_product / distance * self.short_range_f0(q)
    }

    /// Radial derivative, _du/dr_, of [`ShortRangeFunction::ion_ion_energy`].
    ///
    /// Zero at and beyond the cutoff.
    #[inline]
    fn ion_ion_derivative(&self, charge_product: f64, distance: f64) -> f64 {
        if distance >= self.cutoff() {
            return 0.0;
        }
        let q = distance / self.cutoff();
        charge_product / distance
            * (self.short_range_f1(q) / self.cutoff() - self.short_range_f0(q) / distance)
    }
}

/// Error-function screened Coulomb interaction.
///
/// The short-range function is _S(q)_ = erfc(η _q_) with η = _r<sub>c</sub>_ / _r<sub>d</sub>_
/// so that the pair energy becomes
/// $$ u(r) = \frac{z_1 z_2\, \mathrm{erfc}(r / r_d)}{r} $$
/// This is the real-space Ewald kernel with α = 1 / _r<sub>d</sub>_.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenedCoulomb {
    /// Real space cutoff distance
    cutoff: f64,
    /// Damping length
    damping: f64,
    /// cutoff / damping
    eta: f64,
}

impl ScreenedCoulomb {
    /// Inverse square root of pi, 1/sqrt(pi)
    const FRAC_1_SQRT_PI: f64 = 0.5 * std::f64::consts::FRAC_2_SQRT_PI;

    /// Construct a new kernel with given cutoff and damping length.
    ///
    /// Both must be positive and finite.
    pub fn new(cutoff: f64, damping: f64) -> Result<Self> {
        if !(cutoff.is_finite() && cutoff > 0.0) {
            return Err(SumError::NonPositiveCutoff(cutoff));
        }
        if !(damping.is_finite() && damping > 0.0) {
            return Err(SumError::NonPositiveDamping(damping));
        }
        Ok(Self {
            cutoff,
            damping,
            eta: cutoff / damping,
        })
    }

    /// Damping length, _r<sub>d</sub>_
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Ewald splitting parameter, α = 1 / _r<sub>d</sub>_
    pub fn alpha(&self) -> f64 {
        self.damping.recip()
    }
}

impl Cutoff for ScreenedCoulomb {
    #[inline]
    fn cutoff(&self) -> f64 {
        self.cutoff
    }
}

impl ShortRangeFunction for ScreenedCoulomb {
    #[inline]
    fn short_range_f0(&self, q: f64) -> f64 {
        libm::erfc(self.eta * q)
    }
    #[inline]
    fn short_range_f1(&self, q: f64) -> f64 {
        -2.0 * self.eta * Self::FRAC_1_SQRT_PI * f64::exp(-(self.eta * q).powi(2))
    }
}

#[test]
fn test_screened_coulomb() {
    // same splitting as a real-space Ewald scheme with cutoff 29 and alpha 0.1
    let kernel = ScreenedCoulomb::new(29.0, 10.0).unwrap();
    let eps = 1e-8;
    assert_relative_eq!(kernel.alpha(), 0.1);
    assert_relative_eq!(kernel.short_range_f0(0.5), 0.040304974362540776, epsilon = eps);
    assert_relative_eq!(kernel.short_range_f1(0.5), -0.39971358519151007, epsilon = eps);

    // u(r) = z1 z2 erfc(r / rd) / r
    let r = 7.0;
    assert_relative_eq!(
        kernel.ion_ion_energy(-2.0, r),
        -2.0 * libm::erfc(0.7) / r,
        max_relative = 1e-14
    );

    // cutoff is exclusive
    assert_eq!(kernel.ion_ion_energy(1.0, 29.0), 0.0);
    assert_eq!(kernel.ion_ion_derivative(1.0, 29.0), 0.0);
    assert_eq!(kernel.ion_ion_energy(1.0, 30.0), 0.0);
}

#[test]
fn test_screened_coulomb_derivative() {
    let kernel = ScreenedCoulomb::new(12.0, 2.5).unwrap();
    let rd = kernel.damping();
    for r in [0.3, 1.0, 2.5, 6.0, 11.0] {
        let exact = -libm::erfc(r / rd) / (r * r)
            - 2.0 / (std::f64::consts::PI.sqrt() * rd) * (-(r / rd).powi(2)).exp() / r;
        assert_relative_eq!(
            kernel.ion_ion_derivative(3.0, r),
            3.0 * exact,
            max_relative = 1e-12
        );
        // central difference
        let h = 1e-6;
        let numeric =
            (kernel.ion_ion_energy(3.0, r + h) - kernel.ion_ion_energy(3.0, r - h)) / (2.0 * h);
        assert_relative_eq!(kernel.ion_ion_derivative(3.0, r), numeric, max_relative = 1e-6);
    }
}

#[test]
fn test_screened_coulomb_rejects_bad_parameters() {
    assert_eq!(
        ScreenedCoulomb::new(-5.0, 1.0),
        Err(SumError::NonPositiveCutoff(-5.0))
    );
    assert_eq!(
        ScreenedCoulomb::new(5.0, 0.0),
        Err(SumError::NonPositiveDamping(0.0))
    );
    assert!(ScreenedCoulomb::new(f64::INFINITY, 1.0).is_err());
    assert!(ScreenedCoulomb::new(5.0, f64::NAN).is_err());
}
