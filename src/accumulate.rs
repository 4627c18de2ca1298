// Copyright 2023 Mikael Lund
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

//! # Pair traversal and accumulators
//!
//! A single traversal visits every ordered pair of charges, (_i_, _j_), and every
//! lattice image **L** within the cutoff, skipping only _i_ = _j_ at **L** = 0.
//! What is summed is decided by the [`Accumulator`], so cutoff handling,
//! image enumeration and self-term exclusion are shared by energy, force and stress.
//!
//! Since both (_i_, _j_) and (_j_, _i_) are visited, energy and stress carry a factor ½
//! whereas the force on _i_ is collected from its own row only.

use crate::{
    Lattice, Matrix3, Result, ShortRangeFunction, SumError, Vector3, COINCIDENCE_TOLERANCE,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument};

/// A single charge pair under a given lattice image
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PairTerm {
    /// Index of the charge the contribution is attributed to
    pub first: usize,
    /// Index of the partner charge
    pub second: usize,
    /// Lattice image of the partner
    pub image: [i32; 3],
    /// Separation vector, **r**<sub>first</sub> − **r**<sub>second</sub> − **L**
    pub separation: Vector3,
    /// Length of the separation vector
    pub distance: f64,
    /// Charge product, z<sub>first</sub> × z<sub>second</sub>
    pub charge_product: f64,
}

/// Visitor summing pair contributions into some output
pub trait Accumulator: Send + Sync + Sized {
    /// Add the contribution from a pair within the cutoff.
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm);
    /// Empty accumulator with the same shape, e.g. for a parallel partition.
    fn fork(&self) -> Self;
    /// Add the sums of another accumulator of the same shape.
    fn merge(&mut self, other: Self);
}

/// Sums the energy, ½ Σ' u(r)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnergyAccumulator {
    energy: f64,
}

impl EnergyAccumulator {
    /// Start from zero energy
    pub fn new() -> Self {
        Self::default()
    }
    /// Energy summed so far
    pub fn energy(&self) -> f64 {
        self.energy
    }
}

impl Accumulator for EnergyAccumulator {
    #[inline]
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm) {
        self.energy += 0.5 * kernel.ion_ion_energy(pair.charge_product, pair.distance);
    }
    fn fork(&self) -> Self {
        Self::new()
    }
    fn merge(&mut self, other: Self) {
        self.energy += other.energy;
    }
}

/// Sums per-charge forces, **F**<sub>i</sub> = −∂E/∂**r**<sub>i</sub>
#[derive(Clone, Debug, PartialEq)]
pub struct ForceAccumulator {
    forces: Vec<Vector3>,
}

impl ForceAccumulator {
    /// Zeroed forces for `num` charges
    pub fn new(num: usize) -> Self {
        Self {
            forces: vec![Vector3::zeros(); num],
        }
    }
    /// Forces summed so far, indexed like the charges
    pub fn forces(&self) -> &[Vector3] {
        &self.forces
    }
    /// Take ownership of the summed forces
    pub fn into_forces(self) -> Vec<Vector3> {
        self.forces
    }
}

impl Accumulator for ForceAccumulator {
    #[inline]
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm) {
        let du_dr = kernel.ion_ion_derivative(pair.charge_product, pair.distance);
        self.forces[pair.first] -= du_dr / pair.distance * pair.separation;
    }
    fn fork(&self) -> Self {
        Self::new(self.forces.len())
    }
    fn merge(&mut self, other: Self) {
        self.forces
            .iter_mut()
            .zip(other.forces)
            .for_each(|(force, other)| *force += other);
    }
}

/// Sums the stress tensor, σ = (1/V) ∂E/∂ε.
///
/// Each pair adds ½ (du/dr) **d** ⊗ **d** / r; the division by the
/// cell volume happens in [`StressAccumulator::stress`].
#[derive(Clone, Debug, PartialEq)]
pub struct StressAccumulator {
    virial: Matrix3,
    volume: f64,
}

impl StressAccumulator {
    /// Zero virial for a cell of the given volume
    pub fn new(volume: f64) -> Self {
        Self {
            virial: Matrix3::zeros(),
            volume,
        }
    }
    /// Strain derivative of the energy, ∂E/∂ε
    pub fn virial(&self) -> &Matrix3 {
        &self.virial
    }
    /// Stress tensor, σ = (1/V) ∂E/∂ε
    pub fn stress(&self) -> Matrix3 {
        self.virial / self.volume
    }
}

impl Accumulator for StressAccumulator {
    #[inline]
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm) {
        let du_dr = kernel.ion_ion_derivative(pair.charge_product, pair.distance);
        let d = &pair.separation;
        self.virial += (0.5 * du_dr / pair.distance) * (d * d.transpose());
    }
    fn fork(&self) -> Self {
        Self::new(self.volume)
    }
    fn merge(&mut self, other: Self) {
        self.virial += other.virial;
    }
}

impl<A: Accumulator, B: Accumulator> Accumulator for (A, B) {
    #[inline]
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm) {
        self.0.accumulate(kernel, pair);
        self.1.accumulate(kernel, pair);
    }
    fn fork(&self) -> Self {
        (self.0.fork(), self.1.fork())
    }
    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
        self.1.merge(other.1);
    }
}

impl<A: Accumulator, B: Accumulator, C: Accumulator> Accumulator for (A, B, C) {
    #[inline]
    fn accumulate<K: ShortRangeFunction>(&mut self, kernel: &K, pair: &PairTerm) {
        self.0.accumulate(kernel, pair);
        self.1.accumulate(kernel, pair);
        self.2.accumulate(kernel, pair);
    }
    fn fork(&self) -> Self {
        (self.0.fork(), self.1.fork(), self.2.fork())
    }
    fn merge(&mut self, other: Self) {
        self.0.merge(other.0);
        self.1.merge(other.1);
        self.2.merge(other.2);
    }
}

/// Check that positions and charges describe a non-empty, finite charge set.
pub(crate) fn validate_charges(positions: &[Vector3], charges: &[f64]) -> Result<()> {
    if positions.len() != charges.len() {
        return Err(SumError::LengthMismatch {
            positions: positions.len(),
            charges: charges.len(),
        });
    }
    if charges.is_empty() {
        return Err(SumError::NoCharges);
    }
    if positions.iter().flatten().any(|x| !x.is_finite()) {
        return Err(SumError::NonFiniteInput("position"));
    }
    if charges.iter().any(|z| !z.is_finite()) {
        return Err(SumError::NonFiniteInput("charge"));
    }
    Ok(())
}

/// Drive `accumulator` over all charge pairs and lattice images within the kernel cutoff.
///
/// Images are enumerated once per call. Returns [`SumError::NonPositiveCutoff`] unless the
/// kernel cutoff is positive and finite, and [`SumError::CoincidentCharges`] if any
/// pair other than the self term is closer than [`COINCIDENCE_TOLERANCE`].
#[instrument(skip_all, name = "real_space_sum")]
pub fn traverse<K, A>(
    kernel: &K,
    lattice: &Lattice,
    positions: &[Vector3],
    charges: &[f64],
    accumulator: A,
) -> Result<A>
where
    K: ShortRangeFunction + Sync,
    A: Accumulator,
{
    let cutoff = kernel.cutoff();
    if !(cutoff.is_finite() && cutoff > 0.0) {
        return Err(SumError::NonPositiveCutoff(cutoff));
    }
    validate_charges(positions, charges)?;
    let range = lattice.images(kernel.cutoff(), positions);
    let images: Vec<_> = range.iter().collect();
    debug!(
        charges = charges.len(),
        images = images.len(),
        max_image = ?range.max(),
        "enumerated lattice images"
    );

    #[cfg(not(feature = "parallel"))]
    let accumulator = {
        let mut accumulator = accumulator;
        for first in 0..positions.len() {
            visit_row(first, kernel, &images, positions, charges, &mut accumulator)?;
        }
        accumulator
    };

    #[cfg(feature = "parallel")]
    let accumulator = {
        let partial = (0..positions.len())
            .into_par_iter()
            .try_fold(
                || accumulator.fork(),
                |mut partial, first| {
                    visit_row(first, kernel, &images, positions, charges, &mut partial)?;
                    Ok::<_, SumError>(partial)
                },
            )
            .try_reduce(
                || accumulator.fork(),
                |mut lhs, rhs| {
                    lhs.merge(rhs);
                    Ok(lhs)
                },
            )?;
        let mut accumulator = accumulator;
        accumulator.merge(partial);
        accumulator
    };

    Ok(accumulator)
}

/// Visit all partners and images of charge `first`
fn visit_row<K, A>(
    first: usize,
    kernel: &K,
    images: &[([i32; 3], Vector3)],
    positions: &[Vector3],
    charges: &[f64],
    accumulator: &mut A,
) -> Result<()>
where
    K: ShortRangeFunction,
    A: Accumulator,
{
    let cutoff_squared = kernel.cutoff_squared();
    let tolerance_squared = COINCIDENCE_TOLERANCE.powi(2);
    for (second, (position, charge)) in positions.iter().zip(charges).enumerate() {
        let offset = positions[first] - position;
        let charge_product = charges[first] * charge;
        for (image, translation) in images {
            if first == second && *image == [0, 0, 0] {
                continue;
            }
            let separation = offset - translation;
            let distance_squared = separation.norm_squared();
            if distance_squared >= cutoff_squared {
                continue;
            }
            if distance_squared <= tolerance_squared {
                return Err(SumError::CoincidentCharges {
                    first,
                    second,
                    image: *image,
                });
            }
            let pair = PairTerm {
                first,
                second,
                image: *image,
                separation,
                distance: distance_squared.sqrt(),
                charge_product,
            };
            accumulator.accumulate(kernel, &pair);
        }
    }
    Ok(())
}
