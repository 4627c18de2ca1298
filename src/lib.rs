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

//! # Madelung
//!
//! Real-space electrostatic lattice sums for periodic point charges.
//!
//! Given a [`Lattice`], charge positions and magnitudes, a cutoff radius _r<sub>c</sub>_
//! and a damping length _r<sub>d</sub>_, the crate evaluates the error-function screened
//! Coulomb sum over all pairs and periodic images,
//! $$ E = \frac{1}{2} \sum_{i,j} \sum_{\mathbf{L}}{}^{'} \frac{z_i z_j\, \mathrm{erfc}(r/r_d)}{r}, \quad r = |\mathbf{r}_i - \mathbf{r}_j - \mathbf{L}| < r_c $$
//! together with its forces and stress tensor. The prime excludes the self term
//! _i_ = _j_ at **L** = 0. In Ewald language this is the real-space part with
//! α = 1 / _r<sub>d</sub>_.
//!
//! Charges are in units of the elementary charge, lengths in any unit, and the
//! Coulomb constant is one.
//!
//! ## Examples
//! ~~~
//! use madelung::{Lattice, RealSpaceSum, Vector3};
//! let lattice = Lattice::cubic(40.0).unwrap();
//! let positions = [Vector3::zeros(), Vector3::new(2.0, 0.0, 0.0)];
//! let charges = [1.0, 1.0];
//! let sum = RealSpaceSum::new(10.0, 3.0).unwrap();
//! let energy = sum.energy(&lattice, &positions, &charges).unwrap();
//! assert!((energy - libm::erfc(2.0 / 3.0) / 2.0).abs() < 1e-12);
//! ~~~

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;
/// A stack-allocated 3x3 square matrix
pub type Matrix3 = nalgebra::Matrix3<f64>;

mod accumulate;
mod error;
pub mod ffi;
mod kernel;
mod lattice;
pub mod raw;
mod sum;

pub use accumulate::{
    traverse, Accumulator, EnergyAccumulator, ForceAccumulator, PairTerm, StressAccumulator,
};
pub use error::SumError;
pub use kernel::{ScreenedCoulomb, ShortRangeFunction};
pub use lattice::{ImageRange, Lattice};
pub use sum::{Evaluation, RealSpaceSum};

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SumError>;

/// Distances at or below this value (in input length units) are treated as
/// two charges sitting on top of each other.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-8;

/// Defines a cutoff distance
pub trait Cutoff {
    /// Squared cutoff distance
    fn cutoff_squared(&self) -> f64 {
        self.cutoff().powi(2)
    }

    /// Cutoff distance
    fn cutoff(&self) -> f64;
}

/// Converts a symmetric tensor to Voigt notation, `[xx, yy, zz, yz, xz, xy]`
pub fn to_voigt(tensor: &Matrix3) -> [f64; 6] {
    [
        tensor[(0, 0)],
        tensor[(1, 1)],
        tensor[(2, 2)],
        tensor[(1, 2)],
        tensor[(0, 2)],
        tensor[(0, 1)],
    ]
}

/// Converts Voigt notation, `[xx, yy, zz, yz, xz, xy]`, to a symmetric tensor
pub fn from_voigt(voigt: &[f64; 6]) -> Matrix3 {
    let [xx, yy, zz, yz, xz, xy] = *voigt;
    Matrix3::new(xx, xy, xz, xy, yy, yz, xz, yz, zz)
}
