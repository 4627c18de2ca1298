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

use thiserror::Error;

/// Errors raised before or during a lattice sum.
///
/// Every variant is detected before any result is handed back, so a returned
/// value is always the complete sum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SumError {
    /// At least one charge is required.
    #[error("at least one charge is required")]
    NoCharges,

    /// Positions and charges differ in length.
    #[error("got {positions} positions but {charges} charges")]
    LengthMismatch { positions: usize, charges: usize },

    /// The x, y and z coordinate arrays differ in length.
    #[error("coordinate arrays differ in length (x: {x}, y: {y}, z: {z})")]
    CoordinateLengths { x: usize, y: usize, z: usize },

    /// An output buffer has the wrong length.
    #[error("output buffer holds {found} values, expected {expected}")]
    OutputLength { expected: usize, found: usize },

    /// The cutoff radius must be positive and finite.
    #[error("cutoff radius must be positive and finite, got {0}")]
    NonPositiveCutoff(f64),

    /// The damping length must be positive and finite.
    #[error("damping length must be positive and finite, got {0}")]
    NonPositiveDamping(f64),

    /// The lattice vectors do not span three dimensions.
    #[error("lattice vectors are linearly dependent (cell volume {volume:.3e})")]
    DegenerateLattice { volume: f64 },

    /// A coordinate, charge or lattice component is NaN or infinite.
    #[error("input contains a non-finite {0}")]
    NonFiniteInput(&'static str),

    /// Two distinct charges (or a charge and a periodic image of another) coincide.
    #[error("charges {first} and {second} coincide under lattice image {image:?}")]
    CoincidentCharges {
        first: usize,
        second: usize,
        image: [i32; 3],
    },
}

impl SumError {
    /// Status code used by the C interface; zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            Self::NoCharges => 1,
            Self::LengthMismatch { .. } => 2,
            Self::OutputLength { .. } => 3,
            Self::NonPositiveCutoff(_) => 4,
            Self::NonPositiveDamping(_) => 5,
            Self::DegenerateLattice { .. } => 6,
            Self::NonFiniteInput(_) => 7,
            Self::CoincidentCharges { .. } => 8,
            Self::CoordinateLengths { .. } => 9,
        }
    }
}
