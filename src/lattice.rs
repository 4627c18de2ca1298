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

//! # Periodic lattice and image enumeration

use crate::{Matrix3, Result, SumError, Vector3};
use itertools::iproduct;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Three linearly independent basis vectors spanning a periodic cell.
///
/// The vectors are stored as the columns of a matrix so that
/// `cell * fractional` gives Cartesian coordinates.
/// No assumption is made about orthogonality.
///
/// When serialized, the lattice is written as three rows `[a1, a2, a3]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")
)]
pub struct Lattice {
    cell: Matrix3,
    inverse: Matrix3,
}

impl TryFrom<[[f64; 3]; 3]> for Lattice {
    type Error = SumError;
    fn try_from(rows: [[f64; 3]; 3]) -> Result<Self> {
        let [a1, a2, a3] = rows.map(Vector3::from);
        Self::new(a1, a2, a3)
    }
}

impl From<Lattice> for [[f64; 3]; 3] {
    fn from(lattice: Lattice) -> Self {
        std::array::from_fn(|i| lattice.vector(i).into())
    }
}

impl Lattice {
    /// Relative volume below which the basis is considered linearly dependent
    const DEGENERACY_TOLERANCE: f64 = 1e-12;

    /// Construct from three basis vectors.
    pub fn new(a1: Vector3, a2: Vector3, a3: Vector3) -> Result<Self> {
        Self::from_matrix(Matrix3::from_columns(&[a1, a2, a3]))
    }

    /// Construct from a matrix whose columns are the basis vectors.
    pub fn from_matrix(cell: Matrix3) -> Result<Self> {
        if cell.iter().any(|x| !x.is_finite()) {
            return Err(SumError::NonFiniteInput("lattice vector"));
        }
        let volume = cell.determinant();
        let scale: f64 = cell.column_iter().map(|a| a.norm()).product();
        if volume.abs() <= Self::DEGENERACY_TOLERANCE * scale {
            return Err(SumError::DegenerateLattice { volume });
        }
        let inverse = cell
            .try_inverse()
            .ok_or(SumError::DegenerateLattice { volume })?;
        Ok(Self { cell, inverse })
    }

    /// Cubic cell with the given side length
    pub fn cubic(side: f64) -> Result<Self> {
        Self::from_matrix(Matrix3::from_diagonal_element(side))
    }

    /// Basis vector `a1`, `a2` or `a3` for `index` 0, 1 or 2.
    pub fn vector(&self, index: usize) -> Vector3 {
        self.cell.column(index).into_owned()
    }

    /// Matrix with the basis vectors as columns
    pub fn matrix(&self) -> &Matrix3 {
        &self.cell
    }

    /// Cell volume (always positive, regardless of handedness)
    pub fn volume(&self) -> f64 {
        self.cell.determinant().abs()
    }

    /// Perpendicular distances between adjacent lattice planes.
    ///
    /// Element `i` is the spacing of the planes spanned by the two basis
    /// vectors other than `a_i`, i.e. _V_ / |**a**<sub>j</sub> × **a**<sub>k</sub>|.
    /// Equivalently it is the inverse length of the reciprocal vector **b**<sub>i</sub>.
    pub fn heights(&self) -> [f64; 3] {
        let volume = self.volume();
        std::array::from_fn(|i| {
            let (j, k) = ((i + 1) % 3, (i + 2) % 3);
            volume / self.vector(j).cross(&self.vector(k)).norm()
        })
    }

    /// Largest plane spacing of the cell
    pub fn max_height(&self) -> f64 {
        self.heights().into_iter().fold(f64::MIN, f64::max)
    }

    /// Cartesian to fractional coordinates
    pub fn to_fractional(&self, position: &Vector3) -> Vector3 {
        self.inverse * position
    }

    /// Fractional to Cartesian coordinates
    pub fn to_cartesian(&self, fractional: &Vector3) -> Vector3 {
        self.cell * fractional
    }

    /// Translation vector `i a1 + j a2 + k a3`
    pub fn translation(&self, image: [i32; 3]) -> Vector3 {
        self.cell * Vector3::new(image[0] as f64, image[1] as f64, image[2] as f64)
    }

    /// Apply a homogeneous deformation, `a_i -> (1 + strain) a_i`.
    pub fn deformed(&self, strain: &Matrix3) -> Result<Self> {
        Self::from_matrix((Matrix3::identity() + strain) * self.cell)
    }

    /// Images that can bring any two of the given positions within `cutoff`.
    ///
    /// For lattice direction _i_ with plane spacing _h<sub>i</sub>_, the component of
    /// a separation along **b**<sub>i</sub> is at least |_f<sub>i</sub>_ − _n<sub>i</sub>_| _h<sub>i</sub>_,
    /// where _f<sub>i</sub>_ is the fractional separation. With _s<sub>i</sub>_ being the
    /// spread of the fractional coordinates, every image within the cutoff satisfies
    /// |_n<sub>i</sub>_| ≤ ⌈_r<sub>c</sub>_ / _h<sub>i</sub>_ + _s<sub>i</sub>_⌉.
    ///
    /// A negative or NaN cutoff is treated as zero.
    pub fn images(&self, cutoff: f64, positions: &[Vector3]) -> ImageRange {
        let mut lower = [f64::MAX; 3];
        let mut upper = [f64::MIN; 3];
        for fractional in positions.iter().map(|r| self.to_fractional(r)) {
            for i in 0..3 {
                lower[i] = lower[i].min(fractional[i]);
                upper[i] = upper[i].max(fractional[i]);
            }
        }
        let cutoff = cutoff.max(0.0);
        let heights = self.heights();
        let max = std::array::from_fn(|i| {
            let spread = if positions.is_empty() { 0.0 } else { upper[i] - lower[i] };
            (cutoff / heights[i] + spread).ceil() as i32
        });
        ImageRange {
            cell: self.cell,
            max,
        }
    }
}

/// Box of integer lattice translations, `[-n0, n0] × [-n1, n1] × [-n2, n2]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageRange {
    cell: Matrix3,
    max: [i32; 3],
}

impl ImageRange {
    /// Largest absolute image index along each lattice vector
    pub fn max(&self) -> [i32; 3] {
        self.max
    }

    /// Number of images in the box
    pub fn len(&self) -> usize {
        self.max.iter().map(|n| 2 * *n as usize + 1).product()
    }

    /// Never empty; the zero image is always included.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over image indices and their Cartesian translation vectors.
    pub fn iter(&self) -> impl Iterator<Item = ([i32; 3], Vector3)> + '_ {
        let [n0, n1, n2] = self.max;
        iproduct!(-n0..=n0, -n1..=n1, -n2..=n2).map(move |(i, j, k)| {
            let translation = self.cell * Vector3::new(i as f64, j as f64, k as f64);
            ([i, j, k], translation)
        })
    }
}
