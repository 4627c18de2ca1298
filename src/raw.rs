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

//! # Flat-array interface
//!
//! Entry points taking lattice vectors as `[f64; 3]`, coordinates as three separate
//! arrays and charges as a fourth, as used by simulation engines that store atoms in
//! structure-of-arrays form. The number of charges is the common array length.
//!
//! These compute the *real-space* sum only, like [`RealSpaceSum::energy`],
//! [`RealSpaceSum::forces`] and [`RealSpaceSum::stress`].
//! Output buffers are overwritten, never read.
//!
//! ~~~
//! let a1 = [30.0, 0.0, 0.0];
//! let a2 = [0.0, 30.0, 0.0];
//! let a3 = [0.0, 0.0, 30.0];
//! let (rx, ry, rz) = ([0.0, 1.5], [0.0, 0.0], [0.0, 0.0]);
//! let z = [1.0, -1.0];
//! let mut fx = [0.0; 2];
//! let mut fy = [0.0; 2];
//! let mut fz = [0.0; 2];
//! madelung::raw::force(&a1, &a2, &a3, &rx, &ry, &rz, &z, 10.0, 2.0, &mut fx, &mut fy, &mut fz).unwrap();
//! assert!(fx[0] > 0.0); // attraction
//! assert_eq!(fx[0], -fx[1]);
//! ~~~

use crate::{to_voigt, Lattice, RealSpaceSum, Result, SumError, Vector3};

/// Lattice, positions and parameters from flat arrays
#[allow(clippy::too_many_arguments)]
fn unpack(
    a1: &[f64; 3],
    a2: &[f64; 3],
    a3: &[f64; 3],
    rx: &[f64],
    ry: &[f64],
    rz: &[f64],
    rc: f64,
    rd: f64,
) -> Result<(Lattice, Vec<Vector3>, RealSpaceSum)> {
    let sum = RealSpaceSum::new(rc, rd)?;
    let lattice = Lattice::new(Vector3::from(*a1), Vector3::from(*a2), Vector3::from(*a3))?;
    if ry.len() != rx.len() || rz.len() != rx.len() {
        return Err(SumError::CoordinateLengths {
            x: rx.len(),
            y: ry.len(),
            z: rz.len(),
        });
    }
    let positions = rx
        .iter()
        .zip(ry)
        .zip(rz)
        .map(|((x, y), z)| Vector3::new(*x, *y, *z))
        .collect();
    Ok((lattice, positions, sum))
}

fn check_output(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(SumError::OutputLength { expected, found });
    }
    Ok(())
}

/// Real-space energy
#[allow(clippy::too_many_arguments)]
pub fn energy(
    a1: &[f64; 3],
    a2: &[f64; 3],
    a3: &[f64; 3],
    rx: &[f64],
    ry: &[f64],
    rz: &[f64],
    z: &[f64],
    rc: f64,
    rd: f64,
) -> Result<f64> {
    let (lattice, positions, sum) = unpack(a1, a2, a3, rx, ry, rz, rc, rd)?;
    sum.energy(&lattice, &positions, z)
}

/// Real-space forces, written to `fx`, `fy` and `fz`.
///
/// On error the output buffers are left zeroed.
#[allow(clippy::too_many_arguments)]
pub fn force(
    a1: &[f64; 3],
    a2: &[f64; 3],
    a3: &[f64; 3],
    rx: &[f64],
    ry: &[f64],
    rz: &[f64],
    z: &[f64],
    rc: f64,
    rd: f64,
    fx: &mut [f64],
    fy: &mut [f64],
    fz: &mut [f64],
) -> Result<()> {
    for buffer in [&mut *fx, &mut *fy, &mut *fz] {
        buffer.fill(0.0);
    }
    for found in [fx.len(), fy.len(), fz.len()] {
        check_output(z.len(), found)?;
    }
    let (lattice, positions, sum) = unpack(a1, a2, a3, rx, ry, rz, rc, rd)?;
    let forces = sum.forces(&lattice, &positions, z)?;
    for (i, force) in forces.iter().enumerate() {
        fx[i] = force.x;
        fy[i] = force.y;
        fz[i] = force.z;
    }
    Ok(())
}

/// Real-space stress in Voigt order, `[xx, yy, zz, yz, xz, xy]`.
///
/// On error the output buffer is left zeroed.
#[allow(clippy::too_many_arguments)]
pub fn stress(
    a1: &[f64; 3],
    a2: &[f64; 3],
    a3: &[f64; 3],
    rx: &[f64],
    ry: &[f64],
    rz: &[f64],
    z: &[f64],
    rc: f64,
    rd: f64,
    s: &mut [f64; 6],
) -> Result<()> {
    *s = [0.0; 6];
    let (lattice, positions, sum) = unpack(a1, a2, a3, rx, ry, rz, rc, rd)?;
    *s = to_voigt(&sum.stress(&lattice, &positions, z)?);
    Ok(())
}
