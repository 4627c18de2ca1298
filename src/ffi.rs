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

//! # C interface
//!
//! All arguments are passed by pointer:
//! ```c
//! int c_real_space_electrostatic_sum_energy(
//!     const double* a1, const double* a2, const double* a3,
//!     const int* num,
//!     const double* rx, const double* ry, const double* rz,
//!     const double* z,
//!     const double* rc, const double* rd,
//!     double* e);
//! ```
//! and likewise for `_force` (outputs `fx`, `fy`, `fz` of length `num`) and
//! `_stress` (output `s` of length 6, Voigt order `xx, yy, zz, yz, xz, xy`).
//!
//! These use the symbol names and argument order of the established C header for this
//! sum, with two differences for callers coming from that library:
//!
//! - Each function returns an `int` status instead of `void`.
//! - Energy, forces and stress are the screened real-space sum alone. The self and
//!   background terms are not included, so `_energy` differs from a full Ewald energy
//!   by [`crate::RealSpaceSum::self_energy`] plus
//!   [`crate::RealSpaceSum::background_energy`]; use
//!   [`crate::RealSpaceSum::total_energy`] and [`crate::RealSpaceSum::total_stress`]
//!   from Rust for the complete values.
//!
//! The return value is zero on success and [`crate::SumError::code`] otherwise.
//! Null pointers give [`NULL_POINTER`]. Outputs are zeroed before any work is done,
//! provided their pointers are valid.

use crate::{raw, Result, SumError};
use std::ffi::c_int;
use std::slice;

/// Status returned when a required pointer is null
pub const NULL_POINTER: c_int = -1;

/// Input arrays shared by all entry points
struct Inputs<'a> {
    a1: &'a [f64; 3],
    a2: &'a [f64; 3],
    a3: &'a [f64; 3],
    rx: &'a [f64],
    ry: &'a [f64],
    rz: &'a [f64],
    z: &'a [f64],
    rc: f64,
    rd: f64,
}

/// Borrow the caller's inputs, or `None` if a pointer is null.
#[allow(clippy::too_many_arguments)]
unsafe fn inputs<'a>(
    a1: *const f64,
    a2: *const f64,
    a3: *const f64,
    num: *const c_int,
    rx: *const f64,
    ry: *const f64,
    rz: *const f64,
    z: *const f64,
    rc: *const f64,
    rd: *const f64,
) -> Option<std::result::Result<Inputs<'a>, SumError>> {
    let pointers = [a1, a2, a3, rx, ry, rz, z, rc, rd];
    if num.is_null() || pointers.iter().any(|p| p.is_null()) {
        return None;
    }
    let num = match usize::try_from(*num) {
        Ok(num) if num > 0 => num,
        _ => return Some(Err(SumError::NoCharges)),
    };
    Some(Ok(Inputs {
        a1: &*(a1 as *const [f64; 3]),
        a2: &*(a2 as *const [f64; 3]),
        a3: &*(a3 as *const [f64; 3]),
        rx: slice::from_raw_parts(rx, num),
        ry: slice::from_raw_parts(ry, num),
        rz: slice::from_raw_parts(rz, num),
        z: slice::from_raw_parts(z, num),
        rc: *rc,
        rd: *rd,
    }))
}

fn status(result: Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(error) => {
            tracing::warn!(%error, "real-space sum failed");
            error.code()
        }
    }
}

/// Real-space energy.
///
/// # Safety
///
/// Lattice vectors must point to three doubles, coordinate and charge arrays to `*num`
/// doubles, and `e` to one writable double.
#[no_mangle]
pub unsafe extern "C" fn c_real_space_electrostatic_sum_energy(
    a1: *const f64,
    a2: *const f64,
    a3: *const f64,
    num: *const c_int,
    rx: *const f64,
    ry: *const f64,
    rz: *const f64,
    z: *const f64,
    rc: *const f64,
    rd: *const f64,
    e: *mut f64,
) -> c_int {
    if e.is_null() {
        return NULL_POINTER;
    }
    *e = 0.0;
    let Some(inputs) = inputs(a1, a2, a3, num, rx, ry, rz, z, rc, rd) else {
        return NULL_POINTER;
    };
    status(inputs.and_then(|i| {
        *e = raw::energy(i.a1, i.a2, i.a3, i.rx, i.ry, i.rz, i.z, i.rc, i.rd)?;
        Ok(())
    }))
}

/// Real-space forces.
///
/// # Safety
///
/// As for [`c_real_space_electrostatic_sum_energy`], with `fx`, `fy` and `fz`
/// pointing to `*num` writable doubles each.
#[no_mangle]
pub unsafe extern "C" fn c_real_space_electrostatic_sum_force(
    a1: *const f64,
    a2: *const f64,
    a3: *const f64,
    num: *const c_int,
    rx: *const f64,
    ry: *const f64,
    rz: *const f64,
    z: *const f64,
    rc: *const f64,
    rd: *const f64,
    fx: *mut f64,
    fy: *mut f64,
    fz: *mut f64,
) -> c_int {
    if [fx, fy, fz].iter().any(|p| p.is_null()) {
        return NULL_POINTER;
    }
    let Some(inputs) = inputs(a1, a2, a3, num, rx, ry, rz, z, rc, rd) else {
        return NULL_POINTER;
    };
    status(inputs.and_then(|i| {
        let num = i.z.len();
        raw::force(
            i.a1,
            i.a2,
            i.a3,
            i.rx,
            i.ry,
            i.rz,
            i.z,
            i.rc,
            i.rd,
            slice::from_raw_parts_mut(fx, num),
            slice::from_raw_parts_mut(fy, num),
            slice::from_raw_parts_mut(fz, num),
        )
    }))
}

/// Real-space stress in Voigt order.
///
/// # Safety
///
/// As for [`c_real_space_electrostatic_sum_energy`], with `s` pointing to six
/// writable doubles.
#[no_mangle]
pub unsafe extern "C" fn c_real_space_electrostatic_sum_stress(
    a1: *const f64,
    a2: *const f64,
    a3: *const f64,
    num: *const c_int,
    rx: *const f64,
    ry: *const f64,
    rz: *const f64,
    z: *const f64,
    rc: *const f64,
    rd: *const f64,
    s: *mut f64,
) -> c_int {
    if s.is_null() {
        return NULL_POINTER;
    }
    let s = &mut *(s as *mut [f64; 6]);
    *s = [0.0; 6];
    let Some(inputs) = inputs(a1, a2, a3, num, rx, ry, rz, z, rc, rd) else {
        return NULL_POINTER;
    };
    status(inputs.and_then(|i| raw::stress(i.a1, i.a2, i.a3, i.rx, i.ry, i.rz, i.z, i.rc, i.rd, s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::ptr;

    const A1: [f64; 3] = [8.0, 0.0, 0.0];
    const A2: [f64; 3] = [0.0, 8.0, 0.0];
    const A3: [f64; 3] = [0.0, 0.0, 8.0];

    #[test]
    fn test_energy_and_force() {
        let (rx, ry, rz) = ([0.0, 4.0], [0.0, 4.0], [0.0, 4.0]);
        let z = [1.0, -1.0];
        let num: c_int = 2;
        let (rc, rd) = (10.0, 2.0);
        let mut e = f64::NAN;
        let status = unsafe {
            c_real_space_electrostatic_sum_energy(
                A1.as_ptr(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                &mut e,
            )
        };
        assert_eq!(status, 0);
        let expected = raw::energy(&A1, &A2, &A3, &rx, &ry, &rz, &z, rc, rd).unwrap();
        assert_relative_eq!(e, expected, max_relative = 1e-12);

        // CsCl geometry: forces vanish by symmetry
        let (mut fx, mut fy, mut fz) = ([1.0; 2], [1.0; 2], [1.0; 2]);
        let status = unsafe {
            c_real_space_electrostatic_sum_force(
                A1.as_ptr(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                fx.as_mut_ptr(),
                fy.as_mut_ptr(),
                fz.as_mut_ptr(),
            )
        };
        assert_eq!(status, 0);
        for f in fx.iter().chain(&fy).chain(&fz) {
            assert!(f.abs() < 1e-10);
        }
    }

    /// The C energy lacks only the self and background terms of the full lattice energy
    #[test]
    fn test_energy_is_screened_part() {
        let (rx, ry, rz) = ([0.0, 4.0], [0.0, 4.0], [0.0, 4.0]);
        let z = [2.0, -1.0];
        let num: c_int = 2;
        let (rc, rd) = (16.0, 3.0);
        let mut e = f64::NAN;
        let status = unsafe {
            c_real_space_electrostatic_sum_energy(
                A1.as_ptr(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                &mut e,
            )
        };
        assert_eq!(status, 0);
        let lattice = crate::Lattice::new(A1.into(), A2.into(), A3.into()).unwrap();
        let positions = [crate::Vector3::zeros(), crate::Vector3::new(4.0, 4.0, 4.0)];
        let sum = crate::RealSpaceSum::new(rc, rd).unwrap();
        let total = sum.total_energy(&lattice, &positions, &z).unwrap();
        assert_relative_eq!(
            e + sum.self_energy(&z) + sum.background_energy(&lattice, &z),
            total,
            max_relative = 1e-12
        );
        assert!(sum.background_energy(&lattice, &z) != 0.0);
    }

    #[test]
    fn test_status_codes() {
        let (rx, ry, rz, z) = ([0.0], [0.0], [0.0], [1.0]);
        let (rc, rd) = (-1.0, 2.0);
        let mut num: c_int = 1;
        let mut s = [1.0; 6];
        let status = unsafe {
            c_real_space_electrostatic_sum_stress(
                A1.as_ptr(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                s.as_mut_ptr(),
            )
        };
        assert_eq!(status, SumError::NonPositiveCutoff(rc).code());
        assert_eq!(s, [0.0; 6]);

        num = 0;
        let mut e = 1.0;
        let status = unsafe {
            c_real_space_electrostatic_sum_energy(
                A1.as_ptr(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                &mut e,
            )
        };
        assert_eq!(status, SumError::NoCharges.code());
        assert_eq!(e, 0.0);

        let status = unsafe {
            c_real_space_electrostatic_sum_energy(
                ptr::null(),
                A2.as_ptr(),
                A3.as_ptr(),
                &num,
                rx.as_ptr(),
                ry.as_ptr(),
                rz.as_ptr(),
                z.as_ptr(),
                &rc,
                &rd,
                &mut e,
            )
        };
        assert_eq!(status, NULL_POINTER);
    }
}
