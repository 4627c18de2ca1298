//! Madelung constants of simple binary salts.
//!
//! The lattice energy of _N_ formula units of a ±1 salt with nearest-neighbour
//! distance _r_<sub>0</sub> is −_N M_ / _r_<sub>0</sub>, from which _M_ follows.
//!
//! Run with: `cargo run --example madelung`

use anyhow::Context;
use madelung::{Lattice, RealSpaceSum, Vector3};

struct Salt {
    name: &'static str,
    lattice: Lattice,
    positions: Vec<Vector3>,
    charges: Vec<f64>,
    formula_units: f64,
    nearest_neighbour: f64,
    reference: f64,
}

/// Conventional cubic cell with four formula units
fn rock_salt() -> anyhow::Result<Salt> {
    let cations = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.5, 0.0, 0.5], [0.0, 0.5, 0.5]];
    let anions = [[0.5, 0.0, 0.0], [0.0, 0.5, 0.0], [0.0, 0.0, 0.5], [0.5, 0.5, 0.5]];
    let lattice = Lattice::cubic(2.0)?;
    let positions = cations
        .iter()
        .chain(&anions)
        .map(|f| lattice.to_cartesian(&Vector3::from(*f)))
        .collect();
    let charges = [1.0; 4].into_iter().chain([-1.0; 4]).collect();
    Ok(Salt {
        name: "NaCl",
        lattice,
        positions,
        charges,
        formula_units: 4.0,
        nearest_neighbour: 1.0,
        reference: 1.747_564_594_633,
    })
}

fn cesium_chloride() -> anyhow::Result<Salt> {
    let lattice = Lattice::cubic(1.0)?;
    Ok(Salt {
        name: "CsCl",
        positions: vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        charges: vec![1.0, -1.0],
        formula_units: 1.0,
        nearest_neighbour: 0.75_f64.sqrt(),
        reference: 1.762_674_773_070,
        lattice,
    })
}

fn main() -> anyhow::Result<()> {
    println!("{:<6} {:>18} {:>18} {:>10}", "salt", "Madelung", "reference", "error");
    for salt in [rock_salt()?, cesium_chloride()?] {
        let sum = RealSpaceSum::from_height(&salt.lattice, 2.0)?;
        let energy = sum
            .total_energy(&salt.lattice, &salt.positions, &salt.charges)
            .with_context(|| format!("lattice sum for {}", salt.name))?;
        let madelung = -energy * salt.nearest_neighbour / salt.formula_units;
        println!(
            "{:<6} {:>18.12} {:>18.12} {:>10.1e}",
            salt.name,
            madelung,
            salt.reference,
            (madelung - salt.reference).abs()
        );

        let pressure = sum
            .total_stress(&salt.lattice, &salt.positions, &salt.charges)?
            .trace()
            / 3.0;
        println!("{:<6} mean stress {:.6}", "", pressure);
    }
    Ok(())
}
