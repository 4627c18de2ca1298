#![allow(dead_code)]

use madelung::{Lattice, Matrix3, Vector3};

/// Ionic crystal with valence charges in a uniform compensating background
pub struct Crystal {
    pub name: &'static str,
    pub lattice: Lattice,
    pub positions: Vec<Vector3>,
    pub charges: Vec<f64>,
    /// Largest plane spacing, rounded as in the published reference calculations
    pub height: f64,
    /// Ewald energy of the cell
    pub ewald_energy: f64,
}

impl Crystal {
    fn new(
        name: &'static str,
        vectors: [[f64; 3]; 3],
        fractional: &[[f64; 3]],
        charges: Vec<f64>,
        height: f64,
        ewald_energy: f64,
    ) -> Self {
        let lattice = Lattice::try_from(vectors).unwrap();
        let positions = fractional
            .iter()
            .map(|f| lattice.to_cartesian(&Vector3::from(*f)))
            .collect();
        Self {
            name,
            lattice,
            positions,
            charges,
            height,
            ewald_energy,
        }
    }

    pub fn num(&self) -> usize {
        self.charges.len()
    }

    /// Same crystal with cell and positions deformed by `1 + strain`
    pub fn deformed(&self, strain: &Matrix3) -> Self {
        let transform = Matrix3::identity() + strain;
        Self {
            name: self.name,
            lattice: self.lattice.deformed(strain).unwrap(),
            positions: self.positions.iter().map(|r| transform * r).collect(),
            charges: self.charges.clone(),
            height: self.height,
            ewald_energy: f64::NAN,
        }
    }
}

/// Face-centred cubic aluminium, primitive cell
pub fn aluminium() -> Crystal {
    Crystal::new(
        "Al",
        [
            [5.41141973394663, 0.0, 0.0],
            [2.70570986697332, 4.68642696013821, 0.0],
            [2.70570986697332, 1.56214232004608, 4.41840571073226],
        ],
        &[[0.0, 0.0, 0.0]],
        vec![3.0],
        4.42,
        -2.69595457432924945,
    )
}

/// Diamond silicon, primitive cell
pub fn silicon() -> Crystal {
    Crystal::new(
        "Si",
        [
            [7.25654832321381, 0.0, 0.0],
            [3.62827416160690, 6.28435519169252, 0.0],
            [3.62827416160690, 2.09478506389751, 5.92494689524090],
        ],
        &[[0.0, 0.0, 0.0], [0.25, 0.25, 0.25]],
        vec![4.0; 2],
        5.92,
        -8.39857465282205418,
    )
}

/// α-quartz, six oxygens followed by three silicons
pub fn quartz() -> Crystal {
    let mut charges = vec![6.0; 9];
    charges[6..].fill(4.0);
    Crystal::new(
        "SiO2",
        [
            [9.28422445623683, 0.0, 0.0],
            [-4.64211222811842, 8.04037423353787, 0.0],
            [0.0, 0.0, 10.2139697101486],
        ],
        &[
            [0.41500, 0.27200, 0.21300],
            [0.72800, 0.14300, 0.54633],
            [0.85700, 0.58500, 0.87967],
            [0.27200, 0.41500, 0.78700],
            [0.14300, 0.72800, 0.45367],
            [0.58500, 0.85700, 0.12033],
            [0.46500, 0.00000, 0.33333],
            [0.00000, 0.46500, 0.66667],
            [0.53500, 0.53500, 0.00000],
        ],
        charges,
        10.21,
        -69.48809871723248932,
    )
}

/// Quartz under a large, non-symmetric-looking but symmetric strain
pub fn strained_quartz() -> Crystal {
    let strain = Matrix3::new(
        -0.25, 0.35, -0.15, //
        0.35, 0.15, 0.25, //
        -0.15, 0.25, -0.20,
    );
    quartz().deformed(&strain)
}

/// Two-point central difference
pub fn central_difference(f: impl Fn(f64) -> f64, step: f64) -> f64 {
    (f(step) - f(-step)) / (2.0 * step)
}
