use ilattice3::Point;
use rand::{prelude::*, rngs::SmallRng};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

pub fn small_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Where the seed for a generation pass comes from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SeedPolicy {
    /// Every pass produces the same dungeon.
    Fixed(u64),
    /// Every pass draws a fresh seed, so consecutive rounds differ.
    Entropy,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Fixed(0)
    }
}

impl SeedPolicy {
    /// The concrete seed for one pass. Entropy seeds are drawn here so they can be reported and
    /// replayed.
    pub fn resolve(&self) -> u64 {
        match self {
            SeedPolicy::Fixed(seed) => *seed,
            SeedPolicy::Entropy => rand::random(),
        }
    }
}

pub struct LatticeUniformDist {
    pub x: Uniform<i32>,
    pub y: Uniform<i32>,
    pub z: Uniform<i32>,
}

impl Distribution<Point> for LatticeUniformDist {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        let x = rng.sample(self.x);
        let y = rng.sample(self.y);
        let z = rng.sample(self.z);

        [x, y, z].into()
    }
}

/// Inclusive per-axis ranges.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct LatticeUniformDistSpec {
    pub x: (i32, i32),
    pub y: (i32, i32),
    pub z: (i32, i32),
}

impl LatticeUniformDistSpec {
    /// Panics if any range is empty.
    pub fn make(&self) -> LatticeUniformDist {
        LatticeUniformDist {
            x: Uniform::new_inclusive(self.x.0, self.x.1),
            y: Uniform::new_inclusive(self.y.0, self.y.1),
            z: Uniform::new_inclusive(self.z.0, self.z.1),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x.0 <= self.x.1 && self.y.0 <= self.y.1 && self.z.0 <= self.z.1
    }
}
