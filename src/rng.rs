use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Shared random source for the simulation. Every draw (wander targets, trip
/// and dance checks, greeting picks, question shuffles) goes through this
/// resource so tests can inject a fixed seed. Non-cryptographic.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
