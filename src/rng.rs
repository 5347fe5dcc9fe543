use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Seeding for script `random` and `chance`: a fixed seed gives replayable
/// runs in tests, entropy is used for play
pub enum RandMode {
    Predictable,
    RandomUniform,
}

/// Random source behind the `random` and `chance` opcodes
pub struct ScriptRandom {
    rng: Box<dyn RngCore>,
    rand_mode: RandMode,
}

impl ScriptRandom {
    pub fn new_uniform() -> ScriptRandom {
        ScriptRandom {
            rng: Box::new(StdRng::from_entropy()),
            rand_mode: RandMode::RandomUniform,
        }
    }

    pub fn new_predictable(seed: u64) -> ScriptRandom {
        ScriptRandom {
            rng: Box::new(StdRng::seed_from_u64(seed)),
            rand_mode: RandMode::Predictable,
        }
    }

    /// Seeded when a seed is given, uniform otherwise
    pub fn from_seed(seed: Option<u64>) -> ScriptRandom {
        match seed {
            Some(seed) => ScriptRandom::new_predictable(seed),
            None => ScriptRandom::new_uniform(),
        }
    }

    pub fn is_predictable(&self) -> bool {
        matches!(self.rand_mode, RandMode::Predictable)
    }

    /// Uniform number in [0..=max]
    pub fn random_number(&mut self, max: u16) -> u16 {
        self.rng.gen_range(0..=max)
    }
}
