use std::sync::Mutex;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Maximum number of fallback recommendations returned
pub const FALLBACK_LIMIT: usize = 10;

/// Popular TMDB ids served when no personalized result is available
pub const POPULAR_MOVIE_IDS: [&str; 20] = [
    "299534", // Avengers: Endgame
    "299536", // Avengers: Infinity War
    "1726",   // Iron Man
    "24428",  // The Avengers
    "299537", // Captain Marvel
    "284053", // Thor: Ragnarok
    "118340", // Guardians of the Galaxy
    "10138",  // Iron Man 2
    "315635", // Spider-Man: Homecoming
    "99861",  // Avengers: Age of Ultron
    "271110", // Captain America: Civil War
    "10195",  // Thor
    "1771",   // Captain America: The First Avenger
    "102899", // Ant-Man
    "284054", // Black Panther
    "283995", // Guardians of the Galaxy Vol. 2
    "76338",  // Thor: The Dark World
    "68721",  // Iron Man 3
    "363088", // Ant-Man and the Wasp
    "429617", // Spider-Man: Far From Home
];

/// Picks non-personalized recommendations from a fixed pool
///
/// Pure apart from its random source, which can be seeded for
/// reproducible picks.
pub struct FallbackSelector {
    pool: Vec<String>,
    rng: Mutex<StdRng>,
}

impl Default for FallbackSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackSelector {
    /// Selector over the popular pool with an OS-seeded random source
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Selector over the popular pool with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pool: POPULAR_MOVIE_IDS.iter().map(|id| id.to_string()).collect(),
            rng: Mutex::new(rng),
        }
    }

    /// Returns up to ten shuffled pool ids not present in `exclude`
    pub fn select(&self, exclude: &[String]) -> Vec<String> {
        let mut available: Vec<String> = self
            .pool
            .iter()
            .filter(|id| !exclude.contains(id))
            .cloned()
            .collect();

        // A poisoned lock still holds a usable generator
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        available.shuffle(&mut *rng);
        drop(rng);

        available.truncate(FALLBACK_LIMIT);
        available
    }
}
