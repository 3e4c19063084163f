//! Monte-Carlo balance survey
//!
//! Generates many dungeons and items per floor to check the shape of the
//! content tables: room and enemy counts, chest counts, rarity spread.
//! Also estimates observed dodge and crit rates for a given stat line.
//! Samples run in parallel with rayon; every sample gets its own seed
//! derived by hashing so results are reproducible regardless of thread count.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::config::SimConfig;
use crate::dungeon;
use crate::logging::TimingSpan;
use crate::loot::{generate_item, Rarity};
use crate::utils::roll_percent;

/// Survey parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Samples per floor
    pub samples: u64,
    pub base_seed: u64,
    /// Trials for the dodge/crit estimator
    pub roll_trials: u64,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            samples: 200,
            base_seed: 42,
            roll_trials: 100_000,
        }
    }
}

/// Seed for sample `index` of `stream` (a floor number or other label)
pub fn sample_seed(base_seed: u64, stream: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(stream.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Aggregate layout numbers for one floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSurvey {
    pub floor: u32,
    pub samples: u64,
    pub avg_rooms: f32,
    pub min_rooms: usize,
    pub max_rooms: usize,
    pub avg_enemies: f32,
    pub avg_chests: f32,
    /// Fraction of samples with a boss spawn
    pub boss_rate: f32,
    /// Fraction of samples with stairs
    pub stairs_rate: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct LayoutSample {
    rooms: usize,
    enemies: usize,
    chests: usize,
    boss: bool,
    stairs: bool,
}

/// Generate `samples` dungeons for `floor` and summarize them
pub fn survey_floor(config: &SimConfig, floor: u32, survey: &SurveyConfig) -> FloorSurvey {
    let boss_key = config.boss().map(|b| b.key.as_str());
    let samples: Vec<LayoutSample> = (0..survey.samples)
        .into_par_iter()
        .map(|i| {
            let seed = sample_seed(survey.base_seed, floor as u64, i);
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let d = dungeon::generate(config, floor, &mut rng);
            LayoutSample {
                rooms: d.rooms.len(),
                enemies: d.spawns.len(),
                chests: d.chests.len(),
                boss: boss_key.is_some_and(|key| d.spawns.iter().any(|s| s.key == key)),
                stairs: d.stairs.is_some(),
            }
        })
        .collect();

    let n = samples.len().max(1) as f32;
    let rate = |f: fn(&LayoutSample) -> bool| samples.iter().filter(|s| f(s)).count() as f32 / n;

    FloorSurvey {
        floor,
        samples: survey.samples,
        avg_rooms: samples.iter().map(|s| s.rooms).sum::<usize>() as f32 / n,
        min_rooms: samples.iter().map(|s| s.rooms).min().unwrap_or(0),
        max_rooms: samples.iter().map(|s| s.rooms).max().unwrap_or(0),
        avg_enemies: samples.iter().map(|s| s.enemies).sum::<usize>() as f32 / n,
        avg_chests: samples.iter().map(|s| s.chests).sum::<usize>() as f32 / n,
        boss_rate: rate(|s| s.boss),
        stairs_rate: rate(|s| s.stairs),
    }
}

/// Rarity counts for items generated on one floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaritySurvey {
    pub floor: u32,
    pub samples: u64,
    /// In `Rarity::ALL` order
    pub counts: Vec<(Rarity, u64)>,
    /// Rolls that produced no item (empty loot table)
    pub empty: u64,
}

impl RaritySurvey {
    pub fn frequency(&self, rarity: Rarity) -> f32 {
        let total: u64 = self.counts.iter().map(|(_, c)| c).sum();
        if total == 0 {
            return 0.0;
        }
        let count = self
            .counts
            .iter()
            .find(|(r, _)| *r == rarity)
            .map_or(0, |(_, c)| *c);
        count as f32 / total as f32
    }
}

fn rarity_index(rarity: Rarity) -> usize {
    match rarity {
        Rarity::Common => 0,
        Rarity::Magic => 1,
        Rarity::Rare => 2,
        Rarity::Legendary => 3,
    }
}

/// Generate `samples` items for `floor` and count rarities
pub fn survey_loot(config: &SimConfig, floor: u32, survey: &SurveyConfig) -> RaritySurvey {
    // Offset the stream so items and layouts never share seeds
    let stream = 1_000 + floor as u64;
    let (counts, empty) = (0..survey.samples)
        .into_par_iter()
        .map(|i| {
            let mut rng =
                Xoshiro256PlusPlus::seed_from_u64(sample_seed(survey.base_seed, stream, i));
            generate_item(&config.loot, floor, &mut rng).map(|item| item.rarity)
        })
        .fold(
            || ([0u64; 4], 0u64),
            |(mut counts, empty), rarity| match rarity {
                Some(r) => {
                    counts[rarity_index(r)] += 1;
                    (counts, empty)
                }
                None => (counts, empty + 1),
            },
        )
        .reduce(
            || ([0u64; 4], 0u64),
            |(a, ea), (b, eb)| {
                let mut sum = a;
                for (s, v) in sum.iter_mut().zip(b) {
                    *s += v;
                }
                (sum, ea + eb)
            },
        );

    RaritySurvey {
        floor,
        samples: survey.samples,
        counts: Rarity::ALL
            .iter()
            .map(|&r| (r, counts[rarity_index(r)]))
            .collect(),
        empty,
    }
}

/// Observed dodge and crit frequencies for a stat line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollRates {
    pub trials: u64,
    /// Percent
    pub dodge_rate: f32,
    /// Percent
    pub crit_rate: f32,
}

const ROLL_CHUNK: u64 = 4_096;

/// Roll dodge and crit `trials` times each with the same helper combat uses
pub fn estimate_roll_rates(dodge: f32, crit_chance: f32, trials: u64, base_seed: u64) -> RollRates {
    let chunks = trials.div_ceil(ROLL_CHUNK);
    let (dodges, crits) = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng =
                Xoshiro256PlusPlus::seed_from_u64(sample_seed(base_seed, u64::MAX, chunk));
            let n = ROLL_CHUNK.min(trials - chunk * ROLL_CHUNK);
            let mut dodges = 0u64;
            let mut crits = 0u64;
            for _ in 0..n {
                dodges += roll_percent(&mut rng, dodge) as u64;
                crits += roll_percent(&mut rng, crit_chance) as u64;
            }
            (dodges, crits)
        })
        .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

    let pct = |hits: u64| {
        if trials == 0 {
            0.0
        } else {
            hits as f32 / trials as f32 * 100.0
        }
    };
    RollRates {
        trials,
        dodge_rate: pct(dodges),
        crit_rate: pct(crits),
    }
}

/// Full survey across every floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    pub floors: Vec<FloorSurvey>,
    pub loot: Vec<RaritySurvey>,
    /// Roll rates at each class's base dodge and crit, keyed by class name
    pub class_rolls: Vec<(String, RollRates)>,
}

impl SurveyReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

pub fn run_survey(config: &SimConfig, survey: &SurveyConfig) -> SurveyReport {
    let _timing = TimingSpan::new("balance_survey");
    let floors: Vec<u32> = (1..=config.dungeon.max_floors).collect();
    let layouts: Vec<FloorSurvey> = floors
        .iter()
        .map(|&f| survey_floor(config, f, survey))
        .collect();
    let loot: Vec<RaritySurvey> = floors
        .iter()
        .map(|&f| survey_loot(config, f, survey))
        .collect();
    let class_rolls = config
        .classes
        .iter()
        .map(|c| {
            let rates = estimate_roll_rates(
                c.base.dodge,
                c.base.crit_chance,
                survey.roll_trials,
                survey.base_seed,
            );
            (c.name.clone(), rates)
        })
        .collect();

    info!(
        floors = layouts.len(),
        samples = survey.samples,
        "Balance survey complete"
    );
    SurveyReport {
        floors: layouts,
        loot,
        class_rolls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> SurveyConfig {
        SurveyConfig {
            samples: 24,
            base_seed: 7,
            roll_trials: 20_000,
        }
    }

    #[test]
    fn test_sample_seed_deterministic() {
        assert_eq!(sample_seed(1, 2, 3), sample_seed(1, 2, 3));
        assert_ne!(sample_seed(1, 2, 3), sample_seed(1, 2, 4));
        assert_ne!(sample_seed(1, 2, 3), sample_seed(1, 3, 3));
    }

    #[test]
    fn test_floor_survey_respects_room_bounds() {
        let config = SimConfig::default();
        let s = survey_floor(&config, 1, &small());
        assert_eq!(s.samples, 24);
        assert!(s.max_rooms <= config.dungeon.max_rooms as usize);
        assert!(s.min_rooms >= 1);
        assert!(s.avg_enemies > 1.0);
        assert_eq!(s.boss_rate, 1.0);
        assert_eq!(s.stairs_rate, 1.0);
    }

    #[test]
    fn test_last_floor_has_no_stairs() {
        let config = SimConfig::default();
        let s = survey_floor(&config, config.dungeon.max_floors, &small());
        assert_eq!(s.stairs_rate, 0.0);
        assert_eq!(s.boss_rate, 1.0);
    }

    #[test]
    fn test_survey_is_reproducible() {
        let config = SimConfig::default();
        assert_eq!(
            survey_floor(&config, 2, &small()),
            survey_floor(&config, 2, &small())
        );
        assert_eq!(
            survey_loot(&config, 2, &small()),
            survey_loot(&config, 2, &small())
        );
    }

    #[test]
    fn test_common_dominates_rarity() {
        let config = SimConfig::default();
        let survey = SurveyConfig {
            samples: 2_000,
            ..small()
        };
        let r = survey_loot(&config, 3, &survey);
        let total: u64 = r.counts.iter().map(|(_, c)| c).sum();
        assert_eq!(total + r.empty, 2_000);
        assert!(r.frequency(Rarity::Common) > r.frequency(Rarity::Magic));
        assert!(r.frequency(Rarity::Magic) > r.frequency(Rarity::Legendary));
    }

    #[test]
    fn test_roll_rates_converge() {
        let rates = estimate_roll_rates(10.0, 25.0, 50_000, 3);
        assert_eq!(rates.trials, 50_000);
        assert!((rates.dodge_rate - 10.0).abs() < 1.0, "{:?}", rates);
        assert!((rates.crit_rate - 25.0).abs() < 1.0, "{:?}", rates);

        let none = estimate_roll_rates(0.0, 100.0, 1_000, 3);
        assert_eq!(none.dodge_rate, 0.0);
        assert_eq!(none.crit_rate, 100.0);
    }

    #[test]
    fn test_full_report_json() {
        let config = SimConfig::default();
        let survey = SurveyConfig {
            samples: 4,
            roll_trials: 1_000,
            ..small()
        };
        let report = run_survey(&config, &survey);
        assert_eq!(report.floors.len(), 5);
        assert_eq!(report.loot.len(), 5);
        assert_eq!(report.class_rolls.len(), 3);
        assert!(report.to_json().contains("avg_rooms"));
    }
}
