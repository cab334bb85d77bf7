//! Consolidation request generator.
//!
//! Produces [`ConsolidationRequest`] instances for one multi-valued item,
//! with candidates from many mappings of mixed strength and an existing item
//! that partially overlaps them.

pub mod values;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use valcon_core::{
    ConsolidationRequest, DeltaSetTriple, ItemPath, MappingStrength, MatcherName, MetadataMode,
    ValueWithOrigin,
};

use values::{ValuePool, candidate};

/// Configuration for the request generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Seed for the random number generator (deterministic).
    pub seed: u64,
    /// Number of mappings producing candidates.
    pub num_mappings: usize,
    /// Candidates each mapping contributes.
    pub values_per_mapping: usize,
    /// Size of the pool real values are drawn from.
    pub distinct_values: usize,
    /// Number of values the existing item holds.
    pub existing_values: usize,
    /// Fraction of weak mappings (0.0-1.0).
    pub weak_fraction: f64,
    /// Fraction of strong mappings (0.0-1.0).
    pub strong_fraction: f64,
    /// Fraction of candidates in the minus set (0.0-1.0).
    pub minus_fraction: f64,
    /// Fraction of candidates whose construction is invalid (0.0-0.2).
    pub invalid_fraction: f64,
    /// Randomly upper-case candidates and match case-insensitively.
    pub case_variation: bool,
    /// Compute provenance metadata.
    pub provenance: bool,
}

/// Predefined size tiers for benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTier {
    /// 4 mappings, ~12 candidates, ~8 classes
    Small,
    /// 16 mappings, ~128 candidates, ~64 classes
    Medium,
    /// 48 mappings, ~768 candidates, ~256 classes
    Large,
}

impl SizeTier {
    /// Returns the default `GeneratorConfig` for this size tier.
    pub fn config(self, seed: u64) -> GeneratorConfig {
        match self {
            SizeTier::Small => GeneratorConfig {
                seed,
                num_mappings: 4,
                values_per_mapping: 3,
                distinct_values: 8,
                existing_values: 3,
                weak_fraction: 0.25,
                strong_fraction: 0.25,
                minus_fraction: 0.2,
                invalid_fraction: 0.05,
                case_variation: false,
                provenance: true,
            },
            SizeTier::Medium => GeneratorConfig {
                seed,
                num_mappings: 16,
                values_per_mapping: 8,
                distinct_values: 64,
                existing_values: 24,
                weak_fraction: 0.2,
                strong_fraction: 0.3,
                minus_fraction: 0.2,
                invalid_fraction: 0.05,
                case_variation: true,
                provenance: true,
            },
            SizeTier::Large => GeneratorConfig {
                seed,
                num_mappings: 48,
                values_per_mapping: 16,
                distinct_values: 256,
                existing_values: 96,
                weak_fraction: 0.2,
                strong_fraction: 0.3,
                minus_fraction: 0.2,
                invalid_fraction: 0.05,
                case_variation: true,
                provenance: true,
            },
        }
    }
}

/// Generates a standard-mode consolidation request from `config`.
///
/// No mapping is exclusive, so the request always consolidates without a
/// conflict.
pub fn generate_request(config: &GeneratorConfig) -> ConsolidationRequest {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let pool = ValuePool::new(config.distinct_values);

    let existing = pool.sample_distinct(&mut rng, config.existing_values);

    let mut triple: DeltaSetTriple<ValueWithOrigin> = DeltaSetTriple::default();
    for m in 0..config.num_mappings {
        let strength = pick_strength(&mut rng, config);
        let mapping_name = format!("mapping-{m:03}");
        for _ in 0..config.values_per_mapping {
            let idx = rng.gen_range(0..pool.len());
            let upper = config.case_variation && rng.gen_bool(0.3);
            let valid = !rng.gen_bool(config.invalid_fraction);
            let origin = candidate(&pool, idx, upper, &mapping_name, strength, valid);
            if rng.gen_bool(config.minus_fraction) {
                triple.minus.push(origin);
            } else if existing.iter().any(|v| v.equals_real_value(&pool.value(idx))) {
                triple.zero.push(origin);
            } else {
                triple.plus.push(origin);
            }
        }
    }

    let mut request = ConsolidationRequest::new(item_path(), triple);
    request.existing = Some(existing);
    if config.case_variation {
        request.matcher = MatcherName::CaseIgnore;
    }
    if config.provenance {
        request.metadata = MetadataMode::Provenance;
    }
    request
}

fn pick_strength(rng: &mut StdRng, config: &GeneratorConfig) -> MappingStrength {
    if rng.gen_bool(config.weak_fraction) {
        MappingStrength::Weak
    } else if rng.gen_bool(config.strong_fraction) {
        MappingStrength::Strong
    } else {
        MappingStrength::Normal
    }
}

fn item_path() -> ItemPath {
    ItemPath::try_from("extension/generated:value").unwrap_or_else(|_| unreachable!())
}
