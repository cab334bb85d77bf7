//! Value pool and candidate construction for the request generator.
use rand::Rng;
use rand::rngs::StdRng;
use serde_json::json;
use valcon_core::{ItemValue, Mapping, MappingStrength, ValueMetadata, ValueWithOrigin};

const STEMS: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel",
];

/// A fixed pool of distinct lower-case property values.
#[derive(Debug, Clone)]
pub struct ValuePool {
    texts: Vec<String>,
}

impl ValuePool {
    /// Creates a pool of `size` distinct values.
    pub fn new(size: usize) -> Self {
        let texts = (0..size.max(1))
            .map(|i| format!("{}-{i}", STEMS[i % STEMS.len()]))
            .collect();
        Self { texts }
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// The pool value at `idx`, without metadata.
    pub fn value(&self, idx: usize) -> ItemValue {
        ItemValue::property(json!(self.texts[idx % self.texts.len()]))
    }

    /// Draws up to `count` distinct values.
    pub fn sample_distinct(&self, rng: &mut StdRng, count: usize) -> Vec<ItemValue> {
        let mut picked: Vec<usize> = Vec::with_capacity(count);
        let target = count.min(self.texts.len());
        while picked.len() < target {
            let idx = rng.gen_range(0..self.texts.len());
            if !picked.contains(&idx) {
                picked.push(idx);
            }
        }
        picked.into_iter().map(|idx| self.value(idx)).collect()
    }
}

/// Builds a candidate for pool value `idx`, tagged with its mapping name.
pub fn candidate(
    pool: &ValuePool,
    idx: usize,
    upper: bool,
    mapping_name: &str,
    strength: MappingStrength,
    valid: bool,
) -> ValueWithOrigin {
    let text = &pool.texts[idx % pool.texts.len()];
    let text = if upper {
        text.to_uppercase()
    } else {
        text.clone()
    };
    let value =
        ItemValue::property(json!(text)).with_metadata(ValueMetadata::from_source(mapping_name));
    ValueWithOrigin::new(value, Mapping::new(mapping_name, strength)).with_validity(valid, true)
}
