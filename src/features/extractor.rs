//! Session events -> feature vector. Each feature is computed over its
//! occurrence set when sample support suffices, otherwise the extractor
//! walks the fallback chain to the nearest supported ancestor. Shared
//! ancestors are memoized per session so sibling fallbacks compute once.

use super::catalog::{FeatureCatalog, FeatureDefinition, FeatureKind, Measure};
use super::{FeatureId, FeatureValue, FeatureVector, Sample};
use crate::errors::BioauthError;
use crate::keystroke::{KeystrokeEvent, SessionEvents, UserId};
use crate::stats;
use std::collections::HashMap;

pub struct FeatureExtractor<'a> {
    catalog: &'a FeatureCatalog,
    min_key_frequency: u32,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(catalog: &'a FeatureCatalog, min_key_frequency: u32) -> Self {
        Self {
            catalog,
            min_key_frequency,
        }
    }

    /// Extract one vector for a session against the named feature set.
    /// Deterministic: identical events and catalog yield an identical vector.
    pub fn extract(
        &self,
        set: &str,
        events: &[KeystrokeEvent],
    ) -> Result<FeatureVector, BioauthError> {
        let ids = self.catalog.feature_set(set)?.to_vec();
        let mut memo: HashMap<FeatureId, Option<f64>> = HashMap::new();
        let mut values = Vec::with_capacity(ids.len());

        for &id in &ids {
            let chain = self.catalog.fallback_chain(id)?;
            let mut value = FeatureValue::Undefined;
            for node in chain {
                let computed = match memo.get(&node) {
                    Some(&v) => v,
                    None => {
                        let def = self.catalog.resolve(node)?;
                        let v = self.supported_value(def, events);
                        memo.insert(node, v);
                        v
                    }
                };
                if let Some(v) = computed {
                    value = FeatureValue::Defined(v);
                    break;
                }
            }
            values.push(value);
        }

        Ok(FeatureVector { ids, values })
    }

    pub fn extract_sample(
        &self,
        set: &str,
        user: UserId,
        session: &SessionEvents,
    ) -> Result<Sample, BioauthError> {
        Ok(Sample {
            user,
            session: session.session,
            vector: self.extract(set, &session.events)?,
        })
    }

    /// The feature's statistic, or None when the occurrence count is below
    /// the support threshold.
    fn supported_value(&self, def: &FeatureDefinition, events: &[KeystrokeEvent]) -> Option<f64> {
        let occurrences = occurrence_values(def, events);
        if (occurrences.len() as u32) < self.min_key_frequency {
            return None;
        }
        Some(match def.measure {
            Measure::Mean => stats::mean(&occurrences),
            Measure::StdDev => stats::std_dev(&occurrences),
        })
    }
}

fn occurrence_values(def: &FeatureDefinition, events: &[KeystrokeEvent]) -> Vec<f64> {
    match def.kind {
        FeatureKind::Duration => events
            .iter()
            .filter(|e| def.group1.contains(&e.key))
            .map(|e| e.duration_ms())
            .collect(),
        FeatureKind::Transition1 => transition_values(def, events, |e1, e2| {
            (e2.time_press - e1.time_release) as f64
        }),
        FeatureKind::Transition2 => transition_values(def, events, |e1, e2| {
            (e2.time_press - e1.time_press) as f64
        }),
    }
}

fn transition_values(
    def: &FeatureDefinition,
    events: &[KeystrokeEvent],
    latency: impl Fn(&KeystrokeEvent, &KeystrokeEvent) -> f64,
) -> Vec<f64> {
    events
        .windows(2)
        .filter(|w| def.group1.contains(&w[0].key) && def.group2.contains(&w[1].key))
        .map(|w| latency(&w[0], &w[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::catalog::{FeatureDefinition, FeatureKind, Measure};
    use crate::keystroke::KeyId;

    const KEY_Z: u16 = 26;
    const KEY_A: u16 = 1;

    fn def(
        id: u32,
        kind: FeatureKind,
        g1: &[u16],
        g2: &[u16],
        measure: Measure,
        fallback: Option<u32>,
    ) -> FeatureDefinition {
        FeatureDefinition {
            id: FeatureId(id),
            kind,
            group1: g1.iter().map(|&k| KeyId(k)).collect(),
            group2: g2.iter().map(|&k| KeyId(k)).collect(),
            measure,
            fallback: fallback.map(FeatureId),
        }
    }

    fn presses(key: u16, count: usize, duration: i64, spacing: i64) -> Vec<KeystrokeEvent> {
        (0..count as i64)
            .map(|i| KeystrokeEvent {
                key: KeyId(key),
                time_press: i * spacing,
                time_release: i * spacing + duration,
            })
            .collect()
    }

    fn catalog(defs: Vec<FeatureDefinition>, ids: &[u32]) -> FeatureCatalog {
        FeatureCatalog::new(
            defs,
            [(
                "test".to_string(),
                ids.iter().map(|&i| FeatureId(i)).collect(),
            )],
        )
        .unwrap()
    }

    #[test]
    fn supported_leaf_needs_no_fallback() {
        let c = catalog(
            vec![def(1, FeatureKind::Duration, &[KEY_A], &[], Measure::Mean, None)],
            &[1],
        );
        let events = presses(KEY_A, 10, 100, 300);
        let v = FeatureExtractor::new(&c, 5).extract("test", &events).unwrap();
        assert_eq!(v.values[0], FeatureValue::Defined(100.0));
    }

    #[test]
    fn under_sampled_leaf_uses_ancestor_value() {
        // Key z has 2 presses (below threshold 5); the finger group has 22
        // qualifying occurrences at 120ms.
        let c = catalog(
            vec![
                def(1, FeatureKind::Duration, &[KEY_A, KEY_Z], &[], Measure::Mean, None),
                def(2, FeatureKind::Duration, &[KEY_Z], &[], Measure::Mean, Some(1)),
            ],
            &[2],
        );
        let mut events = presses(KEY_A, 20, 120, 300);
        events.extend(presses(KEY_Z, 2, 120, 7000));
        let v = FeatureExtractor::new(&c, 5).extract("test", &events).unwrap();
        assert_eq!(v.values[0], FeatureValue::Defined(120.0));
    }

    #[test]
    fn unsupported_root_yields_undefined() {
        let c = catalog(
            vec![
                def(1, FeatureKind::Duration, &[KEY_A, KEY_Z], &[], Measure::Mean, None),
                def(2, FeatureKind::Duration, &[KEY_Z], &[], Measure::Mean, Some(1)),
            ],
            &[2],
        );
        let events = presses(KEY_A, 2, 100, 300);
        let v = FeatureExtractor::new(&c, 5).extract("test", &events).unwrap();
        assert_eq!(v.values[0], FeatureValue::Undefined);
    }

    #[test]
    fn siblings_share_the_memoized_ancestor() {
        let c = catalog(
            vec![
                def(1, FeatureKind::Duration, &[KEY_A, KEY_Z], &[], Measure::Mean, None),
                def(2, FeatureKind::Duration, &[KEY_Z], &[], Measure::Mean, Some(1)),
                def(3, FeatureKind::Duration, &[KEY_A], &[], Measure::Mean, Some(1)),
            ],
            &[2, 3],
        );
        let events = presses(KEY_A, 3, 80, 200);
        let v = FeatureExtractor::new(&c, 5).extract("test", &events).unwrap();
        // Both children fell back to the same (unsupported) root.
        assert_eq!(v.values[0], FeatureValue::Undefined);
        assert_eq!(v.values[1], FeatureValue::Undefined);

        let mut events = presses(KEY_A, 6, 80, 200);
        events.extend(presses(KEY_Z, 1, 80, 5000));
        let v = FeatureExtractor::new(&c, 5).extract("test", &events).unwrap();
        // z falls back to the root; a is supported on its own.
        let root_mean = 80.0;
        assert_eq!(v.values[0], FeatureValue::Defined(root_mean));
        assert_eq!(v.values[1], FeatureValue::Defined(80.0));
    }

    #[test]
    fn transition_latencies_distinguish_t1_and_t2() {
        // a pressed at 0..80, z pressed at 150..230: release-to-press 70,
        // press-to-press 150.
        let events = vec![
            KeystrokeEvent {
                key: KeyId(KEY_A),
                time_press: 0,
                time_release: 80,
            },
            KeystrokeEvent {
                key: KeyId(KEY_Z),
                time_press: 150,
                time_release: 230,
            },
        ];
        let c = catalog(
            vec![
                def(1, FeatureKind::Transition1, &[KEY_A], &[KEY_Z], Measure::Mean, None),
                def(2, FeatureKind::Transition2, &[KEY_A], &[KEY_Z], Measure::Mean, None),
            ],
            &[1, 2],
        );
        let v = FeatureExtractor::new(&c, 1).extract("test", &events).unwrap();
        assert_eq!(v.values[0], FeatureValue::Defined(70.0));
        assert_eq!(v.values[1], FeatureValue::Defined(150.0));
    }

    #[test]
    fn extraction_is_idempotent() {
        let c = catalog(
            vec![def(1, FeatureKind::Duration, &[KEY_A], &[], Measure::StdDev, None)],
            &[1],
        );
        let events = presses(KEY_A, 12, 90, 250);
        let ex = FeatureExtractor::new(&c, 5);
        let a = ex.extract("test", &events).unwrap();
        let b = ex.extract("test", &events).unwrap();
        assert_eq!(a.values, b.values);
    }
}
