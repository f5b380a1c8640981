//! Feature catalog: an id-indexed arena of definitions whose fallback links
//! form a forest, plus named feature sets. Integrity is checked once at
//! construction; lookups after that cannot observe a malformed catalog.

use super::FeatureId;
use crate::errors::BioauthError;
use crate::keystroke::KeyId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Hold time of keys in `group1`; `group2` is unused.
    Duration,
    /// Release-to-press latency of adjacent `group1` -> `group2` pairs.
    Transition1,
    /// Press-to-press latency of adjacent `group1` -> `group2` pairs.
    Transition2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Mean,
    StdDev,
}

/// One node of the feature forest. `fallback` points at a strictly
/// coarser-grained ancestor; roots have none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDefinition {
    pub id: FeatureId,
    pub kind: FeatureKind,
    pub group1: BTreeSet<KeyId>,
    #[serde(default)]
    pub group2: BTreeSet<KeyId>,
    pub measure: Measure,
    pub fallback: Option<FeatureId>,
}

#[derive(Debug, Clone)]
pub struct FeatureCatalog {
    defs: Vec<FeatureDefinition>,
    index: HashMap<FeatureId, usize>,
    sets: HashMap<String, Vec<FeatureId>>,
}

impl FeatureCatalog {
    /// Build and validate a catalog from its definitions and named sets.
    pub fn new(
        defs: Vec<FeatureDefinition>,
        sets: impl IntoIterator<Item = (String, Vec<FeatureId>)>,
    ) -> Result<Self, BioauthError> {
        let mut index = HashMap::with_capacity(defs.len());
        for (pos, def) in defs.iter().enumerate() {
            if index.insert(def.id, pos).is_some() {
                return Err(BioauthError::InvalidCatalog(format!(
                    "duplicate feature id {}",
                    def.id
                )));
            }
        }

        for def in &defs {
            if def.group1.is_empty() {
                return Err(BioauthError::InvalidCatalog(format!(
                    "feature {} has an empty key group",
                    def.id
                )));
            }
            if def.kind != FeatureKind::Duration && def.group2.is_empty() {
                return Err(BioauthError::InvalidCatalog(format!(
                    "transition feature {} has an empty second key group",
                    def.id
                )));
            }
            if let Some(parent) = def.fallback {
                if parent == def.id {
                    return Err(BioauthError::InvalidCatalog(format!(
                        "feature {} falls back to itself",
                        def.id
                    )));
                }
                if !index.contains_key(&parent) {
                    return Err(BioauthError::InvalidCatalog(format!(
                        "feature {} falls back to unknown feature {parent}",
                        def.id
                    )));
                }
            }
        }

        // Cycle check: every chain must reach a root within |defs| hops.
        for def in &defs {
            let mut hops = 0usize;
            let mut cursor = def.fallback;
            while let Some(parent) = cursor {
                hops += 1;
                if hops > defs.len() {
                    return Err(BioauthError::InvalidCatalog(format!(
                        "fallback cycle reachable from feature {}",
                        def.id
                    )));
                }
                cursor = defs[index[&parent]].fallback;
            }
        }

        let sets: HashMap<String, Vec<FeatureId>> = sets.into_iter().collect();
        for (name, ids) in &sets {
            for id in ids {
                if !index.contains_key(id) {
                    return Err(BioauthError::InvalidCatalog(format!(
                        "feature set `{name}` references unknown feature {id}"
                    )));
                }
            }
        }

        Ok(Self { defs, index, sets })
    }

    pub fn resolve(&self, id: FeatureId) -> Result<&FeatureDefinition, BioauthError> {
        self.index
            .get(&id)
            .map(|&pos| &self.defs[pos])
            .ok_or(BioauthError::UnknownFeature(id))
    }

    /// The definition itself followed by each ancestor up to the root.
    pub fn fallback_chain(&self, id: FeatureId) -> Result<Vec<FeatureId>, BioauthError> {
        let mut chain = vec![self.resolve(id)?.id];
        let mut cursor = self.resolve(id)?.fallback;
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.resolve(parent)?.fallback;
        }
        Ok(chain)
    }

    pub fn feature_set(&self, name: &str) -> Result<&[FeatureId], BioauthError> {
        self.sets
            .get(name)
            .map(|ids| ids.as_slice())
            .ok_or_else(|| BioauthError::UnknownFeatureSet(name.to_string()))
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FeatureDefinition> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duration(id: u32, keys: &[u16], fallback: Option<u32>) -> FeatureDefinition {
        FeatureDefinition {
            id: FeatureId(id),
            kind: FeatureKind::Duration,
            group1: keys.iter().map(|&k| KeyId(k)).collect(),
            group2: BTreeSet::new(),
            measure: Measure::Mean,
            fallback: fallback.map(FeatureId),
        }
    }

    #[test]
    fn chain_runs_leaf_to_root() {
        let catalog = FeatureCatalog::new(
            vec![
                duration(1, &[1, 2], None),
                duration(2, &[1], Some(1)),
                duration(3, &[2], Some(2)),
            ],
            [("set".to_string(), vec![FeatureId(3)])],
        )
        .unwrap();
        assert_eq!(
            catalog.fallback_chain(FeatureId(3)).unwrap(),
            vec![FeatureId(3), FeatureId(2), FeatureId(1)]
        );
        assert_eq!(catalog.fallback_chain(FeatureId(1)).unwrap(), vec![FeatureId(1)]);
    }

    #[test]
    fn rejects_fallback_cycle() {
        let err = FeatureCatalog::new(
            vec![duration(1, &[1], Some(2)), duration(2, &[2], Some(1))],
            [],
        )
        .unwrap_err();
        assert!(matches!(err, BioauthError::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_unknown_set_member() {
        let err = FeatureCatalog::new(
            vec![duration(1, &[1], None)],
            [("set".to_string(), vec![FeatureId(9)])],
        )
        .unwrap_err();
        assert!(matches!(err, BioauthError::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_duplicate_and_self_fallback() {
        assert!(FeatureCatalog::new(
            vec![duration(1, &[1], None), duration(1, &[2], None)],
            []
        )
        .is_err());
        assert!(FeatureCatalog::new(vec![duration(1, &[1], Some(1))], []).is_err());
    }

    #[test]
    fn unknown_feature_lookup() {
        let catalog = FeatureCatalog::new(vec![duration(1, &[1], None)], []).unwrap();
        assert!(matches!(
            catalog.resolve(FeatureId(5)),
            Err(BioauthError::UnknownFeature(FeatureId(5)))
        ));
        assert!(matches!(
            catalog.feature_set("nope"),
            Err(BioauthError::UnknownFeatureSet(_))
        ));
    }
}
