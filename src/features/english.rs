//! Built-in en-US feature catalog. Duration statistics form a forest rooted
//! at the visible-key group, descending hand -> finger -> individual key;
//! transition statistics cover hand and finger pairs with the all-visible
//! pair as root. Under-sampled leaves fall back along those edges.

use super::catalog::{FeatureCatalog, FeatureDefinition, FeatureKind, Measure};
use super::FeatureId;
use crate::errors::BioauthError;
use crate::keymap;
use crate::keystroke::KeyId;
use crate::stats::Product;
use std::collections::BTreeSet;

/// Name of the feature set registered by [`english_catalog`].
pub const FEATURE_SET_EN_US: &str = "en-us";

const VISIBLE: &str = "a,b,c,d,e,f,g,h,i,j,k,l,m,n,o,p,q,r,s,t,u,v,w,x,y,z,\
                       0,1,2,3,4,5,6,7,8,9,comma,period,semicolon,slash";
const LEFT_HAND: &str = "q,w,e,r,t,a,s,d,f,g,z,x,c,v,b,1,2,3,4,5";
const RIGHT_HAND: &str = "y,u,i,o,p,h,j,k,l,n,m,6,7,8,9,0";

/// Finger key groups with the owning hand (0 = left, 1 = right).
const FINGERS: &[(&str, usize)] = &[
    ("a,z,1,q", 0),
    ("s,x,2,w", 0),
    ("d,c,3,e", 0),
    ("f,b,g,r,4,t,5,v", 0),
    ("h,m,j,y,6,u,7,n", 1),
    ("k,comma,8,i", 1),
    ("l,period,9,o", 1),
    ("semicolon,slash,0,p", 1),
];

pub fn english_catalog() -> Result<FeatureCatalog, BioauthError> {
    let visible = keymap::key_group(VISIBLE)?;
    let hands = [keymap::key_group(LEFT_HAND)?, keymap::key_group(RIGHT_HAND)?];
    let mut fingers: Vec<(BTreeSet<KeyId>, usize)> = Vec::with_capacity(FINGERS.len());
    for &(names, hand) in FINGERS {
        fingers.push((keymap::key_group(names)?, hand));
    }

    let mut defs: Vec<FeatureDefinition> = Vec::new();
    let mut set: Vec<FeatureId> = Vec::new();
    let mut next = 0u32;
    let mut push = |defs: &mut Vec<FeatureDefinition>,
                    set: &mut Vec<FeatureId>,
                    kind: FeatureKind,
                    group1: BTreeSet<KeyId>,
                    group2: BTreeSet<KeyId>,
                    measure: Measure,
                    fallback: Option<FeatureId>|
     -> FeatureId {
        next += 1;
        let id = FeatureId(next);
        defs.push(FeatureDefinition {
            id,
            kind,
            group1,
            group2,
            measure,
            fallback,
        });
        set.push(id);
        id
    };

    for measure in [Measure::Mean, Measure::StdDev] {
        let root = push(
            &mut defs,
            &mut set,
            FeatureKind::Duration,
            visible.clone(),
            BTreeSet::new(),
            measure,
            None,
        );
        let hand_ids = [
            push(
                &mut defs,
                &mut set,
                FeatureKind::Duration,
                hands[0].clone(),
                BTreeSet::new(),
                measure,
                Some(root),
            ),
            push(
                &mut defs,
                &mut set,
                FeatureKind::Duration,
                hands[1].clone(),
                BTreeSet::new(),
                measure,
                Some(root),
            ),
        ];
        for (group, hand) in &fingers {
            let finger_id = push(
                &mut defs,
                &mut set,
                FeatureKind::Duration,
                group.clone(),
                BTreeSet::new(),
                measure,
                Some(hand_ids[*hand]),
            );
            for key in group {
                push(
                    &mut defs,
                    &mut set,
                    FeatureKind::Duration,
                    BTreeSet::from([*key]),
                    BTreeSet::new(),
                    measure,
                    Some(finger_id),
                );
            }
        }
    }

    for kind in [FeatureKind::Transition1, FeatureKind::Transition2] {
        let root = push(
            &mut defs,
            &mut set,
            kind,
            visible.clone(),
            visible.clone(),
            Measure::Mean,
            None,
        );
        let mut hand_pairs = [[root; 2]; 2];
        for pair in Product::new(&[vec![0usize, 1], vec![0usize, 1]]) {
            let (a, b) = (pair[0], pair[1]);
            hand_pairs[a][b] = push(
                &mut defs,
                &mut set,
                kind,
                hands[a].clone(),
                hands[b].clone(),
                Measure::Mean,
                Some(root),
            );
        }
        let finger_indices: Vec<usize> = (0..fingers.len()).collect();
        for pair in Product::new(&[finger_indices.clone(), finger_indices.clone()]) {
            let (a, b) = (pair[0], pair[1]);
            let parent = hand_pairs[fingers[a].1][fingers[b].1];
            push(
                &mut defs,
                &mut set,
                kind,
                fingers[a].0.clone(),
                fingers[b].0.clone(),
                Measure::Mean,
                Some(parent),
            );
        }
    }

    FeatureCatalog::new(defs, [(FEATURE_SET_EN_US.to_string(), set)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_and_validates() {
        let catalog = english_catalog().unwrap();
        // 2 measures x (1 root + 2 hands + 8 fingers + 40 keys)
        // + 2 transition kinds x (1 root + 4 hand pairs + 64 finger pairs)
        assert_eq!(catalog.len(), 240);
        let set = catalog.feature_set(FEATURE_SET_EN_US).unwrap();
        assert_eq!(set.len(), 240);
    }

    #[test]
    fn every_chain_ends_at_a_root() {
        let catalog = english_catalog().unwrap();
        for def in catalog.definitions() {
            let chain = catalog.fallback_chain(def.id).unwrap();
            let last = catalog.resolve(*chain.last().unwrap()).unwrap();
            assert!(last.fallback.is_none());
            assert!(chain.len() <= 4);
        }
    }

    #[test]
    fn key_duration_falls_back_through_finger_and_hand() {
        let catalog = english_catalog().unwrap();
        // The first per-key mean duration is key `a` under the left little
        // finger: key -> finger -> hand -> visible root.
        let leaf = catalog
            .definitions()
            .find(|d| {
                d.kind == FeatureKind::Duration
                    && d.measure == Measure::Mean
                    && d.group1.len() == 1
            })
            .map(|d| d.id)
            .unwrap();
        let chain = catalog.fallback_chain(leaf).unwrap();
        assert_eq!(chain.len(), 4);
    }
}
