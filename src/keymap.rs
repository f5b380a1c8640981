//! United States English key table: key names to stable key ids.
//! Ids are fixed so that stored event streams and catalogs stay comparable
//! across installations.

use crate::errors::BioauthError;
use crate::keystroke::KeyId;
use std::collections::BTreeSet;

const KEYS: &[(&str, u16)] = &[
    ("a", 1),
    ("b", 2),
    ("c", 3),
    ("d", 4),
    ("e", 5),
    ("f", 6),
    ("g", 7),
    ("h", 8),
    ("i", 9),
    ("j", 10),
    ("k", 11),
    ("l", 12),
    ("m", 13),
    ("n", 14),
    ("o", 15),
    ("p", 16),
    ("q", 17),
    ("r", 18),
    ("s", 19),
    ("t", 20),
    ("u", 21),
    ("v", 22),
    ("w", 23),
    ("x", 24),
    ("y", 25),
    ("z", 26),
    ("enter", 27),
    ("space", 28),
    ("tab", 29),
    ("escape", 30),
    ("backspace", 31),
    ("shift", 32),
    ("ctrl", 33),
    ("alt", 34),
    ("caps_lock", 35),
    ("num_lock", 36),
    ("0", 37),
    ("1", 38),
    ("2", 39),
    ("3", 40),
    ("4", 41),
    ("5", 42),
    ("6", 43),
    ("7", 44),
    ("8", 45),
    ("9", 46),
    ("semicolon", 47),
    ("equals", 48),
    ("comma", 49),
    ("dash", 50),
    ("period", 51),
    ("slash", 52),
];

pub fn key_id(name: &str) -> Option<KeyId> {
    KEYS.iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, id)| KeyId(id))
}

/// Parse a comma-separated list of key names into a key group.
pub fn key_group(names: &str) -> Result<BTreeSet<KeyId>, BioauthError> {
    let mut group = BTreeSet::new();
    for name in names.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let id = key_id(name).ok_or_else(|| {
            BioauthError::InvalidCatalog(format!("unknown key name `{name}`"))
        })?;
        group.insert(id);
    }
    Ok(group)
}

/// Keys that leave a visible mark in typed text; the usual universe for
/// duration and transition statistics.
pub fn visible_keys() -> Vec<KeyId> {
    let visible = "abcdefghijklmnopqrstuvwxyz0123456789"
        .chars()
        .map(|c| c.to_string())
        .chain(["comma", "period", "semicolon", "slash"].map(String::from));
    visible
        .filter_map(|name| key_id(&name))
        .collect()
}
