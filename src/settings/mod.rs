//! Tile settings model
//!
//! A [`TileSettings`] value is the user's (order, visibility) layer on top of
//! the catalog. Values are immutable per revision: every mutation returns a
//! new value and leaves the receiver untouched.

mod stored;

pub use stored::{decode_stored, decode_stored_str};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// Errors raised by settings mutations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The proposed order is not a permutation of the current one
    #[error("Invalid tile order: {reason}")]
    InvalidOrder { reason: String },

    /// The tile id is not part of the current order
    #[error("Unknown tile '{0}'")]
    UnknownTile(String),
}

/// Persisted tile configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSettings {
    /// Tile ids in display order
    #[serde(default)]
    pub order: Vec<String>,
    /// Per-tile visibility; absent means visible
    #[serde(default)]
    pub visible: BTreeMap<String, bool>,
}

impl TileSettings {
    /// Catalog order, everything visible
    pub fn default_for(catalog_ids: &[&str]) -> Self {
        let mut settings = Self::default();
        for id in catalog_ids {
            if settings.visible.insert(id.to_string(), true).is_none() {
                settings.order.push(id.to_string());
            }
        }
        settings
    }

    /// Visibility of a single tile, defaulting to visible
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(id).copied().unwrap_or(true)
    }

    /// Position of `id` in the current order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|entry| entry == id)
    }

    /// Replace the order with a permutation of itself
    pub fn apply_order(&self, new_order: Vec<String>) -> Result<Self, SettingsError> {
        check_permutation(&self.order, &new_order)?;
        Ok(Self {
            order: new_order,
            visible: self.visible.clone(),
        })
    }

    /// Set visibility of a tile that is part of the order
    pub fn apply_visibility(&self, id: &str, visible: bool) -> Result<Self, SettingsError> {
        if self.position(id).is_none() {
            return Err(SettingsError::UnknownTile(id.to_string()));
        }
        let mut next = self.clone();
        next.visible.insert(id.to_string(), visible);
        Ok(next)
    }

    /// Order filtered to visible tiles; this is what surfaces render
    pub fn visible_ordered_ids(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(String::as_str)
            .filter(|id| self.is_visible(id))
            .collect()
    }
}

fn check_permutation(current: &[String], proposed: &[String]) -> Result<(), SettingsError> {
    let mut seen = HashSet::with_capacity(proposed.len());
    if let Some(dup) = proposed.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(SettingsError::InvalidOrder {
            reason: format!("'{dup}' appears more than once"),
        });
    }

    let current_ids: HashSet<&str> = current.iter().map(String::as_str).collect();
    if let Some(extra) = proposed.iter().find(|id| !current_ids.contains(id.as_str())) {
        return Err(SettingsError::InvalidOrder {
            reason: format!("'{extra}' is not in the current order"),
        });
    }
    if let Some(missing) = current.iter().find(|id| !seen.contains(id.as_str())) {
        return Err(SettingsError::InvalidOrder {
            reason: format!("'{missing}' is missing"),
        });
    }
    Ok(())
}

/// Merge a stored value against the eligible catalog ids
///
/// Post-conditions: `order` holds every catalog id exactly once; stored ids
/// keep their relative order (first occurrence wins on duplicates); ids the
/// catalog no longer has are dropped from `order` and `visible`; new catalog
/// ids are appended in catalog order and default to visible.
pub fn reconcile(raw: Option<&TileSettings>, catalog_ids: &[&str]) -> TileSettings {
    let Some(raw) = raw else {
        return TileSettings::default_for(catalog_ids);
    };

    let known: HashSet<&str> = catalog_ids.iter().copied().collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(catalog_ids.len());
    let mut order = Vec::with_capacity(catalog_ids.len());
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for id in &raw.order {
        if !known.contains(id.as_str()) {
            dropped += 1;
        } else if !seen.insert(id.as_str()) {
            duplicates += 1;
        } else {
            order.push(id.clone());
        }
    }

    let mut appended = 0usize;
    for &id in catalog_ids {
        if seen.insert(id) {
            order.push(id.to_string());
            appended += 1;
        }
    }

    let visible = order
        .iter()
        .map(|id| (id.clone(), raw.is_visible(id)))
        .collect();

    if dropped + duplicates + appended > 0 {
        debug!(dropped, duplicates, appended, "Reconciled stored tile settings");
    }

    TileSettings { order, visible }
}
