//! Projects reconciled settings onto the tiles a surface draws

use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::catalog::{Catalog, TileDefinition};
use crate::settings::TileSettings;

/// Reports whether the current session holds elevated privilege
pub trait Authorization {
    /// `None` while unknown or when the check failed
    fn privilege(&self) -> Option<bool>;
}

impl Authorization for bool {
    fn privilege(&self) -> Option<bool> {
        Some(*self)
    }
}

impl Authorization for Option<bool> {
    fn privilege(&self) -> Option<bool> {
        *self
    }
}

/// Fail closed: unknown privilege is no privilege
pub fn is_privileged(auth: &impl Authorization) -> bool {
    auth.privilege().unwrap_or(false)
}

/// Where the tiles are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Surface {
    /// Dashboard action tiles
    #[default]
    Dashboard,
    /// History tab strip; only entries that own a history tab
    History,
}

/// One entry to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTile<'a> {
    pub tile: &'a TileDefinition,
    /// Label for this surface
    pub label: &'static str,
}

/// Eligible, visible tiles in user order
///
/// Eligible tiles missing from `settings.order` still render, after the
/// ordered ones and in catalog order, unless explicitly hidden.
pub fn tiles_to_render<'a>(
    settings: &TileSettings,
    catalog: &'a Catalog,
    auth: &impl Authorization,
    surface: Surface,
) -> Vec<RenderTile<'a>> {
    let privileged = is_privileged(auth);
    let eligible: HashMap<&str, &TileDefinition> = catalog
        .eligible(privileged)
        .filter(|tile| surface_accepts(surface, tile))
        .map(|tile| (tile.id, tile))
        .collect();

    // Unreconciled settings may repeat an id; first occurrence wins
    let mut seen = HashSet::with_capacity(eligible.len());
    let mut tiles: Vec<&TileDefinition> = settings
        .visible_ordered_ids()
        .into_iter()
        .filter_map(|id| eligible.get(id).copied())
        .filter(|tile| seen.insert(tile.id))
        .collect();

    let unordered: Vec<&TileDefinition> = catalog
        .eligible(privileged)
        .filter(|tile| surface_accepts(surface, tile))
        .filter(|tile| settings.position(tile.id).is_none() && settings.is_visible(tile.id))
        .collect();
    if !unordered.is_empty() {
        warn!(count = unordered.len(), "Eligible tiles missing from settings order, appending in catalog order");
        tiles.extend(unordered);
    }

    tiles
        .into_iter()
        .map(|tile| RenderTile {
            tile,
            label: label_for(surface, tile),
        })
        .collect()
}

fn surface_accepts(surface: Surface, tile: &TileDefinition) -> bool {
    match surface {
        Surface::Dashboard => true,
        Surface::History => tile.has_history(),
    }
}

fn label_for(surface: Surface, tile: &TileDefinition) -> &'static str {
    match surface {
        Surface::Dashboard => tile.title,
        Surface::History => tile.history_title.unwrap_or(tile.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::reconcile;

    fn ids(tiles: &[RenderTile<'_>]) -> Vec<&'static str> {
        tiles.iter().map(|t| t.tile.id).collect()
    }

    #[test]
    fn test_dashboard_follows_settings_order() {
        let catalog = Catalog::builtin();
        let base = reconcile(None, &catalog.eligible_ids(false));
        let mut order = base.order.clone();
        order.swap(0, 1);
        let settings = base.apply_order(order).unwrap().apply_visibility("asthma", false).unwrap();

        let tiles = tiles_to_render(&settings, &catalog, &false, Surface::Dashboard);
        let rendered = ids(&tiles);
        assert_eq!(&rendered[..2], &["weight", "feeding"]);
        assert!(!rendered.contains(&"asthma"));
        assert!(!rendered.contains(&"admin"));
        assert!(!rendered.contains(&"medications"));
    }

    #[test]
    fn test_duplicate_ids_render_once() {
        let catalog = Catalog::builtin();
        let settings = TileSettings {
            order: ["weight", "feeding", "weight"].iter().map(|s| s.to_string()).collect(),
            visible: Default::default(),
        };

        let tiles = tiles_to_render(&settings, &catalog, &false, Surface::Dashboard);
        let rendered = ids(&tiles);
        assert_eq!(&rendered[..2], &["weight", "feeding"]);
        assert_eq!(rendered.iter().filter(|id| **id == "weight").count(), 1);
    }

    #[test]
    fn test_privileged_tile_needs_privilege() {
        let catalog = Catalog::builtin();
        let settings = reconcile(None, &catalog.eligible_ids(true));

        let admin = tiles_to_render(&settings, &catalog, &true, Surface::Dashboard);
        assert!(ids(&admin).contains(&"admin"));

        let unknown = tiles_to_render(&settings, &catalog, &None::<bool>, Surface::Dashboard);
        assert!(!ids(&unknown).contains(&"admin"));
    }

    #[test]
    fn test_history_surface_uses_history_tabs() {
        let catalog = Catalog::builtin();
        let settings = reconcile(None, &catalog.eligible_ids(true));

        let tiles = tiles_to_render(&settings, &catalog, &true, Surface::History);
        let rendered = ids(&tiles);
        assert!(!rendered.contains(&"history"));
        assert!(!rendered.contains(&"admin"));
        assert_eq!(tiles[0].label, "Feeding");
    }

    #[test]
    fn test_unordered_eligible_tiles_are_not_dropped() {
        let catalog = Catalog::builtin();
        let settings = TileSettings {
            order: vec!["weight".to_string()],
            visible: [("asthma".to_string(), false)].into_iter().collect(),
        };

        let rendered = ids(&tiles_to_render(&settings, &catalog, &false, Surface::Dashboard));
        assert_eq!(rendered[0], "weight");
        assert_eq!(rendered[1], "feeding");
        assert!(!rendered.contains(&"asthma"));
        assert_eq!(rendered.len(), catalog.eligible_ids(false).len() - 1);
    }
}
