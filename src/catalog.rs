//! Tile catalog: every tile the application knows about
//!
//! The catalog is compiled in and append-only. Only persisted settings
//! reorder tiles; catalog order is the default order for new users and
//! for tiles added in later releases.

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Symbolic color key, styling only
    pub color: &'static str,
    /// Destination view or action when the tile is activated
    pub target: &'static str,
    /// `false` keeps the entry out of every orderable tile list
    pub is_tile: bool,
    /// Shown only to sessions holding elevated privilege
    pub is_privileged: bool,
    /// Tab title on the history surface; `None` means no history tab
    pub history_title: Option<&'static str>,
}

impl TileDefinition {
    pub const fn new(
        id: &'static str,
        title: &'static str,
        subtitle: &'static str,
        color: &'static str,
        target: &'static str,
    ) -> Self {
        Self {
            id,
            title,
            subtitle,
            color,
            target,
            is_tile: true,
            is_privileged: false,
            history_title: None,
        }
    }

    pub const fn with_history(mut self, title: &'static str) -> Self {
        self.history_title = Some(title);
        self
    }

    pub const fn privileged(mut self) -> Self {
        self.is_privileged = true;
        self
    }

    pub const fn not_a_tile(mut self) -> Self {
        self.is_tile = false;
        self
    }

    pub fn has_history(&self) -> bool {
        self.history_title.is_some()
    }

    /// Whether this entry may appear in configuration and render output
    pub fn is_eligible(&self, privileged: bool) -> bool {
        self.is_tile && (privileged || !self.is_privileged)
    }
}

const DEFAULT_TILES: &[TileDefinition] = &[
    TileDefinition::new("feeding", "Daily food portion", "Log a portion", "brown", "feeding-form")
        .with_history("Feeding"),
    TileDefinition::new("weight", "Weight", "Log weight", "orange", "weight-form")
        .with_history("Weight"),
    TileDefinition::new("asthma", "Asthma attack", "Log an attack", "red", "asthma-form")
        .with_history("Asthma"),
    TileDefinition::new("defecation", "Defecation", "Log defecation", "green", "defecation-form")
        .with_history("Defecation"),
    TileDefinition::new("litter", "Litter change", "Log a litter change", "purple", "litter-form")
        .with_history("Litter"),
    TileDefinition::new("eye_drops", "Eye drops", "Log drops", "teal", "eye-drops-form")
        .with_history("Eye drops"),
    TileDefinition::new("tooth_brushing", "Tooth brushing", "Log brushing", "cyan", "tooth-brushing-form")
        .with_history("Tooth brushing"),
    TileDefinition::new("ear_cleaning", "Ear cleaning", "Log cleaning", "purple", "ear-cleaning-form")
        .with_history("Ear cleaning"),
    TileDefinition::new("history", "History", "Browse records", "blue", "history"),
    TileDefinition::new("admin", "Admin panel", "Manage users", "pink", "admin-panel").privileged(),
    TileDefinition::new("medications", "Medications", "Medication schedule", "yellow", "medications")
        .with_history("Medications")
        .not_a_tile(),
];

/// Ordered, immutable list of tile definitions
#[derive(Debug, Clone)]
pub struct Catalog {
    tiles: Vec<TileDefinition>,
}

impl Catalog {
    pub fn new(tiles: Vec<TileDefinition>) -> Self {
        Self { tiles }
    }

    /// The catalog shipped with the application
    pub fn builtin() -> Self {
        Self::new(DEFAULT_TILES.to_vec())
    }

    pub fn tiles(&self) -> &[TileDefinition] {
        &self.tiles
    }

    pub fn get(&self, id: &str) -> Option<&TileDefinition> {
        self.tiles.iter().find(|tile| tile.id == id)
    }

    /// Entries that can be configured and ordered for this session, in catalog order
    pub fn eligible(&self, privileged: bool) -> impl Iterator<Item = &TileDefinition> {
        self.tiles.iter().filter(move |tile| tile.is_eligible(privileged))
    }

    /// Ids of [`Catalog::eligible`] entries
    pub fn eligible_ids(&self, privileged: bool) -> Vec<&'static str> {
        self.eligible(privileged).map(|tile| tile.id).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_unique() {
        let catalog = Catalog::builtin();
        let ids: HashSet<_> = catalog.tiles().iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), catalog.tiles().len());
    }

    #[test]
    fn test_eligible_hides_privileged_and_non_tiles() {
        let catalog = Catalog::builtin();

        let standard = catalog.eligible_ids(false);
        assert!(!standard.contains(&"admin"));
        assert!(!standard.contains(&"medications"));
        assert_eq!(standard.first(), Some(&"feeding"));

        let privileged = catalog.eligible_ids(true);
        assert!(privileged.contains(&"admin"));
        assert!(!privileged.contains(&"medications"));
        assert_eq!(privileged.len(), standard.len() + 1);
    }
}
