//! Selection state of the gallery grid
//!
//! Holds the ordered grid items (an optional camera item followed by assets,
//! most recent first) and the set of selected assets. Membership is decided
//! by asset identity, so a selection survives reloads of the item list.

use media_library::Asset;
use std::collections::HashSet;

/// Entry of the gallery grid
#[derive(Debug, Clone, PartialEq)]
pub enum GridItem {
    /// Opens the capture UI; never selectable
    Camera,
    Asset(Asset),
}

#[derive(Debug, Clone)]
pub struct SelectionModel {
    single_select: bool,
    max_selectable: usize,
    camera_item: bool,
    assets: Vec<Asset>,
    items: Vec<GridItem>,
    selected: HashSet<Asset>,
}

impl SelectionModel {
    pub fn new(single_select: bool, max_selectable: usize) -> Self {
        Self {
            single_select,
            max_selectable,
            camera_item: false,
            assets: Vec::new(),
            items: Vec::new(),
            selected: HashSet::new(),
        }
    }

    /// Shows or hides the leading camera item
    pub fn set_camera_item(&mut self, shown: bool) {
        self.camera_item = shown;
        self.rebuild();
    }

    /// Replaces the asset list; `assets` is oldest first, items are newest first
    pub fn set_items(&mut self, assets: Vec<Asset>) {
        self.assets = assets.into_iter().rev().collect();
        self.rebuild();
    }

    /// Seeds the selection with the identities of `assets`
    ///
    /// Defaults are trusted and not checked against the maximum count.
    /// Assets without an identity are ignored.
    pub fn set_default_selection(&mut self, assets: &[Asset]) {
        self.selected = assets.iter().filter(|a| a.id().is_some()).cloned().collect();
    }

    fn rebuild(&mut self) {
        self.items.clear();
        if self.camera_item {
            self.items.push(GridItem::Camera);
        }
        self.items
            .extend(self.assets.iter().cloned().map(GridItem::Asset));
    }

    fn asset_at(&self, index: usize) -> Option<&Asset> {
        match self.items.get(index) {
            Some(GridItem::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    /// Selects the asset at `index`; returns whether the selection changed
    pub fn select(&mut self, index: usize) -> bool {
        let Some(asset) = self.asset_at(index).cloned() else {
            return false;
        };
        if self.selected.contains(&asset) {
            return false;
        }
        if self.single_select {
            self.selected.clear();
        } else if self.selected.len() >= self.max_selectable {
            log::debug!(
                "Selection full ({} of {}), ignoring index {}",
                self.selected.len(),
                self.max_selectable,
                index
            );
            return false;
        }
        self.selected.insert(asset);
        true
    }

    /// Deselects the asset at `index`; returns whether the selection changed
    pub fn deselect(&mut self, index: usize) -> bool {
        match self.asset_at(index).cloned() {
            Some(asset) => self.selected.remove(&asset),
            None => false,
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.asset_at(index)
            .map(|asset| self.selected.contains(asset))
            .unwrap_or(false)
    }

    /// Snapshot of the selected assets, including ones not in the item list
    pub fn selected_assets(&self) -> HashSet<Asset> {
        self.selected.clone()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Indices of selected items in item order
    pub fn selected_indices(&self) -> Vec<usize> {
        (0..self.items.len())
            .filter(|i| self.is_selected(*i))
            .collect()
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&GridItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_single_select(&self) -> bool {
        self.single_select
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_library::{AssetId, MediaKind};

    fn assets(count: usize) -> Vec<Asset> {
        (0..count)
            .map(|i| Asset::from_store(AssetId::new(format!("asset-{}", i)), MediaKind::Image))
            .collect()
    }

    fn id_at(model: &SelectionModel, index: usize) -> String {
        match model.item(index) {
            Some(GridItem::Asset(asset)) => asset.id().unwrap().to_string(),
            other => panic!("no asset at {}: {:?}", index, other),
        }
    }

    #[test]
    fn test_items_are_newest_first_with_camera() {
        let mut model = SelectionModel::new(false, 10);
        model.set_camera_item(true);
        model.set_items(assets(3));
        assert_eq!(model.len(), 4);
        assert_eq!(model.item(0), Some(&GridItem::Camera));
        assert_eq!(id_at(&model, 1), "asset-2");
        assert_eq!(id_at(&model, 3), "asset-0");
    }

    #[test]
    fn test_camera_item_is_never_selected() {
        let mut model = SelectionModel::new(false, 10);
        model.set_camera_item(true);
        model.set_items(assets(2));
        assert!(!model.select(0));
        assert!(!model.is_selected(0));
        assert_eq!(model.selected_count(), 0);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut model = SelectionModel::new(false, 10);
        model.set_items(assets(2));
        assert!(!model.select(5));
        assert!(!model.deselect(5));
    }

    #[test]
    fn test_single_select_replaces_previous() {
        let mut model = SelectionModel::new(true, 10);
        model.set_items(assets(6));
        assert!(model.select(2));
        assert!(model.select(5));
        assert!(!model.is_selected(2));
        assert!(model.is_selected(5));
        let selected = model.selected_assets();
        assert_eq!(selected.len(), 1);
        assert!(selected.contains(&assets(6)[0]));
    }

    #[test]
    fn test_max_count_rejects_extra_selection() {
        let mut model = SelectionModel::new(false, 2);
        model.set_items(assets(3));
        assert!(model.select(0));
        assert!(model.select(1));
        assert!(!model.select(2));
        assert_eq!(model.selected_count(), 2);
        assert!(!model.is_selected(2));
    }

    #[test]
    fn test_zero_max_count_is_always_full() {
        let mut model = SelectionModel::new(false, 0);
        model.set_items(assets(1));
        assert!(!model.select(0));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut model = SelectionModel::new(false, 5);
        model.set_items(assets(3));
        assert!(model.select(1));
        let before = model.selected_assets();
        assert!(!model.select(1));
        assert_eq!(model.selected_assets(), before);
    }

    #[test]
    fn test_deselect_absent_is_noop() {
        let mut model = SelectionModel::new(false, 5);
        model.set_items(assets(3));
        assert!(!model.deselect(0));
        model.select(0);
        assert!(model.deselect(0));
        assert_eq!(model.selected_count(), 0);
    }

    #[test]
    fn test_selection_survives_reload() {
        let mut model = SelectionModel::new(false, 5);
        model.set_items(assets(3));
        model.select(0); // asset-2
        model.select(2); // asset-0

        let mut more = assets(4);
        more.remove(0); // asset-0 gone from the list
        model.set_items(more);

        // asset-3, asset-2, asset-1
        assert_eq!(model.selected_indices(), vec![1]);
        assert_eq!(model.selected_count(), 2);
    }

    #[test]
    fn test_stale_defaults_count_toward_cap() {
        let mut model = SelectionModel::new(false, 2);
        let stale = Asset::from_store(AssetId::new("gone"), MediaKind::Image);
        let captured = Asset::captured_image(vec![1], None);
        model.set_default_selection(&[stale.clone(), captured]);
        model.set_items(assets(3));

        assert_eq!(model.selected_count(), 1);
        assert!(model.selected_indices().is_empty());
        assert!(model.select(0));
        assert!(!model.select(1));
        assert!(model.selected_assets().contains(&stale));
    }

    #[test]
    fn test_random_sequences_respect_cap() {
        let mut model = SelectionModel::new(false, 3);
        model.set_camera_item(true);
        model.set_items(assets(8));
        let mut seed = 7u64;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let index = (seed >> 33) as usize % 10;
            if seed & 1 == 0 {
                model.select(index);
            } else {
                model.deselect(index);
            }
            assert!(model.selected_count() <= 3);
            let indices = model.selected_indices();
            assert_eq!(indices.len(), model.selected_count());
            assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
