//! Category and region selection.
//!
//! [`FilterState`] is the current selection; [`Navigation`] owns the category
//! list and region table the selection refers to. Neither does any fetching:
//! a changed selection is reported back to the session, which restarts the
//! feed at page 1.

use crate::types::{Category, Region, RegionLookup};

/// Selected category and region. `None` means "no filter".
///
/// Id `0` is never a valid selection and is stored as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: Option<u64>,
    pub region: Option<u64>,
}

impl FilterState {
    pub fn new(category: Option<u64>, region: Option<u64>) -> Self {
        Self {
            category: selection(category),
            region: selection(region),
        }
    }

    /// Returns whether the selection changed.
    pub fn set_category(&mut self, category: Option<u64>) -> bool {
        let category = selection(category);
        let changed = self.category != category;
        self.category = category;
        changed
    }

    /// Returns whether the selection changed.
    pub fn set_region(&mut self, region: Option<u64>) -> bool {
        let region = selection(region);
        let changed = self.region != region;
        self.region = region;
        changed
    }

    /// Drop both filters. Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let changed = !self.is_unfiltered();
        *self = Self::default();
        changed
    }

    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && self.region.is_none()
    }
}

fn selection(id: Option<u64>) -> Option<u64> {
    id.filter(|id| *id != 0)
}

/// Categories and regions available for filtering.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    pub categories: Vec<Category>,
    pub regions: RegionLookup,
}

impl Navigation {
    pub fn new(categories: Vec<Category>, regions: Vec<Region>) -> Self {
        Self {
            categories,
            regions: RegionLookup::new(regions),
        }
    }

    pub fn category(&self, id: u64) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Dropdown label for the selected region, or `all_label` when unfiltered.
    ///
    /// A selected id that is not in the table renders as an empty label.
    pub fn region_label<'a>(&'a self, selected: Option<u64>, all_label: &'a str) -> &'a str {
        match selected {
            None => all_label,
            Some(id) => self.regions.name(id).unwrap_or(""),
        }
    }

    /// Display name of the selected category, or `all_label` when unfiltered.
    pub fn category_label<'a>(&'a self, selected: Option<u64>, all_label: &'a str) -> &'a str {
        match selected {
            None => all_label,
            Some(id) => self.category(id).map(|c| c.name.as_str()).unwrap_or(""),
        }
    }
}
