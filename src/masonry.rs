//! Masonry column assignment.
//!
//! Items are placed Pinterest-style: each one goes to the column whose running
//! height is currently smallest, lowest index first on ties. Real rendered
//! heights are not known when the assignment is made, so every item counts as
//! [`LayoutConfig::estimated_item_height`] plus [`LayoutConfig::gap`]. With
//! uniform heights the result is plain round-robin.
//!
//! This is a greedy online heuristic, not optimal packing. It runs in
//! O(n · columns) and is deterministic, so recomputing on every resize or page
//! append is cheap and idempotent.

use crate::config::LayoutConfig;
use crate::types::GalleryItem;

/// An item placed in a column, with its position in the source sequence.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub item: &'a GalleryItem,
    pub index: usize,
}

/// Result of [`assign`]: per-column item lists plus final column heights.
#[derive(Debug, Clone)]
pub struct ColumnAssignment<'a> {
    pub columns: Vec<Vec<Placement<'a>>>,
    /// Running height accumulator of each column after the last placement.
    pub heights: Vec<u32>,
}

impl ColumnAssignment<'_> {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of items in each column.
    pub fn column_sizes(&self) -> Vec<usize> {
        self.columns.iter().map(Vec::len).collect()
    }

    pub fn item_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Column holding the item at `index` in the source sequence.
    pub fn column_of(&self, index: usize) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.iter().any(|p| p.index == index))
    }
}

/// Column placement as source indices plus running heights.
#[derive(Debug, Clone)]
struct Columns {
    indices: Vec<Vec<usize>>,
    heights: Vec<u32>,
    placed: usize,
}

impl Columns {
    fn new(column_count: usize) -> Self {
        let column_count = column_count.max(1);
        Self {
            indices: vec![Vec::new(); column_count],
            heights: vec![0; column_count],
            placed: 0,
        }
    }

    fn len(&self) -> usize {
        self.indices.len()
    }

    /// Place source items `placed..len` greedily. Returns how many were placed.
    fn extend(&mut self, len: usize, config: &LayoutConfig) -> usize {
        let step = config.estimated_item_height.saturating_add(config.gap);
        let start = self.placed;
        for index in start..len {
            // min_by_key returns the first minimum, so ties go to the lowest index.
            let shortest = self
                .heights
                .iter()
                .enumerate()
                .min_by_key(|(_, h)| **h)
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.indices[shortest].push(index);
            self.heights[shortest] = self.heights[shortest].saturating_add(step);
        }
        self.placed = len.max(start);
        self.placed - start
    }

    fn resolve<'a>(&self, items: &'a [GalleryItem]) -> ColumnAssignment<'a> {
        let columns = self
            .indices
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|&index| Placement {
                        item: &items[index],
                        index,
                    })
                    .collect()
            })
            .collect();
        ColumnAssignment {
            columns,
            heights: self.heights.clone(),
        }
    }
}

/// Assign `items` to `column_count` columns by shortest running height.
///
/// A `column_count` of zero is treated as one.
pub fn assign<'a>(
    items: &'a [GalleryItem],
    column_count: usize,
    config: &LayoutConfig,
) -> ColumnAssignment<'a> {
    let mut columns = Columns::new(column_count);
    columns.extend(items.len(), config);
    columns.resolve(items)
}

/// Column count for a container width, from the configured breakpoints.
pub fn columns_for_width(width: u32, config: &LayoutConfig) -> usize {
    config
        .breakpoints
        .iter()
        .find(|[min_width, _]| width >= *min_width)
        .map(|[_, columns]| *columns as usize)
        .unwrap_or(1)
        .max(1)
}

/// Every distinct column count the breakpoints can produce, widest first,
/// each paired with the minimum width that selects it. The single-column
/// fallback is always last with a minimum width of zero.
pub fn breakpoint_columns(config: &LayoutConfig) -> Vec<(u32, usize)> {
    let mut out: Vec<(u32, usize)> = Vec::new();
    for [min_width, columns] in &config.breakpoints {
        let columns = (*columns as usize).max(1);
        if !out.iter().any(|(_, c)| *c == columns) {
            out.push((*min_width, columns));
        }
    }
    if !out.iter().any(|(_, c)| *c == 1) {
        out.push((0, 1));
    }
    out
}

/// Cached column assignment for one feed.
///
/// Within a feed generation the item list only grows, so the placement of
/// the first `n` items never changes. Appending a page places only the new
/// items; a new generation, a shorter list or a different column count
/// starts over.
#[derive(Debug, Clone)]
pub struct MasonryLayout {
    config: LayoutConfig,
    width: u32,
    cached: Option<(u64, Columns)>,
    placements: usize,
}

impl MasonryLayout {
    pub fn new(config: LayoutConfig, width: u32) -> Self {
        Self {
            config,
            width,
            cached: None,
            placements: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn column_count(&self) -> usize {
        columns_for_width(self.width, &self.config)
    }

    /// Record a viewport resize. Returns whether the column count changed.
    pub fn resize(&mut self, width: u32) -> bool {
        let before = self.column_count();
        self.width = width;
        before != self.column_count()
    }

    /// Assignment for `items` of feed `generation` at the current width.
    pub fn compute<'a>(
        &mut self,
        items: &'a [GalleryItem],
        generation: u64,
    ) -> ColumnAssignment<'a> {
        let column_count = self.column_count();
        let reusable = matches!(
            &self.cached,
            Some((g, columns))
                if *g == generation && columns.len() == column_count && columns.placed <= items.len()
        );
        if !reusable {
            self.cached = Some((generation, Columns::new(column_count)));
        }
        match &mut self.cached {
            Some((_, columns)) => {
                self.placements += columns.extend(items.len(), &self.config);
                columns.resolve(items)
            }
            None => assign(items, column_count, &self.config),
        }
    }

    /// Items placed by the greedy pass since creation. Unchanged inputs add nothing.
    pub fn placements(&self) -> usize {
        self.placements
    }
}
