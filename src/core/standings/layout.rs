//! Standings layout fitting
//!
//! Decides how many rows each class group gets so the whole board fits the
//! measured section height. Groups are shrunk one row at a time, non-selected
//! groups first, and hidden only once every group is down to a single row.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pixel metrics of the standings board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    #[serde(default = "default_header")]
    pub header: u32,
    #[serde(default = "default_group_header")]
    pub group_header: u32,
    #[serde(default = "default_group_separator")]
    pub group_separator: u32,
    #[serde(default = "default_row")]
    pub row: u32,
    /// Top + bottom padding of one group
    #[serde(default = "default_group_padding")]
    pub group_padding: u32,
    /// Top + bottom padding of the drivers section
    #[serde(default = "default_section_padding")]
    pub section_padding: u32,
    #[serde(default = "default_group_gap")]
    pub group_gap: u32,
}

fn default_header() -> u32 {
    40
}
fn default_group_header() -> u32 {
    28
}
fn default_group_separator() -> u32 {
    17
}
fn default_row() -> u32 {
    47
}
fn default_group_padding() -> u32 {
    20
}
fn default_section_padding() -> u32 {
    20
}
fn default_group_gap() -> u32 {
    10
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            header: default_header(),
            group_header: default_group_header(),
            group_separator: default_group_separator(),
            row: default_row(),
            group_padding: default_group_padding(),
            section_padding: default_section_padding(),
            group_gap: default_group_gap(),
        }
    }
}

impl LayoutMetrics {
    /// Height of one group showing `rows` rows; a hidden group takes no space
    pub fn group_height(&self, rows: usize) -> u64 {
        if rows == 0 {
            return 0;
        }
        (self.group_header + self.group_separator + self.group_padding) as u64
            + rows as u64 * self.row as u64
    }

    /// Height of all shown groups plus the gaps between them
    pub fn total_height(&self, rows: &[usize]) -> u64 {
        let shown = rows.iter().filter(|&&n| n > 0).count() as u64;
        let groups: u64 = rows.iter().map(|&n| self.group_height(n)).sum();
        groups + shown.saturating_sub(1) * self.group_gap as u64
    }
}

/// What one group would like to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDemand {
    pub rows: usize,
    /// Group of the selected driver; shrunk and hidden last
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Section has no height yet; render nothing
    Unmeasured,
    /// Not even one row fits; render the placeholder
    NotEnoughSpace,
    /// Rows per group, in group order; 0 means hidden
    Fits(Vec<usize>),
}

/// Fit the groups into `available` pixels
///
/// Returns the rows per group, or `None` when nothing can be made to fit.
pub fn fit_groups(
    available: i64,
    demands: &[GroupDemand],
    metrics: &LayoutMetrics,
) -> Option<Vec<usize>> {
    let mut rows: Vec<usize> = demands.iter().map(|d| d.rows).collect();
    let too_tall = |rows: &[usize]| metrics.total_height(rows) as i64 > available;

    while too_tall(&rows) {
        let changed = shrink_one(&mut rows, demands, 3)
            || shrink_one(&mut rows, demands, 1)
            || hide_one(&mut rows, demands);
        if !changed {
            break;
        }
    }

    if too_tall(&rows) {
        debug!(available, ?rows, "[LAYOUT] Standings do not fit");
        return None;
    }
    Some(rows)
}

/// Remove a row from the best group above `floor` rows
///
/// Non-selected before selected, then most rows, then earliest group.
fn shrink_one(rows: &mut [usize], demands: &[GroupDemand], floor: usize) -> bool {
    let candidate = rows
        .iter()
        .enumerate()
        .filter(|&(_, &n)| n > floor)
        .min_by_key(|&(idx, &n)| (demands[idx].selected, Reverse(n), idx))
        .map(|(idx, _)| idx);
    match candidate {
        Some(idx) => {
            rows[idx] -= 1;
            true
        }
        None => false,
    }
}

/// Hide the first visible non-selected group, then the selected one
fn hide_one(rows: &mut [usize], demands: &[GroupDemand]) -> bool {
    let visible = |idx: &usize| rows[*idx] > 0;
    let target = (0..rows.len())
        .filter(visible)
        .find(|&idx| !demands[idx].selected)
        .or_else(|| (0..rows.len()).filter(visible).find(|&idx| demands[idx].selected));
    match target {
        Some(idx) => {
            rows[idx] = 0;
            true
        }
        None => false,
    }
}

/// Lay out the drivers section given its measured height
pub fn layout_section(
    section_height: u32,
    demands: &[GroupDemand],
    metrics: &LayoutMetrics,
) -> LayoutOutcome {
    if section_height == 0 {
        return LayoutOutcome::Unmeasured;
    }
    let available = section_height as i64 - metrics.section_padding as i64;
    match fit_groups(available, demands, metrics) {
        Some(rows) if rows.iter().any(|&n| n > 0) => LayoutOutcome::Fits(rows),
        _ => LayoutOutcome::NotEnoughSpace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(rows: usize, selected: bool) -> GroupDemand {
        GroupDemand { rows, selected }
    }

    // -------------------------------------------------------------------------
    // Heights
    // -------------------------------------------------------------------------

    #[test]
    fn test_group_height() {
        let m = LayoutMetrics::default();
        assert_eq!(m.group_height(0), 0);
        assert_eq!(m.group_height(1), 112);
        assert_eq!(m.group_height(3), 206);
    }

    #[test]
    fn test_total_height_counts_gaps_between_shown_groups() {
        let m = LayoutMetrics::default();
        assert_eq!(m.total_height(&[]), 0);
        assert_eq!(m.total_height(&[1]), 112);
        assert_eq!(m.total_height(&[1, 0, 1]), 234);
        assert_eq!(m.total_height(&[0, 0]), 0);
    }

    // -------------------------------------------------------------------------
    // Fitting
    // -------------------------------------------------------------------------

    #[test]
    fn test_everything_fits_untouched() {
        let m = LayoutMetrics::default();
        let demands = [demand(3, false), demand(2, true)];
        assert_eq!(fit_groups(10_000, &demands, &m), Some(vec![3, 2]));
    }

    #[test]
    fn test_exact_fit_of_single_rows_hides_nothing() {
        let m = LayoutMetrics::default();
        let demands = [demand(1, false), demand(1, false), demand(1, true)];
        let exact = m.total_height(&[1, 1, 1]) as i64;
        assert_eq!(exact, 356);
        assert_eq!(fit_groups(exact, &demands, &m), Some(vec![1, 1, 1]));
        assert_eq!(fit_groups(exact - 1, &demands, &m), Some(vec![0, 1, 1]));
    }

    #[test]
    fn test_below_smallest_group_does_not_fit() {
        let m = LayoutMetrics::default();
        let demands = [demand(3, false)];
        assert_eq!(fit_groups(111, &demands, &m), Some(vec![0]));
        assert_eq!(layout_section(111 + 20, &demands, &m), LayoutOutcome::NotEnoughSpace);
        assert_eq!(
            layout_section(112 + 20, &demands, &m),
            LayoutOutcome::Fits(vec![1])
        );
    }

    #[test]
    fn test_shrink_order() {
        let m = LayoutMetrics::default();
        let demands = [demand(5, false), demand(5, true)];
        let fits = |rows: &[usize]| m.total_height(rows) as i64;

        // Non-selected group loses rows first down to 3
        assert_eq!(fit_groups(fits(&[4, 5]), &demands, &m), Some(vec![4, 5]));
        assert_eq!(fit_groups(fits(&[3, 5]), &demands, &m), Some(vec![3, 5]));
        // Then the selected one down to 3
        assert_eq!(fit_groups(fits(&[3, 4]), &demands, &m), Some(vec![3, 4]));
        // Then the non-selected one down to 1
        assert_eq!(fit_groups(fits(&[2, 3]), &demands, &m), Some(vec![2, 3]));
        assert_eq!(fit_groups(fits(&[1, 3]), &demands, &m), Some(vec![1, 3]));
        // Then the selected one down to 1
        assert_eq!(fit_groups(fits(&[1, 1]), &demands, &m), Some(vec![1, 1]));
        // Then the non-selected group is hidden
        assert_eq!(fit_groups(fits(&[0, 1]), &demands, &m), Some(vec![0, 1]));
    }

    #[test]
    fn test_larger_group_shrinks_first_among_equals() {
        let m = LayoutMetrics::default();
        let demands = [demand(4, false), demand(6, false)];
        let target = m.total_height(&[4, 5]) as i64;
        assert_eq!(fit_groups(target, &demands, &m), Some(vec![4, 5]));

        // Ties go to the earlier group
        let demands = [demand(5, false), demand(5, false)];
        let target = m.total_height(&[4, 5]) as i64;
        assert_eq!(fit_groups(target, &demands, &m), Some(vec![4, 5]));
    }

    #[test]
    fn test_selected_group_hidden_last() {
        let m = LayoutMetrics::default();
        let demands = [demand(1, true), demand(1, false), demand(1, false)];
        let target = m.total_height(&[1]) as i64;
        assert_eq!(fit_groups(target, &demands, &m), Some(vec![1, 0, 0]));
    }

    #[test]
    fn test_negative_space_does_not_fit() {
        let m = LayoutMetrics::default();
        assert_eq!(fit_groups(-5, &[demand(2, false)], &m), None);
        assert_eq!(
            layout_section(10, &[demand(2, false)], &m),
            LayoutOutcome::NotEnoughSpace
        );
    }

    #[test]
    fn test_zero_height_is_unmeasured() {
        let m = LayoutMetrics::default();
        assert_eq!(
            layout_section(0, &[demand(2, false)], &m),
            LayoutOutcome::Unmeasured
        );
    }

    #[test]
    fn test_no_groups_shows_placeholder() {
        let m = LayoutMetrics::default();
        assert_eq!(layout_section(500, &[], &m), LayoutOutcome::NotEnoughSpace);
    }
}
