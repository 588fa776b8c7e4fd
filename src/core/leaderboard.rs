//! Leaderboard rows - overall positions fitted to a viewport
//!
//! The podium is always shown. When the selected car is further down, the
//! remaining rows form a window centered on it, and a separator marks the
//! jump in positions.

use super::format::{format_license, format_rating_change, short_name};
use super::views::{LeaderboardDriver, LeaderboardFeed};

/// Height of one row plus the gap below it, in pixels
pub const ROW_PITCH: u32 = 54;
/// Vertical padding of the board, top and bottom together
pub const BOARD_PADDING: u32 = 16;
/// Rows pinned at the top
pub const PODIUM_ROWS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardRow {
    pub position: i64,
    pub car_id: i64,
    pub name: String,
    pub license: Option<String>,
    pub irating: Option<i64>,
    pub irating_change: Option<String>,
    pub is_selected: bool,
}

impl LeaderboardRow {
    fn new(driver: &LeaderboardDriver, is_selected: bool) -> Self {
        Self {
            position: driver.position,
            car_id: driver.car_id,
            name: short_name(driver.first_name.as_deref(), driver.last_name.as_deref()),
            license: format_license(
                driver.i_racing_lic_string.as_deref(),
                driver.i_racing_lic_sub_level,
            ),
            irating: driver.i_rating,
            irating_change: driver.i_rating_change.map(format_rating_change),
            is_selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeaderboardRows {
    pub rows: Vec<LeaderboardRow>,
    /// Draw a gap after this row
    pub separator_after: Option<usize>,
}

/// Fully visible rows in a viewport, never fewer than the podium
pub fn max_visible_rows(viewport_height: u32) -> usize {
    let fit = viewport_height.saturating_sub(BOARD_PADDING) / ROW_PITCH;
    (fit as usize).max(PODIUM_ROWS)
}

/// Rows to draw; every classified driver when `viewport_height` is `None`
pub fn leaderboard_rows(feed: &LeaderboardFeed, viewport_height: Option<u32>) -> LeaderboardRows {
    let ranked = feed.ranked();
    // Only the first row of the selected car is highlighted
    let selected_at = feed
        .selected_car()
        .and_then(|car| ranked.iter().position(|d| d.car_id == car));

    let (picked, separator_after) = match viewport_height {
        Some(height) => {
            let selected_position = selected_at.map(|idx| ranked[idx].position);
            fit_positions(&ranked, selected_position, max_visible_rows(height))
        }
        None => ((0..ranked.len()).collect(), None),
    };

    let rows = picked
        .into_iter()
        .map(|idx| LeaderboardRow::new(ranked[idx], selected_at == Some(idx)))
        .collect();
    LeaderboardRows {
        rows,
        separator_after,
    }
}

/// Indices into `ranked` for at most `max_rows` rows
fn fit_positions(
    ranked: &[&LeaderboardDriver],
    selected_position: Option<i64>,
    max_rows: usize,
) -> (Vec<usize>, Option<usize>) {
    let head = |n: usize| (0..n.min(ranked.len())).collect::<Vec<_>>();

    let selected = selected_position.unwrap_or(1);
    if max_rows <= PODIUM_ROWS || selected <= PODIUM_ROWS as i64 {
        return (head(max_rows), None);
    }

    let remaining = (max_rows - PODIUM_ROWS) as i64;
    if remaining <= 1 {
        return (head(PODIUM_ROWS), None);
    }

    // Window of positions [start, end] centered on the selected car
    let first_free = PODIUM_ROWS as i64 + 1;
    let start = (selected - remaining / 2).max(first_free);
    let end = (ranked.len() as i64).min(start + remaining - 1);
    let start = (end - remaining + 1).max(first_free);

    let mut picked = head(PODIUM_ROWS);
    picked.extend(
        ranked
            .iter()
            .enumerate()
            .filter(|(_, d)| d.position >= start && d.position <= end)
            .map(|(idx, _)| idx),
    );
    let separator_after = (start > first_free && picked.len() > PODIUM_ROWS)
        .then_some(PODIUM_ROWS - 1);
    (picked, separator_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::views::Spectate;

    fn driver(car_id: i64, position: i64) -> LeaderboardDriver {
        LeaderboardDriver {
            car_id,
            position,
            first_name: Some("Test".to_string()),
            last_name: Some(format!("Driver{}", car_id)),
            i_rating: Some(1500),
            i_rating_change: None,
            i_racing_lic_string: None,
            i_racing_lic_sub_level: None,
            is_selected: None,
        }
    }

    fn grid(count: i64, spectate: Option<i64>) -> LeaderboardFeed {
        LeaderboardFeed {
            // Car ids 101.. finish in positions 1..
            drivers: (1..=count).map(|p| driver(100 + p, p)).collect(),
            realtime: Spectate {
                spectate_car_id: spectate,
            },
        }
    }

    fn positions(rows: &LeaderboardRows) -> Vec<i64> {
        rows.rows.iter().map(|r| r.position).collect()
    }

    /// Viewport that fits exactly `rows` rows
    fn viewport(rows: u32) -> u32 {
        BOARD_PADDING + rows * ROW_PITCH
    }

    // -------------------------------------------------------------------------
    // Viewport
    // -------------------------------------------------------------------------

    #[test]
    fn test_max_visible_rows() {
        assert_eq!(max_visible_rows(0), 3);
        assert_eq!(max_visible_rows(viewport(8)), 8);
        assert_eq!(max_visible_rows(viewport(8) - 1), 7);
    }

    // -------------------------------------------------------------------------
    // Row window
    // -------------------------------------------------------------------------

    #[test]
    fn test_unfitted_shows_every_classified_driver() {
        let mut feed = grid(5, None);
        feed.drivers.push(driver(0, 0));
        let rows = leaderboard_rows(&feed, None);
        assert_eq!(positions(&rows), vec![1, 2, 3, 4, 5]);
        assert!(rows.rows.iter().all(|r| !r.is_selected));
        assert_eq!(rows.separator_after, None);
    }

    #[test]
    fn test_selected_in_podium_shows_top_rows() {
        let rows = leaderboard_rows(&grid(20, Some(102)), Some(viewport(6)));
        assert_eq!(positions(&rows), vec![1, 2, 3, 4, 5, 6]);
        assert!(rows.rows[1].is_selected);
        assert_eq!(rows.separator_after, None);
    }

    #[test]
    fn test_window_centers_selected_car() {
        let rows = leaderboard_rows(&grid(20, Some(110)), Some(viewport(8)));
        // 5 free slots around P10: 8..=12
        assert_eq!(positions(&rows), vec![1, 2, 3, 8, 9, 10, 11, 12]);
        assert!(rows.rows[5].is_selected);
        assert_eq!(rows.separator_after, Some(2));
    }

    #[test]
    fn test_window_clamps_at_end_of_field() {
        let rows = leaderboard_rows(&grid(12, Some(112)), Some(viewport(8)));
        assert_eq!(positions(&rows), vec![1, 2, 3, 8, 9, 10, 11, 12]);
        assert!(rows.rows[7].is_selected);
    }

    #[test]
    fn test_window_adjacent_to_podium_has_no_separator() {
        let rows = leaderboard_rows(&grid(20, Some(105)), Some(viewport(8)));
        assert_eq!(positions(&rows), vec![1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rows.separator_after, None);
    }

    #[test]
    fn test_single_free_slot_shows_podium_only() {
        let rows = leaderboard_rows(&grid(20, Some(110)), Some(viewport(4)));
        assert_eq!(positions(&rows), vec![1, 2, 3]);
    }

    #[test]
    fn test_small_viewport_keeps_podium() {
        let rows = leaderboard_rows(&grid(20, Some(110)), Some(0));
        assert_eq!(positions(&rows), vec![1, 2, 3]);
        assert!(rows.rows.iter().all(|r| !r.is_selected));
    }

    #[test]
    fn test_row_columns() {
        let mut feed = grid(1, Some(101));
        feed.drivers[0].i_rating_change = Some(-7.6);
        feed.drivers[0].i_racing_lic_string = Some("B".to_string());
        feed.drivers[0].i_racing_lic_sub_level = Some(2.5);
        let rows = leaderboard_rows(&feed, None);
        let row = &rows.rows[0];
        assert_eq!(row.name, "T. Driver101");
        assert_eq!(row.license.as_deref(), Some("B 2.50"));
        assert_eq!(row.irating_change.as_deref(), Some("-8"));
        assert!(row.is_selected);
    }
}
