//! Class groups and row selection
//!
//! Drivers are grouped by car class. Within a group the board always shows
//! the top N, and when the selected driver is further down it adds a window
//! of rows around them.

use crate::core::views::StandingsDriver;

/// Drivers of one car class, sorted by class position
#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup {
    pub class_id: i64,
    pub drivers: Vec<StandingsDriver>,
}

impl ClassGroup {
    /// Short class name as published by the first driver of the group
    pub fn name(&self) -> &str {
        self.drivers
            .first()
            .and_then(|d| d.car_class_short_name.as_deref())
            .unwrap_or("")
    }

    /// Best lap of the group, if anyone set one
    pub fn fastest_lap(&self) -> Option<f64> {
        self.drivers
            .iter()
            .filter_map(|d| d.fastest_lap)
            .fold(None, |best, lap| match best {
                Some(b) if b <= lap => Some(b),
                _ => Some(lap),
            })
    }

    pub fn index_of(&self, car_idx: i64) -> Option<usize> {
        self.drivers.iter().position(|d| d.car_idx == car_idx)
    }

    pub fn is_fastest(&self, driver: &StandingsDriver) -> bool {
        match (driver.fastest_lap, self.fastest_lap()) {
            (Some(lap), Some(best)) => lap == best,
            _ => false,
        }
    }
}

/// Group drivers by class, ordered by each class's fastest lap
///
/// Drivers without a class are left out. Classes without any lap come last,
/// keeping their first-appearance order.
pub fn group_by_class(drivers: &[StandingsDriver]) -> Vec<ClassGroup> {
    let mut groups: Vec<ClassGroup> = Vec::new();
    for driver in drivers {
        let Some(class_id) = driver.car_class_id else {
            continue;
        };
        match groups.iter_mut().find(|g| g.class_id == class_id) {
            Some(group) => group.drivers.push(driver.clone()),
            None => groups.push(ClassGroup {
                class_id,
                drivers: vec![driver.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.drivers.sort_by_key(|d| d.class_position);
    }
    groups.sort_by(|a, b| {
        let lap_a = a.fastest_lap().unwrap_or(f64::INFINITY);
        let lap_b = b.fastest_lap().unwrap_or(f64::INFINITY);
        lap_a.total_cmp(&lap_b)
    });
    groups
}

/// Rows the group asks for before fitting
///
/// Top N, extended so the selected driver is visible with one row above and
/// one below when they sit outside the top N.
pub fn initial_rows(group: &ClassGroup, selected_car: Option<i64>, top_n: usize) -> usize {
    let len = group.drivers.len();
    let mut rows = len.min(top_n);
    if let Some(idx) = selected_car.and_then(|car| group.index_of(car)) {
        rows = rows.max(idx + 1);
        if idx >= top_n {
            rows = len.min(rows + 2);
        }
    }
    rows
}

/// Rows picked for display
#[derive(Debug, Clone, PartialEq)]
pub struct RowSelection {
    pub rows: Vec<StandingsDriver>,
    /// Draw a gap after this row (positions jump between top N and window)
    pub separator_after: Option<usize>,
}

/// Pick `max_rows` rows of a group
pub fn select_rows(
    group: &ClassGroup,
    selected_car: Option<i64>,
    max_rows: usize,
    top_n: usize,
) -> RowSelection {
    let sorted = &group.drivers;
    if max_rows == 0 {
        return RowSelection {
            rows: Vec::new(),
            separator_after: None,
        };
    }

    let selected_idx = selected_car.and_then(|car| group.index_of(car));
    let windowed = selected_idx.filter(|&idx| idx >= top_n && max_rows > top_n);

    let Some(selected_idx) = windowed else {
        let mut rows: Vec<StandingsDriver> = sorted.iter().take(max_rows).cloned().collect();
        // No room for a window: the selected driver takes the last slot
        if let Some(idx) = selected_idx {
            if max_rows == top_n && idx >= top_n {
                if let Some(last) = rows.last_mut() {
                    *last = sorted[idx].clone();
                }
                rows.sort_by_key(|d| d.class_position);
            }
        }
        return RowSelection {
            rows,
            separator_after: None,
        };
    };

    let top: Vec<usize> = (0..top_n.min(sorted.len())).collect();
    let window = window_around(selected_idx, sorted.len(), top_n, max_rows - top.len());

    let mut picked: Vec<usize> = top.iter().chain(window.iter()).copied().collect();
    picked.sort_by_key(|&i| sorted[i].class_position);
    picked.truncate(max_rows);

    let separator_after = match (top.last(), window.first()) {
        (Some(&last_top), Some(&first_window))
            if sorted[first_window].class_position != sorted[last_top].class_position + 1 =>
        {
            Some(top_n - 1)
        }
        _ => None,
    };

    RowSelection {
        rows: picked.into_iter().map(|i| sorted[i].clone()).collect(),
        separator_after,
    }
}

/// Indices of a window of `slots` rows around `selected`, never reaching
/// into the top N
///
/// Half of the extra rows (rounded up) go ahead of the selected driver, the
/// rest behind; whatever one side cannot use goes to the other.
fn window_around(selected: usize, len: usize, top_n: usize, slots: usize) -> Vec<usize> {
    let mut window = std::collections::VecDeque::from([selected]);
    let extra = slots.saturating_sub(1);
    let mut ahead = (extra + 1) / 2;
    let mut behind = extra - ahead;
    let mut left = selected as i64 - 1;
    let mut right = selected + 1;

    while ahead > 0 && left >= top_n as i64 {
        window.push_front(left as usize);
        left -= 1;
        ahead -= 1;
    }
    while behind > 0 && right < len {
        window.push_back(right);
        right += 1;
        behind -= 1;
    }
    while window.len() < slots {
        if left >= top_n as i64 {
            window.push_front(left as usize);
            left -= 1;
        } else if right < len {
            window.push_back(right);
            right += 1;
        } else {
            break;
        }
    }
    window.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(car_idx: i64, class_id: Option<i64>, class_position: i64) -> StandingsDriver {
        StandingsDriver {
            car_idx,
            car_number: car_idx + 1,
            first_name: format!("F{}", car_idx),
            last_name: format!("L{}", car_idx),
            position: class_position,
            class_position,
            middle_name: None,
            i_rating: None,
            car_class_id: class_id,
            car_class_short_name: class_id.map(|c| format!("C{}", c)),
            is_selected: None,
            fastest_lap: None,
        }
    }

    fn class_of(size: i64) -> ClassGroup {
        ClassGroup {
            class_id: 1,
            drivers: (0..size).map(|i| driver(i, Some(1), i + 1)).collect(),
        }
    }

    fn positions(selection: &RowSelection) -> Vec<i64> {
        selection.rows.iter().map(|d| d.class_position).collect()
    }

    // -------------------------------------------------------------------------
    // Grouping
    // -------------------------------------------------------------------------

    #[test]
    fn test_group_by_class_orders_by_fastest_lap() {
        let mut drivers = vec![
            driver(0, Some(10), 2),
            driver(1, Some(20), 1),
            driver(2, Some(10), 1),
            driver(3, None, 1),
            driver(4, Some(30), 1),
        ];
        drivers[0].fastest_lap = Some(95.0);
        drivers[1].fastest_lap = Some(90.0);

        let groups = group_by_class(&drivers);
        let ids: Vec<i64> = groups.iter().map(|g| g.class_id).collect();
        assert_eq!(ids, vec![20, 10, 30]);

        // Sorted by class position within the group
        let cars: Vec<i64> = groups[1].drivers.iter().map(|d| d.car_idx).collect();
        assert_eq!(cars, vec![2, 0]);
        assert_eq!(groups[1].name(), "C10");
    }

    #[test]
    fn test_fastest_in_group() {
        let mut group = class_of(3);
        group.drivers[1].fastest_lap = Some(88.2);
        group.drivers[2].fastest_lap = Some(89.0);
        assert_eq!(group.fastest_lap(), Some(88.2));
        assert!(group.is_fastest(&group.drivers[1].clone()));
        assert!(!group.is_fastest(&group.drivers[2].clone()));
        assert!(!group.is_fastest(&group.drivers[0].clone()));
    }

    // -------------------------------------------------------------------------
    // Initial rows
    // -------------------------------------------------------------------------

    #[test]
    fn test_initial_rows() {
        let group = class_of(10);
        assert_eq!(initial_rows(&group, None, 3), 3);
        assert_eq!(initial_rows(&group, Some(1), 3), 3);
        // Selected at index 6: rows up to it, plus one above and below
        assert_eq!(initial_rows(&group, Some(6), 3), 9);
        assert_eq!(initial_rows(&group, Some(9), 3), 10);
        assert_eq!(initial_rows(&class_of(2), None, 3), 2);
    }

    // -------------------------------------------------------------------------
    // Row selection
    // -------------------------------------------------------------------------

    #[test]
    fn test_select_top_rows_without_selection() {
        let group = class_of(10);
        let selection = select_rows(&group, None, 4, 3);
        assert_eq!(positions(&selection), vec![1, 2, 3, 4]);
        assert_eq!(selection.separator_after, None);
    }

    #[test]
    fn test_select_window_around_selected_driver() {
        let group = class_of(12);
        // Selected P8 (index 7), 3 window slots: one ahead, one behind
        let selection = select_rows(&group, Some(7), 6, 3);
        assert_eq!(positions(&selection), vec![1, 2, 3, 7, 8, 9]);
        assert_eq!(selection.separator_after, Some(2));
    }

    #[test]
    fn test_select_window_prefers_rows_ahead() {
        let group = class_of(12);
        // 2 window slots: the extra one goes ahead
        let selection = select_rows(&group, Some(7), 5, 3);
        assert_eq!(positions(&selection), vec![1, 2, 3, 7, 8]);
    }

    #[test]
    fn test_select_window_fills_from_other_side_at_the_end() {
        let group = class_of(8);
        // Selected is last: everything goes ahead
        let selection = select_rows(&group, Some(7), 7, 3);
        assert_eq!(positions(&selection), vec![1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(selection.separator_after, Some(2));
    }

    #[test]
    fn test_select_window_contiguous_has_no_separator() {
        let group = class_of(6);
        let selection = select_rows(&group, Some(4), 6, 3);
        assert_eq!(positions(&selection), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(selection.separator_after, None);
    }

    #[test]
    fn test_selected_replaces_last_top_row_without_room() {
        let group = class_of(10);
        let selection = select_rows(&group, Some(7), 3, 3);
        assert_eq!(positions(&selection), vec![1, 2, 8]);
        assert_eq!(selection.separator_after, None);
    }

    #[test]
    fn test_select_zero_rows() {
        let group = class_of(4);
        assert!(select_rows(&group, Some(1), 0, 3).rows.is_empty());
    }
}
