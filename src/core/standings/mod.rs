//! Standings board - class groups fitted into the available height

pub mod group;
pub mod layout;

pub use group::{group_by_class, initial_rows, select_rows, ClassGroup, RowSelection};
pub use layout::{fit_groups, layout_section, GroupDemand, LayoutMetrics, LayoutOutcome};

use super::color::class_color;
use super::format::{format_fastest_lap, format_irating, full_name};
use super::views::{StandingsDriver, StandingsFeed};

/// One displayed driver row
#[derive(Debug, Clone, PartialEq)]
pub struct StandingsRow {
    pub class_position: i64,
    pub car_number: i64,
    pub name: String,
    pub irating: Option<String>,
    pub fastest_lap: Option<String>,
    pub is_fastest: bool,
    pub is_selected: bool,
}

/// A class group as it will be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleGroup {
    pub class_id: i64,
    pub name: String,
    pub color: String,
    pub driver_count: usize,
    pub rows: Vec<StandingsRow>,
    pub separator_after: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardLayout {
    Unmeasured,
    NotEnoughSpace,
    Groups(Vec<VisibleGroup>),
}

pub struct StandingsBoard {
    groups: Vec<ClassGroup>,
    selected_car: Option<i64>,
    show_top_n: usize,
    metrics: LayoutMetrics,
}

impl StandingsBoard {
    pub fn new(feed: &StandingsFeed, show_top_n: usize, metrics: LayoutMetrics) -> Self {
        Self {
            groups: group_by_class(&feed.drivers),
            selected_car: feed
                .drivers
                .iter()
                .find(|d| d.selected())
                .map(|d| d.car_idx),
            show_top_n,
            metrics,
        }
    }

    pub fn groups(&self) -> &[ClassGroup] {
        &self.groups
    }

    pub fn selected_car(&self) -> Option<i64> {
        self.selected_car
    }

    /// Rows each group would like, in group order
    pub fn demands(&self) -> Vec<GroupDemand> {
        self.groups
            .iter()
            .map(|group| GroupDemand {
                rows: initial_rows(group, self.selected_car, self.show_top_n),
                selected: self.is_selected_group(group),
            })
            .collect()
    }

    /// Fit the board into the measured drivers section
    pub fn layout(&self, section_height: u32) -> BoardLayout {
        match layout_section(section_height, &self.demands(), &self.metrics) {
            LayoutOutcome::Unmeasured => BoardLayout::Unmeasured,
            LayoutOutcome::NotEnoughSpace => BoardLayout::NotEnoughSpace,
            LayoutOutcome::Fits(rows) => BoardLayout::Groups(
                self.groups
                    .iter()
                    .zip(rows)
                    .filter(|(_, n)| *n > 0)
                    .map(|(group, n)| self.visible_group(group, n))
                    .collect(),
            ),
        }
    }

    fn is_selected_group(&self, group: &ClassGroup) -> bool {
        self.selected_car
            .map(|car| group.index_of(car).is_some())
            .unwrap_or(false)
    }

    fn visible_group(&self, group: &ClassGroup, max_rows: usize) -> VisibleGroup {
        let selection = select_rows(group, self.selected_car, max_rows, self.show_top_n);
        VisibleGroup {
            class_id: group.class_id,
            name: group.name().to_string(),
            color: class_color(group.class_id),
            driver_count: group.drivers.len(),
            rows: selection
                .rows
                .iter()
                .map(|driver| self.row(group, driver))
                .collect(),
            separator_after: selection.separator_after,
        }
    }

    fn row(&self, group: &ClassGroup, driver: &StandingsDriver) -> StandingsRow {
        StandingsRow {
            class_position: driver.class_position,
            car_number: driver.car_number,
            name: full_name(
                &driver.first_name,
                driver.middle_name.as_deref(),
                &driver.last_name,
            ),
            irating: driver.i_rating.map(format_irating),
            fastest_lap: driver.fastest_lap.map(format_fastest_lap),
            is_fastest: group.is_fastest(driver),
            is_selected: self.selected_car == Some(driver.car_idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::views::StandingsSession;

    fn driver(car_idx: i64, class_id: i64, class_position: i64) -> StandingsDriver {
        StandingsDriver {
            car_idx,
            car_number: 10 + car_idx,
            first_name: "Max".to_string(),
            last_name: format!("Driver{}", car_idx),
            position: car_idx + 1,
            class_position,
            middle_name: None,
            i_rating: Some(1850),
            car_class_id: Some(class_id),
            car_class_short_name: Some(format!("GT{}", class_id)),
            is_selected: None,
            fastest_lap: None,
        }
    }

    fn feed(drivers: Vec<StandingsDriver>) -> StandingsFeed {
        StandingsFeed {
            drivers,
            session: StandingsSession::default(),
        }
    }

    /// Three classes of one driver each, the last one holding the selected car
    fn three_classes() -> StandingsFeed {
        let mut drivers = vec![driver(0, 1, 1), driver(1, 2, 1), driver(2, 3, 1)];
        drivers[2].is_selected = Some(true);
        drivers[0].fastest_lap = Some(90.0);
        drivers[1].fastest_lap = Some(91.0);
        drivers[2].fastest_lap = Some(92.0);
        feed(drivers)
    }

    #[test]
    fn test_demands_flag_selected_group() {
        let board = StandingsBoard::new(&three_classes(), 3, LayoutMetrics::default());
        let demands = board.demands();
        assert_eq!(demands.len(), 3);
        assert_eq!(demands.iter().filter(|d| d.selected).count(), 1);
        assert!(demands[2].selected);
        assert_eq!(board.selected_car(), Some(2));
    }

    #[test]
    fn test_layout_exact_fit_shows_every_group() {
        let board = StandingsBoard::new(&three_classes(), 3, LayoutMetrics::default());
        // 356 for the groups plus 20 of section padding
        match board.layout(376) {
            BoardLayout::Groups(groups) => {
                let ids: Vec<i64> = groups.iter().map(|g| g.class_id).collect();
                assert_eq!(ids, vec![1, 2, 3]);
                assert!(groups[2].rows[0].is_selected);
                assert!(groups[0].rows[0].is_fastest);
                assert_eq!(groups[0].rows[0].fastest_lap.as_deref(), Some("01:30.000"));
                assert_eq!(groups[0].rows[0].irating.as_deref(), Some("1.9k"));
                assert_eq!(groups[0].name, "GT1");
            }
            other => panic!("expected groups, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_hides_non_selected_first() {
        let board = StandingsBoard::new(&three_classes(), 3, LayoutMetrics::default());
        match board.layout(375) {
            BoardLayout::Groups(groups) => {
                let ids: Vec<i64> = groups.iter().map(|g| g.class_id).collect();
                assert_eq!(ids, vec![2, 3]);
            }
            other => panic!("expected groups, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_placeholder_and_unmeasured() {
        let board = StandingsBoard::new(&three_classes(), 3, LayoutMetrics::default());
        assert_eq!(board.layout(100), BoardLayout::NotEnoughSpace);
        assert_eq!(board.layout(0), BoardLayout::Unmeasured);
    }

    #[test]
    fn test_layout_window_for_selected_driver() {
        let mut drivers: Vec<StandingsDriver> = (0..10).map(|i| driver(i, 1, i + 1)).collect();
        drivers[7].is_selected = Some(true);
        let board = StandingsBoard::new(&feed(drivers), 3, LayoutMetrics::default());

        assert_eq!(board.demands()[0].rows, 10);
        match board.layout(2000) {
            BoardLayout::Groups(groups) => {
                assert_eq!(groups[0].rows.len(), 10);
                assert_eq!(groups[0].separator_after, None);
                assert_eq!(groups[0].driver_count, 10);
            }
            other => panic!("expected groups, got {:?}", other),
        }

        // Room for 6 rows: top 3 and a window around P8
        let height = LayoutMetrics::default().group_height(6) as u32 + 20;
        match board.layout(height) {
            BoardLayout::Groups(groups) => {
                let positions: Vec<i64> =
                    groups[0].rows.iter().map(|r| r.class_position).collect();
                assert_eq!(positions, vec![1, 2, 3, 7, 8, 9]);
                assert_eq!(groups[0].separator_after, Some(2));
            }
            other => panic!("expected groups, got {:?}", other),
        }
    }
}
