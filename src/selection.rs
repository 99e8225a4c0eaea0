use crate::calendar::{CalendarDay, CalendarMonth};

/// Insertion-ordered set of selected days.
///
/// Cardinality stays small (a handful up to a few hundred days), so
/// membership is a linear scan over a `Vec`.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    days: Vec<CalendarDay>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Removes `day` if it is selected, adds it otherwise.
    pub fn toggle(&mut self, day: CalendarDay) {
        if let Some(idx) = self.days.iter().position(|d| d == &day) {
            self.days.remove(idx);
            log::debug!("Deselected {}", day.date);
        } else {
            self.days.push(day);
            log::debug!("Selected {}", day.date);
        }
    }

    pub fn contains(&self, day: &CalendarDay) -> bool {
        self.days.contains(day)
    }

    /// Number of selected days anywhere in the rendered grid of `month`.
    pub fn count_in(&self, month: &CalendarMonth) -> usize {
        month.days().filter(|day| self.contains(day)).count()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }
}
