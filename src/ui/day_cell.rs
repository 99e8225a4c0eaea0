use unsegen::base::*;

use crate::calendar::{CalendarDay, DayPosition};

use super::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellBackground {
    Selection,
    Highlight,
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellText {
    OnSelection,
    Default,
    Dimmed,
}

/// Visual state of a single day, independent of any terminal styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAppearance {
    pub background: CellBackground,
    pub text: CellText,
    pub label: String,
    pub clickable: bool,
}

pub fn day_appearance(day: &CalendarDay, is_selected: bool, is_today: bool) -> DayAppearance {
    let in_month = day.position == DayPosition::MonthDate;

    let background = if is_selected {
        CellBackground::Selection
    } else if is_today && in_month {
        CellBackground::Highlight
    } else {
        CellBackground::Transparent
    };

    let text = match day.position {
        DayPosition::MonthDate if is_selected => CellText::OnSelection,
        DayPosition::MonthDate => CellText::Default,
        DayPosition::InDate | DayPosition::OutDate => CellText::Dimmed,
    };

    DayAppearance {
        background,
        text,
        label: chrono::Datelike::day(&day.date).to_string(),
        clickable: in_month,
    }
}

pub struct DayCell<'a> {
    appearance: DayAppearance,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> DayCell<'a> {
    pub fn new(day: &CalendarDay, is_selected: bool, is_today: bool, theme: &'a Theme) -> Self {
        DayCell {
            appearance: day_appearance(day, is_selected, is_today),
            focused: false,
            theme,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Paints the cell into the rectangle at `origin` of `size` columns and
    /// rows. Parts outside the window are clipped.
    pub fn draw_at(&self, window: &mut Window, origin: (i32, i32), size: (i32, i32)) {
        let (x, y) = origin;
        let (width, height) = size;
        if width <= 0 || height <= 0 {
            return;
        }

        let mut cursor = Cursor::new(window).style_modifier(match self.appearance.background {
            CellBackground::Selection => self.theme.selection_style,
            CellBackground::Highlight => self.theme.today_style,
            CellBackground::Transparent => self.theme.background_style,
        });
        cursor.apply_style_modifier(match self.appearance.text {
            CellText::OnSelection => self.theme.on_selection_text_style,
            CellText::Default => self.theme.day_text_style,
            CellText::Dimmed => self.theme.dimmed_text_style,
        });

        super::fill_rect(&mut cursor, origin, size);

        let label = if self.focused {
            cursor.apply_style_modifier(self.theme.focus_day_style);
            let (open, close) = self.theme.focus_day_marks.unwrap_or((' ', ' '));
            format!("{}{}{}", open, self.appearance.label, close)
        } else {
            self.appearance.label.clone()
        };

        let label_x = x + (width - label.chars().count() as i32).max(0) / 2;
        let label_y = y + (height - 1) / 2;

        cursor.move_to(ColIndex::new(label_x), RowIndex::new(label_y));
        cursor.write(&label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, position: DayPosition) -> CalendarDay {
        CalendarDay::new(NaiveDate::from_ymd_opt(2024, 3, d).unwrap(), position)
    }

    #[test]
    fn selected_month_date() {
        let a = day_appearance(&day(10, DayPosition::MonthDate), true, false);
        assert_eq!(a.background, CellBackground::Selection);
        assert_eq!(a.text, CellText::OnSelection);
        assert_eq!(a.label, "10");
        assert!(a.clickable);
    }

    #[test]
    fn selection_wins_over_today() {
        let a = day_appearance(&day(15, DayPosition::MonthDate), true, true);
        assert_eq!(a.background, CellBackground::Selection);
    }

    #[test]
    fn today_is_highlighted() {
        let a = day_appearance(&day(15, DayPosition::MonthDate), false, true);
        assert_eq!(a.background, CellBackground::Highlight);
        assert_eq!(a.text, CellText::Default);
    }

    #[test]
    fn out_of_range_days_are_dimmed_and_disabled() {
        for position in [DayPosition::InDate, DayPosition::OutDate] {
            let a = day_appearance(&day(1, position), false, true);
            assert_eq!(a.background, CellBackground::Transparent);
            assert_eq!(a.text, CellText::Dimmed);
            assert!(!a.clickable);
        }
    }

    #[test]
    fn mapping_is_deterministic() {
        let d = day(7, DayPosition::MonthDate);
        for selected in [false, true] {
            for today in [false, true] {
                assert_eq!(
                    day_appearance(&d, selected, today),
                    day_appearance(&d, selected, today)
                );
            }
        }
    }
}
