mod app;
mod calendar_window;
mod command;
mod context;
mod day_cell;
mod month_pane;
mod title;

pub use app::App;
pub use calendar_window::CalendarWindow;
pub use command::CommandParser;
pub use context::{Context, Mode, Theme};
pub use day_cell::{day_appearance, CellBackground, CellText, DayAppearance, DayCell};
pub use month_pane::{footer_text, render_text, MonthFooter, MonthHeader, MonthPane};
pub use title::TitleBar;

use unsegen::base::*;

/// Position and length of part `index` when `total` cells starting at
/// `start` are split into `parts` nearly equal parts.
pub(crate) fn split_even(start: i32, total: i32, parts: usize, index: usize) -> (i32, i32) {
    let parts = parts.max(1) as i32;
    let index = index as i32;
    let begin = start + total * index / parts;
    let end = start + total * (index + 1) / parts;
    (begin, end - begin)
}

/// Overwrites the rectangle with blanks in the cursor's current style.
pub(crate) fn fill_rect(cursor: &mut Cursor, origin: (i32, i32), size: (i32, i32)) {
    let (x, y) = origin;
    let (width, height) = size;
    if width <= 0 {
        return;
    }

    let blank = " ".repeat(width as usize);
    for row in y..y + height {
        cursor.move_to(ColIndex::new(x), RowIndex::new(row));
        cursor.write(&blank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_even_covers_total_without_gaps() {
        let parts: Vec<_> = (0..7).map(|i| split_even(2, 30, 7, i)).collect();
        assert_eq!(parts[0].0, 2);
        for pair in parts.windows(2) {
            assert_eq!(pair[0].0 + pair[0].1, pair[1].0);
        }
        assert_eq!(parts.iter().map(|p| p.1).sum::<i32>(), 30);
        assert!(parts.iter().all(|p| p.1 == 4 || p.1 == 5));
    }
}
