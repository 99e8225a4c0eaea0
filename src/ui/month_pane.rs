use chrono::Weekday;
use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::{month_range, weekday_label, CalendarMonth, DAYS_PER_WEEK, MAX_WEEKS_PER_MONTH};

use super::day_cell::{day_appearance, CellBackground, DayCell};
use super::{fill_rect, split_even, Context, Theme};

pub fn footer_text(selection_count: usize) -> String {
    match selection_count {
        0 => "No selections in this month".to_owned(),
        1 => "1 selection in this month".to_owned(),
        n => format!("{} selections in this month", n),
    }
}

fn write_centered(cursor: &mut Cursor, text: &str, x: i32, width: i32, y: i32) {
    let text_x = x + (width - text.chars().count() as i32).max(0) / 2;
    cursor.move_to(ColIndex::new(text_x), RowIndex::new(y));
    cursor.write(text);
}

pub struct MonthHeader<'a> {
    days_of_week: &'a [Weekday; DAYS_PER_WEEK],
    theme: &'a Theme,
}

impl<'a> MonthHeader<'a> {
    pub fn new(days_of_week: &'a [Weekday; DAYS_PER_WEEK], theme: &'a Theme) -> Self {
        MonthHeader {
            days_of_week,
            theme,
        }
    }

    pub fn draw_at(&self, window: &mut Window, origin: (i32, i32), width: i32) {
        let (x, y) = origin;
        let mut cursor = Cursor::new(window).style_modifier(self.theme.month_header_style);
        fill_rect(&mut cursor, origin, (width, 1));

        for (col, day) in self.days_of_week.iter().enumerate() {
            let (col_x, col_width) = split_even(x, width, DAYS_PER_WEEK, col);
            write_centered(&mut cursor, weekday_label(*day), col_x, col_width, y);
        }
    }
}

pub struct MonthFooter<'a> {
    selection_count: usize,
    theme: &'a Theme,
}

impl<'a> MonthFooter<'a> {
    pub fn new(selection_count: usize, theme: &'a Theme) -> Self {
        MonthFooter {
            selection_count,
            theme,
        }
    }

    pub fn draw_at(&self, window: &mut Window, origin: (i32, i32), width: i32) {
        let (x, y) = origin;
        let mut cursor = Cursor::new(window).style_modifier(self.theme.month_footer_style);
        fill_rect(&mut cursor, origin, (width, 1));
        write_centered(&mut cursor, &footer_text(self.selection_count), x, width, y);
    }
}

/// One page of the calendar: weekday header, day grid and selection footer.
pub struct MonthPane<'a> {
    month: CalendarMonth,
    context: &'a Context,
    focus: Option<usize>,
}

impl<'a> MonthPane<'a> {
    const HEADER_ROWS: i32 = 1;
    const FOOTER_ROWS: i32 = 1;
    const MIN_CELL_WIDTH: usize = 4;

    pub fn new(month: CalendarMonth, context: &'a Context) -> Self {
        MonthPane {
            month,
            context,
            focus: None,
        }
    }

    pub fn focus(mut self, focus: Option<usize>) -> Self {
        self.focus = focus;
        self
    }

    pub fn draw_at(&self, window: &mut Window, origin: (i32, i32), size: (i32, i32)) {
        let (x, y) = origin;
        let (width, height) = size;
        let theme = &self.context.theme;

        MonthHeader::new(self.context.days_of_week(), theme).draw_at(window, origin, width);

        let body_y = y + Self::HEADER_ROWS;
        let body_height = (height - Self::HEADER_ROWS - Self::FOOTER_ROWS).max(0);
        let rows = self.month.rows();

        for (row, week) in self.month.week_days.iter().enumerate() {
            let (cell_y, cell_height) = split_even(body_y, body_height, rows, row);

            for (col, day) in week.iter().enumerate() {
                let (cell_x, cell_width) = split_even(x, width, DAYS_PER_WEEK, col);
                let index = row * DAYS_PER_WEEK + col;

                DayCell::new(
                    day,
                    self.context.selection().contains(day),
                    self.context.is_today(day),
                    theme,
                )
                .focused(self.focus == Some(index))
                .draw_at(window, (cell_x, cell_y), (cell_width, cell_height));
            }
        }

        MonthFooter::new(self.context.selection_count(&self.month), theme).draw_at(
            window,
            (x, body_y + body_height),
            width,
        );
    }
}

impl Widget for MonthPane<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(DAYS_PER_WEEK * Self::MIN_CELL_WIDTH),
            height: RowDemand::at_least(
                (Self::HEADER_ROWS + Self::FOOTER_ROWS) as usize + MAX_WEEKS_PER_MONTH,
            ),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let size = (
            window.get_width().raw_value(),
            window.get_height().raw_value(),
        );
        self.draw_at(&mut window, (0, 0), size);
    }
}

/// Plain text rendering of `months` months starting at the visible one,
/// for non-interactive output. Months past the end of the window are left
/// out.
///
/// Each cell is the day number followed by a marker: `+` selected, `*`
/// today, `~` outside the month.
pub fn render_text(context: &Context, months: usize) -> String {
    let state = context.state();
    let first = state.visible_month();
    let last = (first + months.max(1) as i64 - 1).min(state.end_month());

    month_range(first, last)
        .map(|year_month| month_text(context, &state.month(year_month)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn month_text(context: &Context, month: &CalendarMonth) -> String {
    const CELL_WIDTH: usize = 5;
    let width = CELL_WIDTH * DAYS_PER_WEEK;

    let mut lines = vec![format!("{:^width$}", month.year_month.to_string(), width = width)];
    lines.push(
        context
            .days_of_week()
            .iter()
            .map(|day| format!("{:>4} ", weekday_label(*day)))
            .collect(),
    );

    for week in month.week_days.iter() {
        lines.push(
            week.iter()
                .map(|day| {
                    let appearance = day_appearance(
                        day,
                        context.selection().contains(day),
                        context.is_today(day),
                    );
                    let marker = match (appearance.background, appearance.clickable) {
                        (CellBackground::Selection, _) => '+',
                        (CellBackground::Highlight, _) => '*',
                        (_, false) => '~',
                        _ => ' ',
                    };
                    format!("{:>4}{}", appearance.label, marker)
                })
                .collect(),
        );
    }

    lines.push(format!(
        "{:^width$}",
        footer_text(context.selection_count(month)),
        width = width
    ));

    lines
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::NaiveDate;

    #[test]
    fn footer_pluralization() {
        assert_eq!(footer_text(0), "No selections in this month");
        assert_eq!(footer_text(1), "1 selection in this month");
        assert_eq!(footer_text(5), "5 selections in this month");
    }

    #[test]
    fn text_rendering_marks_today_and_filler_days() {
        let mut config = Config::default();
        config.first_day_of_week = Some(Weekday::Sun);
        let mut context = Context::new(&config, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        context.click_focused();

        let text = render_text(&context, 1);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "March 2024");
        assert_eq!(lines[1], " Sun  Mon  Tue  Wed  Thu  Fri  Sat");
        // March 2024 starts on a Friday.
        assert_eq!(lines[2], "  25~  26~  27~  28~  29~   1    2");
        assert!(lines[4].contains("15+"));
        assert_eq!(lines.len(), 2 + 6 + 1);
        assert_eq!(lines[8].trim(), "1 selection in this month");
    }

    #[test]
    fn text_rendering_of_several_months_stops_at_window_end() {
        let mut config = Config::default();
        config.first_day_of_week = Some(Weekday::Mon);
        config.month_window = 1;
        let context = Context::new(&config, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());

        let text = render_text(&context, 5);
        let titles: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| line.ends_with("2024"))
            .collect();

        assert_eq!(titles, vec!["March 2024", "April 2024"]);
        assert!(text.contains("No selections in this month\n\n"));
        assert!(text.contains("  15*"));
    }
}
