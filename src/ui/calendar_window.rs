use unsegen::base::*;
use unsegen::widget::*;

use crate::calendar::{DAYS_PER_WEEK, MAX_WEEKS_PER_MONTH};
use crate::config::Orientation;

use super::{fill_rect, Context, MonthPane};

/// Origins of the month pages intersecting the viewport at scroll
/// `position`, as `(month index, (x, y))`.
pub fn page_origins(
    orientation: Orientation,
    position: f64,
    size: (i32, i32),
    month_count: usize,
) -> Vec<(usize, (i32, i32))> {
    let first = position.floor().max(0.0);
    let fraction = position - first;
    let first = first as usize;

    let extent = match orientation {
        Orientation::Horizontal => size.0,
        Orientation::Vertical => size.1,
    };
    let shift = (fraction * extent as f64).round() as i32;

    let origin = |offset: i32| match orientation {
        Orientation::Horizontal => (offset, 0),
        Orientation::Vertical => (0, offset),
    };

    let mut pages = vec![(first, origin(-shift))];
    if shift > 0 && first + 1 < month_count {
        pages.push((first + 1, origin(extent - shift)));
    }
    pages
}

/// Paged calendar area. Shows exactly one month at rest and the two months
/// around the scroll position while sliding.
pub struct CalendarWindow<'a> {
    context: &'a Context,
}

impl<'a> CalendarWindow<'a> {
    pub fn new(context: &'a Context) -> Self {
        CalendarWindow { context }
    }
}

impl Widget for CalendarWindow<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(DAYS_PER_WEEK * 4),
            height: RowDemand::at_least(MAX_WEEKS_PER_MONTH + 2),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let size = (
            window.get_width().raw_value(),
            window.get_height().raw_value(),
        );
        let state = self.context.state();

        {
            let mut cursor = Cursor::new(&mut window).style_modifier(self.context.theme.background_style);
            fill_rect(&mut cursor, (0, 0), size);
        }

        let focus = if state.is_scrolling() {
            None
        } else {
            Some(self.context.focus_index())
        };

        for (index, origin) in page_origins(
            self.context.orientation,
            state.position(),
            size,
            state.month_count(),
        ) {
            let month = state.month(state.month_at(index));
            MonthPane::new(month, self.context)
                .focus(focus)
                .draw_at(&mut window, origin, size);
        }
    }
}
