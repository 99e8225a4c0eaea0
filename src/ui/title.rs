use unsegen::base::*;
use unsegen::widget::*;

use super::{fill_rect, Context};

/// Visible month between the previous / next controls.
pub struct TitleBar<'a> {
    context: &'a Context,
}

impl<'a> TitleBar<'a> {
    const PREVIOUS: &'static str = " < ";
    const NEXT: &'static str = " > ";

    pub fn new(context: &'a Context) -> Self {
        TitleBar { context }
    }
}

impl Widget for TitleBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(Self::PREVIOUS.len() + Self::NEXT.len() + 14),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let width = window.get_width().raw_value();
        let theme = &self.context.theme;
        let title = self.context.state().visible_month().to_string();

        let mut cursor = Cursor::new(&mut window).style_modifier(theme.background_style);
        fill_rect(&mut cursor, (0, 0), (width, 1));

        cursor.apply_style_modifier(theme.title_style);
        cursor.move_to(ColIndex::new(0), RowIndex::new(0));
        cursor.write(Self::PREVIOUS);

        let title_x = (width - title.chars().count() as i32).max(0) / 2;
        cursor.move_to(ColIndex::new(title_x), RowIndex::new(0));
        cursor.write(&title);

        cursor.move_to(
            ColIndex::new(width - Self::NEXT.len() as i32),
            RowIndex::new(0),
        );
        cursor.write(Self::NEXT);
    }
}
