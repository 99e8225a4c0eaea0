use chrono::NaiveDate;
use std::time::Instant;

use crate::calendar::DAYS_PER_WEEK;
use crate::config::{Config, Orientation};
use crate::events::{Dispatcher, Event};

use super::command::CommandParser;
use super::context::{Context, Mode};
use super::{fill_rect, CalendarWindow, TitleBar};

use unsegen::base::{
    ColIndex, Cursor, GraphemeCluster, RowIndex, Terminal, Window,
};
use unsegen::input::{
    EditBehavior, Key, Navigatable, NavigateBehavior, OperationResult, ScrollBehavior, Scrollable,
};
use unsegen::widget::*;

pub struct App<'a> {
    config: &'a Config,
    context: Context,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, today: NaiveDate) -> App<'a> {
        let context = Context::new(config, today);
        log::info!(
            "Showing {} of [{}, {}] in {} mode",
            context.state().visible_month(),
            context.state().start_month(),
            context.state().end_month(),
            config.orientation
        );
        App { config, context }
    }

    fn bottom_bar<'w>(&'w self) -> impl Widget + 'w {
        let spacer = " ".with_demand(|_| Demand2D {
            width: ColDemand::exact(1),
            height: RowDemand::exact(1),
        });

        let mut layout = HLayout::new()
            .separator(GraphemeCluster::try_from(' ').unwrap())
            .widget(spacer);

        if self.context.mode == Mode::Command {
            layout = layout.widget(self.context.command_line().as_widget());
        } else {
            layout = layout.widget(StatusLine(&self.context));
        }

        layout
    }

    fn as_widget<'w>(&'w self) -> impl Widget + 'w
    where
        'a: 'w,
    {
        VLayout::new()
            .widget(TitleBar::new(&self.context))
            .widget(CalendarWindow::new(&self.context))
            .widget(self.bottom_bar())
    }

    fn handle_input(&mut self, input: unsegen::input::Input) -> bool {
        let mut run = true;

        if input.matches(Key::Esc) {
            self.context.mode = Mode::Normal;
            return run;
        }

        let (page_back, page_forward) = match self.config.orientation {
            Orientation::Horizontal => (Key::Left, Key::Right),
            Orientation::Vertical => (Key::Up, Key::Down),
        };

        match self.context.mode {
            Mode::Normal => {
                input
                    .chain((Key::Char('q'), || run = false))
                    .chain((Key::Char(':'), || {
                        self.context.last_error_message = None;
                        self.context.mode = Mode::Command
                    }))
                    .chain((Key::Char('\n'), || {
                        self.context.click_focused();
                    }))
                    .chain((Key::Char(' '), || {
                        self.context.click_focused();
                    }))
                    .chain((Key::Char('t'), || {
                        self.context.jump_to_today();
                    }))
                    .chain(
                        NavigateBehavior::new(&mut FocusBehaviour(&mut self.context))
                            .down_on(Key::Char('j'))
                            .up_on(Key::Char('k'))
                            .left_on(Key::Char('h'))
                            .right_on(Key::Char('l')),
                    )
                    .chain(
                        ScrollBehavior::new(&mut PagerBehaviour(&mut self.context))
                            .forwards_on(Key::Char(']'))
                            .forwards_on(Key::Char('>'))
                            .forwards_on(page_forward)
                            .backwards_on(Key::Char('['))
                            .backwards_on(Key::Char('<'))
                            .backwards_on(page_back),
                    )
                    .finish();
            }
            Mode::Command => {
                input
                    .chain(
                        EditBehavior::new(self.context.command_line_mut())
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(self.context.command_line_mut())
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .chain(CommandParser::new(&mut self.context))
                    .finish();
            }
        }

        run
    }

    pub fn draw(&self, term: &mut Terminal) {
        let root = term.create_root_window();
        self.as_widget().draw(root, RenderingHints::new());
        term.present();
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut run = true;

        while run {
            // Handle events
            if let Ok(event) = dispatcher.next() {
                match event {
                    Event::Update => self.context.update(),
                    Event::Resize => log::debug!("Terminal resized"),
                    Event::Frame(ticket) => {
                        if self.context.state().is_current(ticket) {
                            self.context.state_mut().advance(Instant::now());
                        }
                    }
                    Event::Input(input) => {
                        run = self.handle_input(input);
                    }
                }
            } else {
                log::error!("Event channel closed");
                break;
            }

            let generation = self.context.state().generation();
            let duration = self.context.state().scroll_duration();
            for ticket in self.context.take_pending_scrolls() {
                dispatcher.scroll_frames(ticket, generation.clone(), duration);
            }

            // Draw
            self.draw(&mut term);
        }

        Ok(())
    }
}

struct StatusLine<'a>(&'a Context);

impl Widget for StatusLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let width = window.get_width().raw_value();
        let mut cursor = Cursor::new(&mut window).style_modifier(self.0.theme.secondary_style);
        fill_rect(&mut cursor, (0, 0), (width, 1));
        cursor.move_to(ColIndex::new(0), RowIndex::new(0));

        match &self.0.last_error_message {
            Some(msg) => {
                cursor.apply_style_modifier(self.0.theme.error_style);
                cursor.write(msg);
            }
            None => {
                let selected = self.0.selection().len();
                cursor.write(&format!(
                    "{} day{} selected",
                    selected,
                    if selected == 1 { "" } else { "s" }
                ));
            }
        }
    }
}

struct FocusBehaviour<'a>(&'a mut Context);

impl Navigatable for FocusBehaviour<'_> {
    fn move_down(&mut self) -> OperationResult {
        self.0.move_focus(DAYS_PER_WEEK as i64);
        Ok(())
    }

    fn move_left(&mut self) -> OperationResult {
        self.0.move_focus(-1);
        Ok(())
    }

    fn move_right(&mut self) -> OperationResult {
        self.0.move_focus(1);
        Ok(())
    }

    fn move_up(&mut self) -> OperationResult {
        self.0.move_focus(-(DAYS_PER_WEEK as i64));
        Ok(())
    }
}

struct PagerBehaviour<'a>(&'a mut Context);

impl Scrollable for PagerBehaviour<'_> {
    fn scroll_backwards(&mut self) -> OperationResult {
        self.0.go_to_previous();
        Ok(())
    }

    fn scroll_forwards(&mut self) -> OperationResult {
        self.0.go_to_next();
        Ok(())
    }
}
