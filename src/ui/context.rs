use chrono::{Local, NaiveDate, Weekday};
use std::cell::Cell;
use std::rc::Rc;

use unsegen::base::style::*;
use unsegen::widget::builtin::PromptLine;

use crate::calendar::{self, CalendarDay, CalendarMonth, YearMonth, DAYS_PER_WEEK};
use crate::config::{ColorConfig, Config, Orientation};
use crate::pager::{CalendarState, ScrollTicket};
use crate::selection::Selection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub background_style: StyleModifier,
    pub secondary_style: StyleModifier,
    pub selection_style: StyleModifier,
    pub today_style: StyleModifier,
    pub day_text_style: StyleModifier,
    pub on_selection_text_style: StyleModifier,
    pub dimmed_text_style: StyleModifier,
    pub focus_day_style: StyleModifier,
    pub focus_day_marks: Option<(char, char)>,
    pub month_header_style: StyleModifier,
    pub month_footer_style: StyleModifier,
    pub title_style: StyleModifier,
    pub error_style: StyleModifier,
}

impl Theme {
    pub fn from_colors(colors: &ColorConfig) -> Self {
        let secondary = StyleModifier::new().bg_color(colors.background_secondary.0);

        Theme {
            background_style: StyleModifier::new().bg_color(colors.background.0),
            secondary_style: secondary,
            selection_style: StyleModifier::new().bg_color(colors.selection.0),
            today_style: StyleModifier::new().bg_color(colors.highlight.0),
            day_text_style: StyleModifier::new(),
            on_selection_text_style: StyleModifier::new().fg_color(colors.on_selection.0),
            // Filler days share the highlight token, drawn as text.
            dimmed_text_style: StyleModifier::new().fg_color(colors.highlight.0),
            focus_day_style: StyleModifier::new().underline(true).bold(true),
            focus_day_marks: Some(('[', ']')),
            month_header_style: secondary,
            month_footer_style: secondary,
            title_style: StyleModifier::new().bold(true),
            error_style: StyleModifier::new().fg_color(Color::LightRed),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_colors(&ColorConfig::default())
    }
}

/// Where the focus lands once the next scroll settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FocusHint {
    /// Today if it belongs to the month, the first of the month otherwise.
    Default,
    Date(NaiveDate),
}

fn resolve_focus(month: &CalendarMonth, hint: FocusHint, today: NaiveDate) -> usize {
    let date = match hint {
        FocusHint::Date(date) if month.year_month.contains(&date) => date,
        _ if month.year_month.contains(&today) => today,
        _ => month.year_month.first_day(),
    };

    month.index_of(&date).unwrap_or(0)
}

pub struct Context {
    pub mode: Mode,
    pub theme: Theme,
    pub orientation: Orientation,
    pub last_error_message: Option<String>,
    state: CalendarState,
    selection: Selection,
    days_of_week: [Weekday; DAYS_PER_WEEK],
    today: Rc<Cell<NaiveDate>>,
    focus: Rc<Cell<usize>>,
    focus_hint: Rc<Cell<FocusHint>>,
    pending_scrolls: Vec<ScrollTicket>,
    command_line: PromptLine,
}

impl Context {
    pub fn new(config: &Config, today: NaiveDate) -> Self {
        let first_day_of_week = config.first_day_of_week();
        let mut state = CalendarState::around(
            YearMonth::from(today),
            config.month_window,
            first_day_of_week,
            config.out_date_style,
        )
        .with_scroll_duration(config.scroll_duration);

        let today = Rc::new(Cell::new(today));
        let focus_hint = Rc::new(Cell::new(FocusHint::Default));
        let focus = Rc::new(Cell::new(resolve_focus(
            &state.month(state.visible_month()),
            FocusHint::Default,
            today.get(),
        )));

        {
            let today = Rc::clone(&today);
            let focus = Rc::clone(&focus);
            let focus_hint = Rc::clone(&focus_hint);
            let out_date_style = config.out_date_style;

            state.on_settle(move |visible| {
                let month = CalendarMonth::generate(visible, first_day_of_week, out_date_style);
                focus.set(resolve_focus(&month, focus_hint.replace(FocusHint::Default), today.get()));
            });
        }

        Context {
            mode: Mode::Normal,
            theme: Theme::from_colors(&config.colors),
            orientation: config.orientation,
            last_error_message: None,
            state,
            selection: Selection::new(),
            days_of_week: calendar::days_of_week(first_day_of_week),
            today,
            focus,
            focus_hint,
            pending_scrolls: Vec::new(),
            command_line: PromptLine::with_prompt(":".to_owned()),
        }
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut CalendarState {
        &mut self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn days_of_week(&self) -> &[Weekday; DAYS_PER_WEEK] {
        &self.days_of_week
    }

    pub fn update(&mut self) {
        let today = Local::now().date_naive();
        if today != self.today.get() {
            log::info!("Date changed to {}", today);
            self.today.set(today);
        }
    }

    pub fn is_today(&self, day: &CalendarDay) -> bool {
        day.is_month_date() && day.date == self.today.get()
    }

    pub fn visible_month(&self) -> CalendarMonth {
        self.state.month(self.state.visible_month())
    }

    pub fn selection_count(&self, month: &CalendarMonth) -> usize {
        self.selection.count_in(month)
    }

    pub fn focus_index(&self) -> usize {
        self.focus.get()
    }

    pub fn focused_day(&self) -> Option<CalendarDay> {
        self.visible_month().day_at(self.focus.get()).copied()
    }

    /// Toggles `day` if it belongs to its month. Clicks on filler days do
    /// nothing.
    pub fn click(&mut self, day: &CalendarDay) -> bool {
        if day.is_month_date() {
            self.selection.toggle(*day);
            true
        } else {
            false
        }
    }

    pub fn click_focused(&mut self) -> bool {
        match self.focused_day() {
            Some(day) if !self.state.is_scrolling() => self.click(&day),
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Moves the focus by `delta` cells, paging when leaving the grid.
    pub fn move_focus(&mut self, delta: i64) {
        if self.state.is_scrolling() {
            return;
        }

        let month = self.visible_month();
        let len = month.days().count() as i64;
        let target = self.focus.get() as i64 + delta;

        if (0..len).contains(&target) {
            self.focus.set(target as usize);
            return;
        }

        let date = match month.day_at(self.focus.get()) {
            Some(day) => day.date + chrono::Duration::days(delta),
            None => return,
        };

        let ticket = if target < 0 {
            self.state.go_to_previous()
        } else {
            self.state.go_to_next()
        };

        if let Some(ticket) = ticket {
            self.focus_hint.set(FocusHint::Date(date));
            self.pending_scrolls.push(ticket);
        }
    }

    pub fn go_to_previous(&mut self) {
        if let Some(ticket) = self.state.go_to_previous() {
            self.focus_hint.set(FocusHint::Default);
            self.pending_scrolls.push(ticket);
        }
    }

    pub fn go_to_next(&mut self) {
        if let Some(ticket) = self.state.go_to_next() {
            self.focus_hint.set(FocusHint::Default);
            self.pending_scrolls.push(ticket);
        }
    }

    /// Pages `count` months forward (negative: backwards) in one animation.
    pub fn go_by(&mut self, count: i64) -> bool {
        let target = self.state.first_visible_month() + count;
        match self.state.animate_scroll_to_month(target) {
            Some(ticket) => {
                self.focus_hint.set(FocusHint::Default);
                self.pending_scrolls.push(ticket);
                true
            }
            None => false,
        }
    }

    pub fn jump_to(&mut self, month: YearMonth) -> bool {
        self.focus_hint.set(FocusHint::Default);
        self.state.scroll_to_month(month)
    }

    pub fn jump_to_today(&mut self) -> bool {
        let today = self.today.get();
        self.focus_hint.set(FocusHint::Date(today));
        self.state.scroll_to_month(YearMonth::from(today))
    }

    /// Scroll requests issued since the last call.
    pub fn take_pending_scrolls(&mut self) -> Vec<ScrollTicket> {
        std::mem::take(&mut self.pending_scrolls)
    }

    pub fn command_line(&self) -> &PromptLine {
        &self.command_line
    }

    pub fn command_line_mut(&mut self) -> &mut PromptLine {
        &mut self.command_line
    }
}
