use chrono::Weekday;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::calendar::{CalendarMonth, OutDateStyle, YearMonth};

/// Identifies one animated scroll request. Only the most recent ticket is
/// current; frames carrying an older ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollTicket(u64);

impl ScrollTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Animation {
    from: f64,
    to: usize,
    started: Instant,
    ticket: ScrollTicket,
}

type SettleObserver = Box<dyn FnMut(YearMonth)>;

/// Scroll state of a paged month calendar.
///
/// The position is measured in months since `start_month`. Whole numbers are
/// resting positions; fractional values only occur while an animation runs.
pub struct CalendarState {
    start_month: YearMonth,
    end_month: YearMonth,
    first_day_of_week: Weekday,
    out_date_style: OutDateStyle,
    scroll_duration: Duration,
    position: f64,
    settled: usize,
    animation: Option<Animation>,
    generation: Arc<AtomicU64>,
    observers: Vec<SettleObserver>,
}

impl fmt::Debug for CalendarState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarState")
            .field("start_month", &self.start_month)
            .field("end_month", &self.end_month)
            .field("position", &self.position)
            .field("settled", &self.settled)
            .field("animation", &self.animation)
            .finish()
    }
}

impl CalendarState {
    pub const DEFAULT_SCROLL_DURATION: Duration = Duration::from_millis(250);

    pub fn new(
        start_month: YearMonth,
        end_month: YearMonth,
        first_visible_month: YearMonth,
        first_day_of_week: Weekday,
        out_date_style: OutDateStyle,
    ) -> Self {
        let start_month = start_month.max(YearMonth::min_supported());
        let end_month = end_month.min(YearMonth::max_supported());
        let end_month = if end_month < start_month {
            log::warn!(
                "End month {} lies before start month {}, using a single month",
                end_month,
                start_month
            );
            start_month
        } else {
            end_month
        };

        let max_index = start_month.months_until(&end_month) as usize;
        let index = (start_month.months_until(&first_visible_month).max(0) as usize).min(max_index);

        CalendarState {
            start_month,
            end_month,
            first_day_of_week,
            out_date_style,
            scroll_duration: Self::DEFAULT_SCROLL_DURATION,
            position: index as f64,
            settled: index,
            animation: None,
            generation: Arc::new(AtomicU64::new(0)),
            observers: Vec::new(),
        }
    }

    /// State allowing `window` months before and after `current`, cut off
    /// where chrono runs out of dates.
    pub fn around(
        current: YearMonth,
        window: u32,
        first_day_of_week: Weekday,
        out_date_style: OutDateStyle,
    ) -> Self {
        Self::new(
            current.minus_months(window as i64),
            current.plus_months(window as i64),
            current,
            first_day_of_week,
            out_date_style,
        )
    }

    pub fn with_scroll_duration(mut self, duration: Duration) -> Self {
        self.scroll_duration = duration;
        self
    }

    pub fn start_month(&self) -> YearMonth {
        self.start_month
    }

    pub fn end_month(&self) -> YearMonth {
        self.end_month
    }

    pub fn scroll_duration(&self) -> Duration {
        self.scroll_duration
    }

    pub fn month_count(&self) -> usize {
        self.start_month.months_until(&self.end_month) as usize + 1
    }

    pub fn month(&self, year_month: YearMonth) -> CalendarMonth {
        CalendarMonth::generate(year_month, self.first_day_of_week, self.out_date_style)
    }

    pub fn month_at(&self, index: usize) -> YearMonth {
        self.start_month + index as i64
    }

    fn index_of(&self, year_month: &YearMonth) -> Option<usize> {
        let index = self.start_month.months_until(year_month);
        if index >= 0 && (index as usize) < self.month_count() {
            Some(index as usize)
        } else {
            None
        }
    }

    /// Month the scroll position last settled on.
    pub fn visible_month(&self) -> YearMonth {
        self.month_at(self.settled)
    }

    /// First month with any part inside the viewport. Follows the scroll
    /// position while animating.
    pub fn first_visible_month(&self) -> YearMonth {
        self.month_at(self.position.floor().max(0.0) as usize)
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_scrolling(&self) -> bool {
        self.animation.is_some()
    }

    pub fn go_to_previous(&mut self) -> Option<ScrollTicket> {
        let target = self.first_visible_month().previous();
        self.animate_scroll_to_month(target)
    }

    pub fn go_to_next(&mut self) -> Option<ScrollTicket> {
        let target = self.first_visible_month().next();
        self.animate_scroll_to_month(target)
    }

    pub fn animate_scroll_to_month(&mut self, year_month: YearMonth) -> Option<ScrollTicket> {
        self.animate_scroll_to_month_at(year_month, Instant::now())
    }

    /// Starts an animation toward `year_month`, replacing any running one.
    /// Months outside the window are ignored.
    pub fn animate_scroll_to_month_at(
        &mut self,
        year_month: YearMonth,
        now: Instant,
    ) -> Option<ScrollTicket> {
        let to = match self.index_of(&year_month) {
            Some(index) => index,
            None => {
                log::warn!(
                    "Attempting to scroll to {} outside of [{}, {}]",
                    year_month,
                    self.start_month,
                    self.end_month
                );
                return None;
            }
        };

        if self.animation.is_some() {
            self.advance(now);
        }

        let ticket = self.next_ticket();
        log::debug!(
            "Scrolling from {:.2} to {} ({}), ticket {}",
            self.position,
            to,
            year_month,
            ticket.generation()
        );

        self.animation = Some(Animation {
            from: self.position,
            to,
            started: now,
            ticket,
        });

        Some(ticket)
    }

    /// Jumps to `year_month` without animating. Returns `false` if the month
    /// lies outside the window.
    pub fn scroll_to_month(&mut self, year_month: YearMonth) -> bool {
        match self.index_of(&year_month) {
            Some(index) => {
                self.next_ticket();
                self.animation = None;
                self.position = index as f64;
                self.settle(index);
                true
            }
            None => {
                log::warn!("Attempting to jump to {} outside of the window", year_month);
                false
            }
        }
    }

    /// Moves the running animation to its state at `now`. Returns `true` if
    /// the scroll settled during this call.
    pub fn advance(&mut self, now: Instant) -> bool {
        let animation = match &self.animation {
            Some(animation) => animation.clone(),
            None => return false,
        };

        let elapsed = now.saturating_duration_since(animation.started);
        let progress = if self.scroll_duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.scroll_duration.as_secs_f64()).min(1.0)
        };

        if progress >= 1.0 {
            self.animation = None;
            self.position = animation.to as f64;
            self.settle(animation.to);
            true
        } else {
            let eased = 1.0 - (1.0 - progress).powi(3);
            self.position = animation.from + (animation.to as f64 - animation.from) * eased;
            false
        }
    }

    pub fn is_current(&self, ticket: ScrollTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Shared counter that frame producers poll to find out whether they
    /// have been superseded.
    pub fn generation(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }

    /// Registers a callback run with the visible month every time the
    /// scroll position settles.
    pub fn on_settle<F: FnMut(YearMonth) + 'static>(&mut self, observer: F) {
        self.observers.push(Box::new(observer));
    }

    fn next_ticket(&self) -> ScrollTicket {
        ScrollTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn settle(&mut self, index: usize) {
        self.settled = index;
        let visible = self.visible_month();
        log::debug!("Scroll settled on {}", visible);

        for observer in self.observers.iter_mut() {
            observer(visible);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn march_2024() -> YearMonth {
        YearMonth::new(2024, Month::March)
    }

    fn state() -> CalendarState {
        CalendarState::around(march_2024(), 500, Weekday::Mon, OutDateStyle::EndOfGrid)
    }

    fn finish(state: &mut CalendarState, started: Instant) {
        assert!(state.advance(started + state.scroll_duration() * 2));
    }

    #[test]
    fn window_is_symmetric_around_current_month() {
        let state = state();
        assert_eq!(state.month_count(), 1001);
        assert_eq!(state.start_month(), YearMonth::new(1982, Month::July));
        assert_eq!(state.end_month(), YearMonth::new(2065, Month::November));
        assert_eq!(state.visible_month(), march_2024());
    }

    #[test]
    fn window_is_clamped_to_representable_months() {
        let mut state =
            CalendarState::around(march_2024(), u32::MAX, Weekday::Mon, OutDateStyle::EndOfGrid);
        assert_eq!(state.start_month(), YearMonth::min_supported());
        assert_eq!(state.end_month(), YearMonth::max_supported());
        assert_eq!(state.visible_month(), march_2024());

        assert!(state
            .animate_scroll_to_month(YearMonth::max_supported().next())
            .is_none());

        let last = state.end_month();
        assert!(state.animate_scroll_to_month(last).is_some());
        finish(&mut state, Instant::now());
        assert_eq!(state.visible_month(), last);
        assert_eq!(state.month(last).year_month, last);

        let first = state.start_month();
        assert!(state.scroll_to_month(first));
        assert_eq!(state.month(first).rows(), 6);
    }

    #[test]
    fn next_then_previous_returns_to_start() {
        let mut state = state();
        let now = Instant::now();

        let target = state.first_visible_month().next();
        assert!(state.animate_scroll_to_month_at(target, now).is_some());
        assert!(state.is_scrolling());
        assert_eq!(state.visible_month(), march_2024());
        finish(&mut state, now);
        assert_eq!(state.visible_month(), YearMonth::new(2024, Month::April));

        assert!(state.go_to_previous().is_some());
        finish(&mut state, Instant::now());
        assert_eq!(state.visible_month(), march_2024());
        assert!(!state.is_scrolling());
    }

    #[test]
    fn position_moves_monotonically_toward_target() {
        let mut state = state();
        let now = Instant::now();
        state.animate_scroll_to_month_at(march_2024().next(), now);

        let start = state.position();
        assert!(!state.advance(now + state.scroll_duration() / 4));
        let quarter = state.position();
        assert!(!state.advance(now + state.scroll_duration() / 2));
        let half = state.position();

        assert!(start < quarter && quarter < half && half < start + 1.0);
        assert_eq!(state.first_visible_month(), march_2024());
    }

    #[test]
    fn newer_request_supersedes_older_ticket() {
        let mut state = state();
        let now = Instant::now();

        let first = state.animate_scroll_to_month_at(march_2024().next(), now).unwrap();
        let second = state
            .animate_scroll_to_month_at(march_2024().previous(), now)
            .unwrap();

        assert!(!state.is_current(first));
        assert!(state.is_current(second));
        finish(&mut state, now);
        assert_eq!(state.visible_month(), YearMonth::new(2024, Month::February));
    }

    #[test]
    fn repeated_next_inside_same_month_collapses() {
        let mut state = state();
        state.go_to_next();
        state.go_to_next();
        finish(&mut state, Instant::now());
        assert_eq!(state.visible_month(), YearMonth::new(2024, Month::April));
    }

    #[test]
    fn out_of_window_request_is_ignored() {
        let mut state = CalendarState::around(march_2024(), 1, Weekday::Mon, OutDateStyle::EndOfGrid);
        assert!(state.go_to_next().is_some());
        finish(&mut state, Instant::now());
        assert_eq!(state.visible_month(), YearMonth::new(2024, Month::April));

        assert!(state.go_to_next().is_none());
        assert!(!state.is_scrolling());
        assert!(!state.scroll_to_month(YearMonth::new(2030, Month::January)));
        assert_eq!(state.visible_month(), YearMonth::new(2024, Month::April));
    }

    #[test]
    fn observers_see_every_settle() {
        let mut state = state();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        state.on_settle(move |month| sink.borrow_mut().push(month));

        state.go_to_next();
        finish(&mut state, Instant::now());
        assert!(state.scroll_to_month(YearMonth::new(2025, Month::January)));

        assert_eq!(
            *seen.borrow(),
            vec![
                YearMonth::new(2024, Month::April),
                YearMonth::new(2025, Month::January)
            ]
        );
    }

    #[test]
    fn jump_cancels_running_animation() {
        let mut state = state();
        let ticket = state.go_to_next().unwrap();
        assert!(state.scroll_to_month(march_2024() - 3));
        assert!(!state.is_current(ticket));
        assert!(!state.is_scrolling());
        assert!(!state.advance(Instant::now()));
        assert_eq!(state.visible_month(), YearMonth::new(2023, Month::December));
    }
}
