use nix::sys::signal;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use unsegen::input::Input;

use crate::config::Config;
use crate::pager::ScrollTicket;

pub enum Event {
    Input(Input),
    Update,
    Resize,
    /// Animation frame for the scroll request identified by the ticket.
    Frame(ScrollTicket),
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    frame_interval: Duration,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
    _signal_handle: thread::JoinHandle<()>,
}

impl Dispatcher {
    pub fn from_config(config: &Config, signals_to_wait: signal::SigSet) -> Dispatcher {
        let tick_rate = config.tick_rate;
        let (tx, rx) = mpsc::channel();

        // Block before spawning so every thread inherits the mask and only
        // the signal thread receives them.
        if let Err(e) = signals_to_wait.thread_block() {
            log::warn!("Unable to block signals: {}", e);
        }

        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(e) => log::warn!("Error while reading input: {}", e),
                    }
                }
            })
        };

        let update_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                if tx.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };

        let signal_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                match signals_to_wait.wait() {
                    Ok(signal::SIGWINCH) => {
                        if tx.send(Event::Resize).is_err() {
                            return;
                        }
                    }
                    Ok(sig) => log::debug!("Ignoring signal {:?}", sig),
                    Err(e) => {
                        log::error!("Waiting for signals failed: {}", e);
                        return;
                    }
                }
            })
        };

        Dispatcher {
            rx,
            tx,
            frame_interval: config.frame_interval,
            _input_handle: input_handle,
            _update_handle: update_handle,
            _signal_handle: signal_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    /// Fire-and-forget frame source for one scroll animation.
    pub fn scroll_frames(&self, ticket: ScrollTicket, generation: Arc<AtomicU64>, duration: Duration) {
        spawn_frames(
            self.tx.clone(),
            ticket,
            generation,
            duration,
            self.frame_interval,
        );
    }
}

/// Sends `Event::Frame(ticket)` every `interval` until `duration` has
/// passed, plus one final frame. Stops early once `generation` moved past
/// the ticket.
pub fn spawn_frames(
    sink: mpsc::Sender<Event>,
    ticket: ScrollTicket,
    generation: Arc<AtomicU64>,
    duration: Duration,
    interval: Duration,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let started = Instant::now();
        let is_current = || generation.load(Ordering::SeqCst) == ticket.generation();

        while is_current() {
            let done = started.elapsed() >= duration;
            if sink.send(Event::Frame(ticket)).is_err() || done {
                return;
            }
            thread::sleep(interval);
        }

        log::trace!("Frames of ticket {} superseded", ticket.generation());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{OutDateStyle, YearMonth};
    use crate::pager::CalendarState;
    use chrono::{Month, Weekday};

    fn ticket_and_state() -> (ScrollTicket, CalendarState) {
        let mut state = CalendarState::around(
            YearMonth::new(2024, Month::March),
            12,
            Weekday::Mon,
            OutDateStyle::EndOfGrid,
        );
        let ticket = state.go_to_next().unwrap();
        (ticket, state)
    }

    #[test]
    fn frames_run_until_duration_passed() {
        let (ticket, state) = ticket_and_state();
        let (tx, rx) = mpsc::channel();

        spawn_frames(
            tx,
            ticket,
            state.generation(),
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .join()
        .unwrap();

        let frames: Vec<_> = rx.try_iter().collect();
        assert!(frames.len() >= 2);
        assert!(frames
            .iter()
            .all(|e| matches!(e, Event::Frame(t) if *t == ticket)));
    }

    #[test]
    fn superseded_ticket_produces_no_frames() {
        let (ticket, mut state) = ticket_and_state();
        state.go_to_previous();
        assert!(!state.is_current(ticket));

        let (tx, rx) = mpsc::channel();
        spawn_frames(
            tx,
            ticket,
            state.generation(),
            Duration::from_secs(10),
            Duration::from_millis(5),
        )
        .join()
        .unwrap();

        assert_eq!(rx.try_iter().count(), 0);
    }
}
