pub mod calendar;
pub mod config;
pub mod error;
pub mod events;
pub mod pager;
pub mod selection;
pub mod ui;
