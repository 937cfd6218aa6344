//! Core functionality: persistence, file relocation, categories and the calendar

pub mod board;
pub mod calendar;
pub mod category;
pub mod config;
pub mod error;
pub mod paths;
pub mod relocate;
pub mod storage;
pub mod watcher;
