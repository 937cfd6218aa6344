//! UI components for Desktop Organizer

pub mod calendar;
pub mod category_window;
pub mod dialogs;
