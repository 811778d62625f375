pub mod categories;
pub mod classify;
pub mod clipboard;
pub mod history;
pub mod rules;
