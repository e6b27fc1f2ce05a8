//! Terminal pages: one module per command

pub mod detail;
pub mod health;
pub mod list;
pub mod portfolio;
pub mod prices;
pub mod setup;
pub mod ui;
