//! SD-WAN Manager client and UX1 to UX2 configuration migration

pub mod config;
pub mod converters;
pub mod manager;
pub mod migration;
pub mod models;
pub mod utils;
