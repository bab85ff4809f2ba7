pub mod application;
pub mod commands;
pub mod config;
pub mod model;
pub mod package;
pub mod runtime;
