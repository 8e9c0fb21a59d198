//! Shared API types used across the HTTP surface and the simulator client.

pub mod app_config;
pub mod embed;

pub use app_config::{AppConfig, BuilderStep, MenuItem, NavPosition, NavStyle, Platform};
pub use embed::{EmbedVerdict, ValidateUrlRequest};
