//! Configuration produced by the builder wizard.
//!
//! The wizard itself (forms, payment, publishing) lives outside this
//! workspace; these types are the contract it feeds the simulator. One
//! struct is threaded through the whole flow and is the single source of
//! truth the link router reads.

use serde::{Deserialize, Serialize};

/// Wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderStep {
    Config,
    Design,
    Payment,
    Publish,
}

impl BuilderStep {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Config => Some(Self::Design),
            Self::Design => Some(Self::Payment),
            Self::Payment => Some(Self::Publish),
            Self::Publish => None,
        }
    }

    pub fn back(self) -> Option<Self> {
        match self {
            Self::Config => None,
            Self::Design => Some(Self::Config),
            Self::Payment => Some(Self::Design),
            Self::Publish => Some(Self::Payment),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Ipad,
}

/// How the simulated app presents in-app navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavStyle {
    None,
    Drawer,
    Tabbar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavPosition {
    Left,
    Right,
}

/// A single entry in the drawer or tab bar. Children render as an
/// expandable sub-menu (drawer only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    /// Absolute URL or a path relative to the configured target.
    pub link: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// The website being wrapped.
    pub url: String,
    pub app_name: String,
    pub platform: Platform,
    #[serde(default = "NavStyle::default_style")]
    pub nav_style: NavStyle,
    #[serde(default = "NavPosition::default_position")]
    pub nav_position: NavPosition,
    #[serde(default = "default_true")]
    pub show_app_name: bool,
    #[serde(default)]
    pub show_footer_nav: bool,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default = "AppConfig::default_primary_color")]
    pub primary_color: String,
    #[serde(default)]
    pub logo_url: String,
}

fn default_true() -> bool {
    true
}

impl NavStyle {
    fn default_style() -> Self {
        Self::None
    }
}

impl NavPosition {
    fn default_position() -> Self {
        Self::Left
    }
}

impl AppConfig {
    fn default_primary_color() -> String {
        "#6366f1".to_string()
    }

    pub fn new(url: impl Into<String>, app_name: impl Into<String>, platform: Platform) -> Self {
        Self {
            url: url.into(),
            app_name: app_name.into(),
            platform,
            nav_style: NavStyle::None,
            nav_position: NavPosition::Left,
            show_app_name: true,
            show_footer_nav: false,
            menu_items: Vec::new(),
            primary_color: Self::default_primary_color(),
            logo_url: String::new(),
        }
    }
}
