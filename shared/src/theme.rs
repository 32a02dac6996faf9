//! Colour palettes for the light and dark appearance.

use serde::{Deserialize, Serialize};

/// Semantic colour slots, as `#rrggbb` strings the shells parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub primary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub light_gray: &'static str,
    pub danger: &'static str,
    pub success_green: &'static str,
    pub button_yellow: &'static str,
    pub box_neutral: &'static str,
    pub warning: &'static str,
    pub link_blue: &'static str,
}

pub const LIGHT: Palette = Palette {
    primary: "#2c3e50",
    background: "#ffffff",
    surface: "#f9f9f9",
    text: "#2c3e50",
    light_gray: "#ecf0f1",
    danger: "#e74c3c",
    success_green: "#2ecc71",
    button_yellow: "#f1c40f",
    box_neutral: "#bdc3c7",
    warning: "#e67e22",
    link_blue: "#2980b9",
};

pub const DARK: Palette = Palette {
    primary: "#ecf0f1",
    background: "#1a1a1a",
    surface: "#2a2a2a",
    text: "#ecf0f1",
    light_gray: "#3a3a3a",
    danger: "#ff6b5b",
    success_green: "#3ddc84",
    button_yellow: "#f1c40f",
    box_neutral: "#5d6d7e",
    warning: "#f39c4a",
    link_blue: "#5dade2",
};

/// Named slot, so derived decisions can stay palette independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorRole {
    SuccessGreen,
    Danger,
    BoxNeutral,
    Warning,
    LinkBlue,
}

impl Palette {
    pub fn for_mode(dark_mode: bool) -> &'static Palette {
        if dark_mode {
            &DARK
        } else {
            &LIGHT
        }
    }

    pub fn resolve(&self, role: ColorRole) -> &'static str {
        match role {
            ColorRole::SuccessGreen => self.success_green,
            ColorRole::Danger => self.danger,
            ColorRole::BoxNeutral => self.box_neutral,
            ColorRole::Warning => self.warning,
            ColorRole::LinkBlue => self.link_blue,
        }
    }
}
