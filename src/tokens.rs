//! UI design tokens: light and dark palettes plus shared spacing, radius,
//! shadow and transition tables.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|rgba?\(\s*\d{1,3}\s*,\s*\d{1,3}\s*,\s*\d{1,3}\s*(,\s*(0|1|0?\.\d+)\s*)?\))$",
    )
    .expect("valid color regex")
});
static LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d+)?(px|rem)$").expect("valid length regex"));
static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+ms$").expect("valid duration regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid {kind} token {key}: {value:?}")]
    Invalid {
        kind: &'static str,
        key: &'static str,
        value: &'static str,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Light,
    Dark,
}

/// Same fields for both variants, so the key sets cannot drift apart.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColorTokens {
    pub background: &'static str,
    pub surface: &'static str,
    pub surface_raised: &'static str,
    pub primary: &'static str,
    pub primary_hover: &'static str,
    pub secondary: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub success: &'static str,
    pub warning: &'static str,
    pub danger: &'static str,
    pub overlay: &'static str,
    pub seeking: &'static str,
    pub offering: &'static str,
    pub cookie: &'static str,
}

impl ColorTokens {
    pub fn entries(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("background", self.background),
            ("surface", self.surface),
            ("surfaceRaised", self.surface_raised),
            ("primary", self.primary),
            ("primaryHover", self.primary_hover),
            ("secondary", self.secondary),
            ("accent", self.accent),
            ("text", self.text),
            ("textSecondary", self.text_secondary),
            ("textMuted", self.text_muted),
            ("border", self.border),
            ("success", self.success),
            ("warning", self.warning),
            ("danger", self.danger),
            ("overlay", self.overlay),
            ("seeking", self.seeking),
            ("offering", self.offering),
            ("cookie", self.cookie),
        ]
    }
}

pub const LIGHT: ColorTokens = ColorTokens {
    background: "#F8FAFC",
    surface: "#FFFFFF",
    surface_raised: "#F1F5F9",
    primary: "#6366F1",
    primary_hover: "#4F46E5",
    secondary: "#0EA5E9",
    accent: "#F59E0B",
    text: "#0F172A",
    text_secondary: "#334155",
    text_muted: "#64748B",
    border: "#E2E8F0",
    success: "#16A34A",
    warning: "#D97706",
    danger: "#DC2626",
    overlay: "rgba(15, 23, 42, 0.5)",
    seeking: "#F97316",
    offering: "#10B981",
    cookie: "#B45309",
};

pub const DARK: ColorTokens = ColorTokens {
    background: "#0B1120",
    surface: "#111827",
    surface_raised: "#1F2937",
    primary: "#818CF8",
    primary_hover: "#A5B4FC",
    secondary: "#38BDF8",
    accent: "#FBBF24",
    text: "#F8FAFC",
    text_secondary: "#CBD5E1",
    text_muted: "#94A3B8",
    border: "#334155",
    success: "#4ADE80",
    warning: "#FBBF24",
    danger: "#F87171",
    overlay: "rgba(0, 0, 0, 0.6)",
    seeking: "#FB923C",
    offering: "#34D399",
    cookie: "#F59E0B",
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Spacing {
    pub xs: &'static str,
    pub sm: &'static str,
    pub md: &'static str,
    pub lg: &'static str,
    pub xl: &'static str,
    pub xxl: &'static str,
}

pub const SPACING: Spacing = Spacing {
    xs: "4px",
    sm: "8px",
    md: "16px",
    lg: "24px",
    xl: "32px",
    xxl: "48px",
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Radius {
    pub sm: &'static str,
    pub md: &'static str,
    pub lg: &'static str,
    pub full: &'static str,
}

pub const RADIUS: Radius = Radius {
    sm: "6px",
    md: "12px",
    lg: "20px",
    full: "9999px",
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Shadows {
    pub sm: &'static str,
    pub md: &'static str,
    pub lg: &'static str,
}

pub const SHADOWS: Shadows = Shadows {
    sm: "0 1px 2px rgba(0, 0, 0, 0.05)",
    md: "0 4px 12px rgba(0, 0, 0, 0.10)",
    lg: "0 12px 32px rgba(0, 0, 0, 0.18)",
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Transitions {
    pub fast: &'static str,
    pub normal: &'static str,
    pub slow: &'static str,
}

pub const TRANSITIONS: Transitions = Transitions {
    fast: "150ms",
    normal: "250ms",
    slow: "400ms",
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Theme {
    pub variant: Variant,
    pub colors: ColorTokens,
    pub spacing: Spacing,
    pub radius: Radius,
    pub shadow: Shadows,
    pub transition: Transitions,
}

pub fn theme(variant: Variant) -> Theme {
    let colors = match variant {
        Variant::Light => LIGHT,
        Variant::Dark => DARK,
    };
    Theme {
        variant,
        colors,
        spacing: SPACING,
        radius: RADIUS,
        shadow: SHADOWS,
        transition: TRANSITIONS,
    }
}

fn check(
    re: &Regex,
    kind: &'static str,
    entries: &[(&'static str, &'static str)],
) -> Result<(), TokenError> {
    match entries.iter().find(|(_, value)| !re.is_match(value)) {
        Some(&(key, value)) => Err(TokenError::Invalid { kind, key, value }),
        None => Ok(()),
    }
}

/// Check that every token is a well-formed color, length or duration.
pub fn validate(theme: &Theme) -> Result<(), TokenError> {
    check(&COLOR_RE, "color", &theme.colors.entries())?;
    let s = &theme.spacing;
    check(
        &LENGTH_RE,
        "spacing",
        &[("xs", s.xs), ("sm", s.sm), ("md", s.md), ("lg", s.lg), ("xl", s.xl), ("xxl", s.xxl)],
    )?;
    let r = &theme.radius;
    check(
        &LENGTH_RE,
        "radius",
        &[("sm", r.sm), ("md", r.md), ("lg", r.lg), ("full", r.full)],
    )?;
    let t = &theme.transition;
    check(
        &DURATION_RE,
        "transition",
        &[("fast", t.fast), ("normal", t.normal), ("slow", t.slow)],
    )?;
    let sh = &theme.shadow;
    for (key, value) in [("sm", sh.sm), ("md", sh.md), ("lg", sh.lg)] {
        if !value.contains("px") {
            return Err(TokenError::Invalid {
                kind: "shadow",
                key,
                value,
            });
        }
    }
    Ok(())
}
