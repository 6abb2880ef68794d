use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VesselKind {
    Flask,
    Beaker,
}

impl fmt::Display for VesselKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VesselKind::Flask => write!(f, "Erlenmeyer flask"),
            VesselKind::Beaker => write!(f, "beaker"),
        }
    }
}

/// The flask (or beaker) on the bench.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vessel {
    pub kind: VesselKind,
    pub has_sample: bool,
    pub has_indicator: bool,
    /// Volume added by hand (the sample). Titrant is tracked by the session.
    pub liquid_volume_ml: f64,
}

impl Vessel {
    pub fn new(kind: VesselKind) -> Self {
        Self {
            kind,
            has_sample: false,
            has_indicator: false,
            liquid_volume_ml: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Burette {
    pub is_open: bool,
    pub capacity_ml: f64,
}

impl Burette {
    pub fn filled(capacity_ml: f64) -> Self {
        Self {
            is_open: false,
            capacity_ml,
        }
    }
}

/// Anything that can be dropped onto the bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchItem {
    Flask,
    Beaker,
    Burette,
    Sample,
    Indicator,
}

impl BenchItem {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "flask" => Some(BenchItem::Flask),
            "beaker" => Some(BenchItem::Beaker),
            "burette" => Some(BenchItem::Burette),
            "chem-hcl" | "hcl" | "sample" => Some(BenchItem::Sample),
            "chem-indicator" | "indicator" | "phenolphthalein" => Some(BenchItem::Indicator),
            _ => None,
        }
    }
}

/// Phenolphthalein appearance for the current pH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IndicatorColor {
    Clear,
    /// `intensity` is in [0, 1].
    Pink { intensity: f64 },
}

impl IndicatorColor {
    pub fn rgba(&self) -> (u8, u8, u8, f64) {
        match self {
            IndicatorColor::Clear => (255, 255, 255, 0.5),
            IndicatorColor::Pink { intensity } => (255, 0, 127, 0.2 + intensity * 0.6),
        }
    }

    pub fn css(&self) -> String {
        let (r, g, b, a) = self.rgba();
        format!("rgba({}, {}, {}, {})", r, g, b, a)
    }
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorColor::Clear => write!(f, "clear"),
            IndicatorColor::Pink { intensity } => {
                write!(f, "pink ({:.0}%)", intensity * 100.0)
            }
        }
    }
}

/// Everything the bench display shows, captured at one instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readouts {
    pub volume_added_ml: f64,
    pub ph: Option<f64>,
    pub indicator_color: Option<IndicatorColor>,
    pub liquid_level_percent: Option<f64>,
    pub valve_open: bool,
}

impl Readouts {
    pub fn volume_text(&self) -> String {
        format!("{:.2} mL", self.volume_added_ml)
    }

    pub fn ph_text(&self) -> String {
        match self.ph {
            Some(ph) => format!("{:.2}", ph),
            None => "--".to_string(),
        }
    }
}

impl fmt::Display for Readouts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V(NaOH) = {}  pH = {}", self.volume_text(), self.ph_text())?;
        if let Some(color) = &self.indicator_color {
            write!(f, "  colour = {}", color)?;
        }
        if let Some(level) = self.liquid_level_percent {
            write!(f, "  level = {:.0}%", level)?;
        }
        if self.valve_open {
            write!(f, "  [valve open]")?;
        }
        Ok(())
    }
}
