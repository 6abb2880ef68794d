//! Strong acid / strong base titration arithmetic.
//!
//! Everything here is a pure function of the reagent parameters and the
//! volume of titrant delivered so far.

use crate::config::{ReagentConfig, VesselConfig};
use crate::domain::model::IndicatorColor;

/// Colour intensity gained per pH unit above the transition point.
const INDICATOR_RAMP_PER_PH: f64 = 2.0;

const NEUTRAL_PH: f64 = 7.0;
const PKW: f64 = 14.0;

fn moles(volume_ml: f64, concentration_m: f64) -> f64 {
    (volume_ml / 1000.0) * concentration_m
}

/// pH of the sample after `titrant_ml` of base has been added.
///
/// The acid and base moles are compared with exact equality: only a
/// bit-identical match lands on 7, and the curve jumps from the acid branch
/// to 7 to the base branch around the equivalence point. No clamping to
/// [0, 14] is applied.
pub fn compute_ph(reagents: &ReagentConfig, titrant_ml: f64) -> f64 {
    let moles_acid = moles(reagents.sample_volume_ml, reagents.acid_concentration_m);
    let moles_base = moles(titrant_ml, reagents.titrant_concentration_m);
    let total_volume_l = (reagents.sample_volume_ml + titrant_ml) / 1000.0;

    if moles_acid > moles_base {
        let h_conc = (moles_acid - moles_base) / total_volume_l;
        -h_conc.log10()
    } else if moles_base > moles_acid {
        let oh_conc = (moles_base - moles_acid) / total_volume_l;
        let poh = -oh_conc.log10();
        PKW - poh
    } else {
        NEUTRAL_PH
    }
}

/// Phenolphthalein colour at `ph`.
///
/// A linear opacity ramp, not a spectroscopic model: clear below the
/// transition, then pink saturating half a pH unit above it.
pub fn indicator_color(ph: f64, transition_ph: f64) -> IndicatorColor {
    if ph < transition_ph {
        IndicatorColor::Clear
    } else {
        let intensity = ((ph - transition_ph) * INDICATOR_RAMP_PER_PH).clamp(0.0, 1.0);
        IndicatorColor::Pink { intensity }
    }
}

pub fn liquid_level_percent(vessel: &VesselConfig, volume_ml: f64) -> f64 {
    (volume_ml * vessel.level_percent_per_ml).min(vessel.max_level_percent)
}
