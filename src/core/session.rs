use crate::config::LabConfig;
use crate::core::chemistry;
use crate::domain::events::{CommandResult, LabEvent, Rejection};
use crate::domain::model::{Burette, IndicatorColor, Readouts, Vessel, VesselKind};

/// Below this much titrant the burette counts as empty.
const EMPTY_EPSILON_ML: f64 = 1e-9;

/// Identifies one opening of the burette valve. Ticks carrying a token from
/// an earlier opening are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DripToken(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    Dripped { added_ml: f64 },
    /// The burette ran dry on this tick and the valve closed itself.
    Emptied { added_ml: f64 },
    /// Stale token, closed valve or no burette. Nothing changed.
    Ignored,
}

/// State of one experiment run, from the first placement until reset.
#[derive(Debug, Clone)]
pub struct TitrationSession {
    config: LabConfig,
    vessel: Option<Vessel>,
    burette: Option<Burette>,
    drip_ticks: u64,
    partial_drip_ml: f64,
    drip_epoch: u64,
    active_drip: Option<DripToken>,
}

impl TitrationSession {
    pub fn new(config: LabConfig) -> Self {
        Self {
            config,
            vessel: None,
            burette: None,
            drip_ticks: 0,
            partial_drip_ml: 0.0,
            drip_epoch: 0,
            active_drip: None,
        }
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn vessel(&self) -> Option<&Vessel> {
        self.vessel.as_ref()
    }

    pub fn burette(&self) -> Option<&Burette> {
        self.burette.as_ref()
    }

    pub fn valve_open(&self) -> bool {
        self.burette.as_ref().is_some_and(|b| b.is_open)
    }

    pub fn place_vessel(&mut self, kind: VesselKind) -> CommandResult {
        if self.vessel.is_some() {
            return Err(match kind {
                VesselKind::Flask => Rejection::VesselAlreadyPlaced,
                VesselKind::Beaker => Rejection::BenchOccupied,
            });
        }
        self.vessel = Some(Vessel::new(kind));
        Ok(LabEvent::VesselPlaced(kind))
    }

    pub fn place_burette(&mut self) -> CommandResult {
        if self.vessel.is_none() {
            return Err(Rejection::VesselRequired);
        }
        if self.burette.is_some() {
            return Err(Rejection::BuretteAlreadyFitted);
        }
        self.burette = Some(Burette::filled(self.config.drip.burette_capacity_ml));
        Ok(LabEvent::BuretteFitted)
    }

    pub fn add_sample(&mut self) -> CommandResult {
        let volume_ml = self.config.reagents.sample_volume_ml;
        let vessel = self.vessel.as_mut().ok_or(Rejection::VesselRequired)?;
        if vessel.has_sample {
            return Err(Rejection::SampleAlreadyAdded);
        }
        vessel.has_sample = true;
        vessel.liquid_volume_ml += volume_ml;
        Ok(LabEvent::SampleAdded { volume_ml })
    }

    pub fn add_indicator(&mut self) -> CommandResult {
        let vessel = self.vessel.as_mut().ok_or(Rejection::VesselRequired)?;
        if !vessel.has_sample {
            return Err(Rejection::SampleRequired);
        }
        if vessel.has_indicator {
            return Err(Rejection::IndicatorAlreadyAdded);
        }
        vessel.has_indicator = true;
        Ok(LabEvent::IndicatorAdded)
    }

    /// Opens the valve and hands out the token the drip process must present
    /// on every tick.
    pub fn open_valve(&mut self) -> Result<DripToken, Rejection> {
        let remaining = self.remaining_titrant_ml();
        let has_sample = self.vessel.as_ref().is_some_and(|v| v.has_sample);
        let burette = self.burette.as_mut().ok_or(Rejection::BuretteRequired)?;
        if burette.is_open {
            return Err(Rejection::ValveAlreadyOpen);
        }
        if !has_sample {
            return Err(Rejection::SampleRequired);
        }
        if remaining.is_some_and(|ml| ml <= EMPTY_EPSILON_ML) {
            return Err(Rejection::BuretteEmpty);
        }

        burette.is_open = true;
        self.drip_epoch += 1;
        let token = DripToken(self.drip_epoch);
        self.active_drip = Some(token);
        Ok(token)
    }

    pub fn close_valve(&mut self) -> CommandResult {
        let burette = self.burette.as_mut().ok_or(Rejection::BuretteRequired)?;
        if !burette.is_open {
            return Err(Rejection::ValveAlreadyClosed);
        }
        burette.is_open = false;
        self.active_drip = None;
        Ok(LabEvent::ValveClosed)
    }

    /// One drip of titrant. Only the token returned by the latest
    /// [`open_valve`](Self::open_valve) can change state, and only while the
    /// valve is still open.
    pub fn drip_tick(&mut self, token: DripToken) -> TickOutcome {
        if self.active_drip != Some(token) || !self.valve_open() {
            return TickOutcome::Ignored;
        }

        let increment = self.config.drip.increment_ml;
        let remaining = self.remaining_titrant_ml().unwrap_or(0.0);

        if remaining > increment + EMPTY_EPSILON_ML {
            self.drip_ticks += 1;
            return TickOutcome::Dripped {
                added_ml: increment,
            };
        }

        let added_ml = remaining.max(0.0);
        self.partial_drip_ml += added_ml;
        if let Some(burette) = self.burette.as_mut() {
            burette.is_open = false;
        }
        self.active_drip = None;
        TickOutcome::Emptied { added_ml }
    }

    pub fn reset(&mut self) -> LabEvent {
        self.vessel = None;
        self.burette = None;
        self.drip_ticks = 0;
        self.partial_drip_ml = 0.0;
        self.active_drip = None;
        LabEvent::Reset
    }

    pub fn total_titrant_ml(&self) -> f64 {
        // tick count times increment so 100 x 0.1 mL is exactly 10 mL
        self.drip_ticks as f64 * self.config.drip.increment_ml + self.partial_drip_ml
    }

    pub fn remaining_titrant_ml(&self) -> Option<f64> {
        self.burette
            .as_ref()
            .map(|b| b.capacity_ml - self.total_titrant_ml())
    }

    pub fn current_ph(&self) -> Option<f64> {
        let vessel = self.vessel.as_ref()?;
        if !vessel.has_sample {
            return None;
        }
        Some(chemistry::compute_ph(
            &self.config.reagents,
            self.total_titrant_ml(),
        ))
    }

    pub fn indicator_color(&self) -> Option<IndicatorColor> {
        let vessel = self.vessel.as_ref()?;
        if !vessel.has_indicator {
            return None;
        }
        let ph = self.current_ph()?;
        Some(chemistry::indicator_color(
            ph,
            self.config.reagents.indicator_transition_ph,
        ))
    }

    pub fn liquid_level_percent(&self) -> Option<f64> {
        let vessel = self.vessel.as_ref()?;
        Some(chemistry::liquid_level_percent(
            &self.config.vessel,
            vessel.liquid_volume_ml + self.total_titrant_ml(),
        ))
    }

    pub fn readouts(&self) -> Readouts {
        Readouts {
            volume_added_ml: self.total_titrant_ml(),
            ph: self.current_ph(),
            indicator_color: self.indicator_color(),
            liquid_level_percent: self.liquid_level_percent(),
            valve_open: self.valve_open(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_sample() -> TitrationSession {
        let mut session = TitrationSession::new(LabConfig::default());
        session.place_vessel(VesselKind::Flask).unwrap();
        session.add_sample().unwrap();
        session
    }

    fn open_burette(session: &mut TitrationSession) -> DripToken {
        session.place_burette().unwrap();
        session.open_valve().unwrap()
    }

    #[test]
    fn test_second_vessel_rejected() {
        let mut session = TitrationSession::new(LabConfig::default());
        assert_eq!(
            session.place_vessel(VesselKind::Beaker),
            Ok(LabEvent::VesselPlaced(VesselKind::Beaker))
        );
        assert_eq!(
            session.place_vessel(VesselKind::Flask),
            Err(Rejection::VesselAlreadyPlaced)
        );
        assert_eq!(
            session.place_vessel(VesselKind::Beaker),
            Err(Rejection::BenchOccupied)
        );
        assert_eq!(session.vessel().unwrap().kind, VesselKind::Beaker);
    }

    #[test]
    fn test_burette_needs_vessel() {
        let mut session = TitrationSession::new(LabConfig::default());
        assert_eq!(session.place_burette(), Err(Rejection::VesselRequired));
        session.place_vessel(VesselKind::Flask).unwrap();
        assert_eq!(session.place_burette(), Ok(LabEvent::BuretteFitted));
        assert_eq!(session.place_burette(), Err(Rejection::BuretteAlreadyFitted));
    }

    #[test]
    fn test_sample_added_once() {
        let mut session = TitrationSession::new(LabConfig::default());
        assert_eq!(session.add_sample(), Err(Rejection::VesselRequired));

        session.place_vessel(VesselKind::Flask).unwrap();
        assert_eq!(
            session.add_sample(),
            Ok(LabEvent::SampleAdded { volume_ml: 10.0 })
        );
        assert_eq!(session.add_sample(), Err(Rejection::SampleAlreadyAdded));
        assert_eq!(session.vessel().unwrap().liquid_volume_ml, 10.0);
    }

    #[test]
    fn test_indicator_ordering() {
        let mut session = TitrationSession::new(LabConfig::default());
        assert_eq!(session.add_indicator(), Err(Rejection::VesselRequired));
        session.place_vessel(VesselKind::Flask).unwrap();
        assert_eq!(session.add_indicator(), Err(Rejection::SampleRequired));
        session.add_sample().unwrap();
        assert_eq!(session.add_indicator(), Ok(LabEvent::IndicatorAdded));
        assert_eq!(session.add_indicator(), Err(Rejection::IndicatorAlreadyAdded));
    }

    #[test]
    fn test_valve_requires_sample() {
        let mut session = TitrationSession::new(LabConfig::default());
        session.place_vessel(VesselKind::Flask).unwrap();
        assert_eq!(session.open_valve(), Err(Rejection::BuretteRequired));
        session.place_burette().unwrap();
        assert_eq!(session.open_valve(), Err(Rejection::SampleRequired));
        assert!(!session.valve_open());
    }

    #[test]
    fn test_hundred_ticks_reach_equivalence_exactly() {
        let mut session = session_with_sample();
        let token = open_burette(&mut session);
        for _ in 0..100 {
            assert!(matches!(
                session.drip_tick(token),
                TickOutcome::Dripped { .. }
            ));
        }
        assert_eq!(session.total_titrant_ml(), 10.0);
        assert_eq!(session.current_ph(), Some(7.0));
    }

    #[test]
    fn test_closed_valve_ignores_ticks() {
        let mut session = session_with_sample();
        let token = open_burette(&mut session);
        session.drip_tick(token);
        session.close_valve().unwrap();

        assert_eq!(session.drip_tick(token), TickOutcome::Ignored);
        assert_eq!(session.total_titrant_ml(), 0.1);
        assert_eq!(session.close_valve(), Err(Rejection::ValveAlreadyClosed));
    }

    #[test]
    fn test_stale_token_ignored_after_reopen() {
        let mut session = session_with_sample();
        let first = open_burette(&mut session);
        session.close_valve().unwrap();
        let second = session.open_valve().unwrap();

        assert_eq!(session.drip_tick(first), TickOutcome::Ignored);
        assert!(matches!(
            session.drip_tick(second),
            TickOutcome::Dripped { .. }
        ));
        assert_eq!(session.total_titrant_ml(), 0.1);
    }

    #[test]
    fn test_burette_runs_dry() {
        let mut config = LabConfig::default();
        config.drip.burette_capacity_ml = 0.25;
        let mut session = TitrationSession::new(config);
        session.place_vessel(VesselKind::Flask).unwrap();
        session.add_sample().unwrap();
        let token = open_burette(&mut session);

        assert!(matches!(session.drip_tick(token), TickOutcome::Dripped { .. }));
        assert!(matches!(session.drip_tick(token), TickOutcome::Dripped { .. }));
        match session.drip_tick(token) {
            TickOutcome::Emptied { added_ml } => assert!((added_ml - 0.05).abs() < 1e-9),
            other => panic!("expected empty burette, got {:?}", other),
        }
        assert!(!session.valve_open());
        assert!((session.total_titrant_ml() - 0.25).abs() < 1e-9);
        assert_eq!(session.open_valve(), Err(Rejection::BuretteEmpty));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = session_with_sample();
        let token = open_burette(&mut session);
        session.drip_tick(token);

        assert_eq!(session.reset(), LabEvent::Reset);
        assert!(session.vessel().is_none());
        assert!(session.burette().is_none());
        assert_eq!(session.total_titrant_ml(), 0.0);
        assert_eq!(session.current_ph(), None);
        assert_eq!(session.drip_tick(token), TickOutcome::Ignored);
        assert_eq!(session.readouts(), Readouts::default());
    }

    #[test]
    fn test_indicator_color_needs_indicator() {
        let mut session = session_with_sample();
        assert_eq!(session.indicator_color(), None);
        session.add_indicator().unwrap();
        assert_eq!(session.indicator_color(), Some(IndicatorColor::Clear));
    }

    #[test]
    fn test_liquid_level_tracks_sample_and_titrant() {
        let mut session = TitrationSession::new(LabConfig::default());
        assert_eq!(session.liquid_level_percent(), None);
        session.place_vessel(VesselKind::Flask).unwrap();
        assert_eq!(session.liquid_level_percent(), Some(0.0));
        session.add_sample().unwrap();
        let token = open_burette(&mut session);
        for _ in 0..10 {
            session.drip_tick(token);
        }
        let level = session.liquid_level_percent().unwrap();
        assert!((level - 22.0).abs() < 1e-9);
    }
}
