//! Static facility topology: rooms, their detectors and screen layout.
//!
//! Detector IDs map to a room and a gas through an explicit table. An ID
//! that is not in the table is an error; nothing is inferred from the text
//! of the ID.

use serde::Serialize;

use crate::error::{HazardError, HazardResult};
use crate::model::GasKind;

/// Position of a room on the facility overview, in percent of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A fixed gas detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detector {
    pub id: String,
    pub gas: GasKind,
}

/// A room and everything mounted in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub name: String,
    pub rect: RoomRect,
    pub detectors: Vec<Detector>,
}

impl Room {
    /// Gas of the first detector; used when a spike is raised for the room
    /// without naming a gas.
    pub fn primary_gas(&self) -> Option<GasKind> {
        self.detectors.first().map(|d| d.gas)
    }

    pub fn monitors(&self, gas: GasKind) -> bool {
        self.detectors.iter().any(|d| d.gas == gas)
    }
}

/// The whole facility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityModel {
    rooms: Vec<Room>,
}

impl FacilityModel {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room(&self, name: &str) -> HazardResult<&Room> {
        self.rooms
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| HazardError::UnknownLocation(name.to_string()))
    }

    /// Resolve a detector ID to its room and gas.
    pub fn detector(&self, id: &str) -> HazardResult<(&Room, &Detector)> {
        self.rooms
            .iter()
            .find_map(|room| {
                room.detectors
                    .iter()
                    .find(|d| d.id == id)
                    .map(|detector| (room, detector))
            })
            .ok_or_else(|| HazardError::UnknownDetector(id.to_string()))
    }

    pub fn gas_for_detector(&self, id: &str) -> HazardResult<GasKind> {
        self.detector(id).map(|(_, detector)| detector.gas)
    }

    /// Work out which gas a spike in `location` should use.
    ///
    /// With no gas given, the room's first detector decides. A named gas must
    /// be monitored in that room.
    pub fn resolve_spike_gas(&self, location: &str, gas: Option<GasKind>) -> HazardResult<GasKind> {
        let room = self.room(location)?;
        let not_monitored = |gas| HazardError::GasNotMonitored {
            gas,
            location: location.to_string(),
        };

        match gas {
            Some(gas) if room.monitors(gas) => Ok(gas),
            Some(gas) => Err(not_monitored(gas)),
            None => room
                .primary_gas()
                .ok_or_else(|| HazardError::UnknownLocation(location.to_string())),
        }
    }

    /// Every gas monitored somewhere in the facility.
    pub fn monitored_gases(&self) -> impl Iterator<Item = GasKind> + '_ {
        self.rooms
            .iter()
            .flat_map(|room| room.detectors.iter().map(|d| d.gas))
    }

    /// Every `(room, detector)` pair, in table order.
    pub fn detectors(&self) -> impl Iterator<Item = (&Room, &Detector)> + '_ {
        self.rooms
            .iter()
            .flat_map(|room| room.detectors.iter().map(move |d| (room, d)))
    }
}

impl Default for FacilityModel {
    /// The demo pharmaceutical plant.
    fn default() -> Self {
        let room = |name: &str, rect: (f64, f64, f64, f64), gases: &[GasKind]| Room {
            name: name.to_string(),
            rect: RoomRect {
                left: rect.0,
                top: rect.1,
                width: rect.2,
                height: rect.3,
            },
            detectors: gases
                .iter()
                .map(|gas| Detector {
                    id: format!("{name}: {gas}"),
                    gas: *gas,
                })
                .collect(),
        };

        Self::new(vec![
            room("Room 1", (6.0, 8.0, 22.0, 20.0), &[GasKind::NH3]),
            room("Room 2", (30.0, 8.0, 22.0, 20.0), &[GasKind::CO]),
            room("Room 3", (54.0, 8.0, 22.0, 20.0), &[GasKind::O2]),
            room("Room 12", (78.0, 8.0, 18.0, 20.0), &[GasKind::Ethanol]),
            room(
                "Production 1",
                (18.0, 40.0, 30.0, 30.0),
                &[GasKind::O2, GasKind::CH4],
            ),
            room(
                "Production 2",
                (52.0, 40.0, 30.0, 30.0),
                &[GasKind::O2, GasKind::H2S],
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let facility = FacilityModel::default();
        assert_eq!(facility.rooms().len(), 6);
        assert_eq!(facility.detectors().count(), 8);

        let room3 = facility.room("Room 3").unwrap();
        assert_eq!(room3.rect.left, 54.0);
        assert_eq!(room3.primary_gas(), Some(GasKind::O2));
    }

    #[test]
    fn test_detector_lookup_is_explicit() {
        let facility = FacilityModel::default();
        assert_eq!(
            facility.gas_for_detector("Production 2: H2S").unwrap(),
            GasKind::H2S
        );
        let (room, _) = facility.detector("Production 1: CH4").unwrap();
        assert_eq!(room.name, "Production 1");

        // no guessing from the label text
        let err = facility.gas_for_detector("Room 9: carbon monoxide").unwrap_err();
        assert_eq!(err, HazardError::UnknownDetector("Room 9: carbon monoxide".into()));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_resolve_spike_gas() {
        let facility = FacilityModel::default();
        assert_eq!(
            facility.resolve_spike_gas("Production 2", None).unwrap(),
            GasKind::O2
        );
        assert_eq!(
            facility
                .resolve_spike_gas("Production 2", Some(GasKind::H2S))
                .unwrap(),
            GasKind::H2S
        );
        assert!(matches!(
            facility.resolve_spike_gas("Room 1", Some(GasKind::CO)),
            Err(HazardError::GasNotMonitored { gas: GasKind::CO, .. })
        ));
        assert!(matches!(
            facility.resolve_spike_gas("Basement", None),
            Err(HazardError::UnknownLocation(_))
        ));
    }

    #[test]
    fn test_monitored_gases_cover_all_kinds() {
        let facility = FacilityModel::default();
        for gas in GasKind::ALL {
            assert!(facility.monitored_gases().any(|g| g == gas), "{gas} not monitored");
        }
    }
}
