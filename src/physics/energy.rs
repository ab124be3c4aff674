//! Energy history samples and conservation statistics.

use crate::physics::math::Scalar;
use crate::physics::snapshot::WorldSnapshot;
use serde::{Deserialize, Serialize};

/// One historical energy measurement.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergySample {
    pub time: Scalar,
    pub kinetic: Scalar,
    pub potential: Scalar,
    pub mechanical: Scalar,
}

impl EnergySample {
    /// Reads the aggregate totals carried by a snapshot.
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Self {
        Self {
            time: snapshot.time,
            kinetic: snapshot.totals.kinetic_energy,
            potential: snapshot.totals.potential_energy,
            mechanical: snapshot.totals.mechanical_energy,
        }
    }

    /// Largest of the three energies in this sample.
    pub fn peak(&self) -> Scalar {
        self.kinetic.max(self.potential).max(self.mechanical)
    }
}

/// Append-only energy history.
///
/// Owned by whatever drives the simulation; the renderers only ever read the
/// samples through [`EnergyHistory::samples`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EnergyHistory {
    samples: Vec<EnergySample>,
}

impl EnergyHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: EnergySample) {
        self.samples.push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn samples(&self) -> &[EnergySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn statistics(&self) -> Option<EnergyStatistics> {
        EnergyStatistics::from_samples(&self.samples)
    }
}

impl From<Vec<EnergySample>> for EnergyHistory {
    fn from(samples: Vec<EnergySample>) -> Self {
        Self { samples }
    }
}

/// Summary of how well mechanical energy was conserved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergyStatistics {
    /// Mechanical energy of the first sample
    pub initial_energy: Scalar,
    /// Initial minus latest mechanical energy
    pub energy_loss: Scalar,
    /// 100 when the initial energy is not positive
    pub conservation_percentage: Scalar,
}

impl EnergyStatistics {
    /// `None` for an empty history.
    pub fn from_samples(samples: &[EnergySample]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let initial_energy = first.mechanical;
        let energy_loss = initial_energy - last.mechanical;
        let conservation_percentage = if initial_energy <= 0.0 {
            100.0
        } else {
            (1.0 - energy_loss / initial_energy) * 100.0
        };

        Some(Self {
            initial_energy,
            energy_loss,
            conservation_percentage,
        })
    }
}
