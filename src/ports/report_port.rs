//! Report output port.

use std::io::Write;

use crate::domain::daily::DailyRecord;
use crate::domain::error::SimError;
use crate::domain::simulation::SimulationStepRecord;

/// Port for rendering simulation records.
pub trait ReportPort {
    fn write_daily(&self, records: &[DailyRecord], out: &mut dyn Write) -> Result<(), SimError>;

    fn write_steps(
        &self,
        records: &[SimulationStepRecord],
        out: &mut dyn Write,
    ) -> Result<(), SimError>;
}
