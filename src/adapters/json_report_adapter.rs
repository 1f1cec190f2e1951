//! JSON report adapter: one pretty-printed array of records.

use std::io::Write;

use serde::Serialize;

use crate::domain::daily::DailyRecord;
use crate::domain::error::SimError;
use crate::domain::simulation::SimulationStepRecord;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

fn write_json<T: Serialize>(records: &[T], out: &mut dyn Write) -> Result<(), SimError> {
    serde_json::to_writer_pretty(&mut *out, records).map_err(|e| SimError::Report {
        reason: format!("JSON encode error: {}", e),
    })?;
    writeln!(out)?;
    Ok(())
}

impl ReportPort for JsonReportAdapter {
    fn write_daily(&self, records: &[DailyRecord], out: &mut dyn Write) -> Result<(), SimError> {
        write_json(records, out)
    }

    fn write_steps(
        &self,
        records: &[SimulationStepRecord],
        out: &mut dyn Write,
    ) -> Result<(), SimError> {
        write_json(records, out)
    }
}
