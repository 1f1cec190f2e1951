//! CSV report adapter. Headers follow the JSON field names.

use std::io::Write;

use serde::Serialize;

use crate::domain::daily::DailyRecord;
use crate::domain::error::SimError;
use crate::domain::simulation::SimulationStepRecord;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

fn report_error(e: csv::Error) -> SimError {
    SimError::Report {
        reason: format!("CSV write error: {}", e),
    }
}

const DAILY_HEADERS: [&str; 10] = [
    "date",
    "holdingQuantity",
    "holdingAvgPrice",
    "buyQuantity",
    "buyPrice",
    "sellQuantity",
    "sellPrice",
    "totalCost",
    "totalValue",
    "closePrice",
];

const STEP_HEADERS: [&str; 9] = [
    "datetime",
    "holdingQuantity",
    "holdingAvgPrice",
    "buyQuantity",
    "buyPrice",
    "sellQuantity",
    "sellPrice",
    "totalCost",
    "totalValue",
];

/// The csv writer only emits a header with the first record, so an empty report
/// gets `headers` written directly.
fn write_csv<T: Serialize>(
    records: &[T],
    headers: &[&str],
    out: &mut dyn Write,
) -> Result<(), SimError> {
    let mut writer = csv::Writer::from_writer(out);
    if records.is_empty() {
        writer.write_record(headers).map_err(report_error)?;
    }
    for record in records {
        writer.serialize(record).map_err(report_error)?;
    }
    writer.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write_daily(&self, records: &[DailyRecord], out: &mut dyn Write) -> Result<(), SimError> {
        write_csv(records, &DAILY_HEADERS, out)
    }

    fn write_steps(
        &self,
        records: &[SimulationStepRecord],
        out: &mut dyn Write,
    ) -> Result<(), SimError> {
        write_csv(records, &STEP_HEADERS, out)
    }
}
