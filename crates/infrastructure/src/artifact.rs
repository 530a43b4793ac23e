//! Xlsx report artifact writer.
//!
//! Fills the fixed nine-column basic-report layout: header in row 1, data
//! rows from row 2. The column set is a business contract shared with the
//! operations team's template and must not be derived from the data.

use field_analytics_application::{ReportArtifact, ReportRow, REPORT_COLUMNS};
use field_analytics_domain::{AnalyticsError, AnalyticsResult};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Renders report rows into an xlsx workbook.
#[derive(Debug, Default)]
pub struct XlsxReportWriter;

impl XlsxReportWriter {
    pub fn new() -> Self {
        Self
    }

    fn write(rows: &[ReportRow]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Report")?;

        let header = Format::new().set_bold();
        for (column, title) in REPORT_COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, column as u16, *title, &header)?;
        }

        for (index, row) in rows.iter().enumerate() {
            let r = (index + 1) as u32;
            worksheet.write_number(r, 0, row.number as f64)?;
            worksheet.write_string(r, 1, &row.address)?;
            worksheet.write_string(r, 2, &row.subscriber_name)?;
            worksheet.write_string(r, 3, &row.account_number)?;
            worksheet.write_string(r, 4, &row.started_at)?;
            worksheet.write_string(r, 5, &row.finished_at)?;
            worksheet.write_string(r, 6, &row.work_type)?;
            worksheet.write_string(r, 7, &row.work_result)?;
            worksheet.write_string(r, 8, &row.inspectors)?;
        }

        workbook.save_to_buffer()
    }
}

impl ReportArtifact for XlsxReportWriter {
    fn render(&self, rows: &[ReportRow]) -> AnalyticsResult<Vec<u8>> {
        Self::write(rows).map_err(|err| AnalyticsError::Artifact(err.to_string()))
    }
}
