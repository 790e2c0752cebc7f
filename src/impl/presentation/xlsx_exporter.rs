use fractic_server_error::ServerError;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, XlsxError};

use crate::{entities::LocationAllocation, errors::ExportFailed};

use super::csv_exporter::EXPORT_HEADER;

const SHEET_NAME: &str = "Allocations";
const COLUMN_WIDTHS: [f64; 6] = [12.0, 28.0, 16.0, 40.0, 10.0, 16.0];

pub(crate) struct XlsxExporter;

impl XlsxExporter {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Builds the workbook in memory; the caller decides where it goes.
    pub(crate) fn export(&self, locations: &[LocationAllocation]) -> Result<Vec<u8>, ServerError> {
        self.build(locations)
            .map_err(|e| ExportFailed::with_debug("XLSX", &e))
    }

    fn build(&self, locations: &[LocationAllocation]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0xD9D9D9))
            .set_border(FormatBorder::Thin);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;
        for (col, (title, width)) in EXPORT_HEADER.iter().zip(COLUMN_WIDTHS).enumerate() {
            worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
            worksheet.set_column_width(col as u16, width)?;
        }

        let mut row: u32 = 1;
        for location in locations {
            for item in &location.items {
                worksheet.write_string(row, 0, &location.location)?;
                worksheet.write_string(row, 1, location.location_name.as_deref().unwrap_or(""))?;
                worksheet.write_string(row, 2, &item.item_number)?;
                worksheet.write_string(row, 3, &item.description)?;
                worksheet.write_number(row, 4, item.quantity)?;
                worksheet.write_string(row, 5, &item.sku)?;
                row += 1;
            }
        }
        worksheet.set_freeze_panes(1, 0)?;

        workbook.save_to_buffer()
    }
}

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader as _, Xlsx};

    use super::*;
    use crate::entities::ItemAllocation;

    #[test]
    fn test_export_is_readable_workbook() {
        let mut location = LocationAllocation::new("101", Some("Main".into()));
        location.items.push(ItemAllocation::new("I100", "Widget", "0001", 7));
        let bytes = XlsxExporter::new().export(&[location]).unwrap();

        let mut workbook: Xlsx<_> = Xlsx::new(std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(workbook.sheet_names(), vec![SHEET_NAME.to_string()]);
        let range = workbook.worksheet_range(SHEET_NAME).unwrap();
        assert_eq!(range.get((0, 2)), Some(&Data::String("Item Number".into())));
        assert_eq!(range.get((1, 4)), Some(&Data::Float(7.0)));
    }
}
