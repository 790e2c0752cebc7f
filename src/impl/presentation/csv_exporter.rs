use fractic_server_error::ServerError;

use crate::{entities::LocationAllocation, errors::ExportFailed};

pub(crate) const EXPORT_HEADER: [&str; 6] = [
    "Location",
    "Location Name",
    "Item Number",
    "Description",
    "Quantity",
    "SKU",
];

pub(crate) struct CsvExporter;

impl CsvExporter {
    pub(crate) fn new() -> Self {
        Self
    }

    /// One row per location item, in aggregate order.
    pub(crate) fn export(&self, locations: &[LocationAllocation]) -> Result<String, ServerError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(EXPORT_HEADER)
            .map_err(|e| ExportFailed::with_debug("CSV", &e))?;
        for location in locations {
            for item in &location.items {
                writer
                    .write_record([
                        location.location.as_str(),
                        location.location_name.as_deref().unwrap_or(""),
                        item.item_number.as_str(),
                        item.description.as_str(),
                        item.quantity.to_string().as_str(),
                        item.sku.as_str(),
                    ])
                    .map_err(|e| ExportFailed::with_debug("CSV", &e))?;
            }
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExportFailed::with_debug("CSV", e.error()))?;
        String::from_utf8(bytes).map_err(|e| ExportFailed::with_debug("CSV", &e))
    }
}
