use fractic_server_error::ServerError;
use regex::Regex;

use crate::entities::AllocationEntry;

use super::quantity_model::QuantityModel;

/// Column positions of an entry sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnLayoutModel {
    pub store: Option<usize>,
    pub store_name: Option<usize>,
    pub item: usize,
    pub description: Option<usize>,
    /// `None` only for single-column item lists, where every row counts as one
    /// unit.
    pub quantity: Option<usize>,
    pub sku: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Store,
    StoreName,
    Item,
    Description,
    Quantity,
    Sku,
}

impl ColumnLayoutModel {
    /// Returns the layout and whether `first_row` is a header row.
    pub(crate) fn detect(first_row: &[&str]) -> (Self, bool) {
        match Self::from_header(first_row) {
            Some(layout) => (layout, true),
            None => (Self::from_column_count(first_row.len()), false),
        }
    }

    /// Converts raw sheet rows (1-based row number, cells) into entries. Blank
    /// rows and rows without an item number or quantity are skipped; an
    /// optional header row is detected from the first non-blank row.
    pub(crate) fn parse_rows(
        rows: Vec<(usize, Vec<String>)>,
    ) -> Result<Vec<AllocationEntry>, ServerError> {
        let mut rows = rows
            .into_iter()
            .filter(|(_, cells)| cells.iter().any(|c| !c.trim().is_empty()))
            .peekable();
        let (layout, has_header) = match rows.peek() {
            Some((_, first)) => {
                let cells: Vec<&str> = first.iter().map(String::as_str).collect();
                Self::detect(&cells)
            }
            None => return Ok(Vec::new()),
        };
        if has_header {
            rows.next();
        }
        rows.map(|(row, cells)| layout.entry(row, &cells))
            .filter_map(Result::transpose)
            .collect()
    }

    fn entry(&self, row: usize, cells: &[String]) -> Result<Option<AllocationEntry>, ServerError> {
        let get = |idx: Option<usize>| {
            idx.and_then(|i| cells.get(i))
                .map(|c| c.trim())
                .unwrap_or("")
        };
        let optional = |idx: Option<usize>| Some(get(idx)).filter(|s| !s.is_empty()).map(String::from);

        let item_number = get(Some(self.item));
        if item_number.is_empty() {
            return Ok(None);
        }
        let quantity: u32 = match self.quantity {
            Some(_) => QuantityModel::parse(get(self.quantity), row)?.into(),
            None => 1,
        };
        if quantity == 0 {
            return Ok(None);
        }
        Ok(Some(AllocationEntry {
            store_id: optional(self.store),
            store_name: optional(self.store_name),
            item_number: item_number.to_string(),
            description: get(self.description).to_string(),
            sku: get(self.sku).to_string(),
            quantity,
        }))
    }

    fn from_header(row: &[&str]) -> Option<Self> {
        let strip = Regex::new(r"[^a-z0-9]").expect("hardcoded regex should be valid");
        let mut fields: Vec<(Field, usize)> = Vec::new();
        for (idx, cell) in row.iter().enumerate() {
            let normalized = strip.replace_all(&cell.to_lowercase(), "").into_owned();
            if let Some(field) = field_for_header(&normalized) {
                if !fields.iter().any(|(f, _)| *f == field) {
                    fields.push((field, idx));
                }
            }
        }
        let find = |field: Field| fields.iter().find(|(f, _)| *f == field).map(|(_, i)| *i);
        let item = find(Field::Item)?;
        if fields.len() < 2 {
            return None;
        }
        Some(Self {
            store: find(Field::Store),
            store_name: find(Field::StoreName),
            item,
            description: find(Field::Description),
            quantity: find(Field::Quantity),
            sku: find(Field::Sku),
        })
    }

    fn from_column_count(count: usize) -> Self {
        let layout = |store, store_name, item, description, quantity, sku| Self {
            store,
            store_name,
            item,
            description,
            quantity,
            sku,
        };
        match count {
            0 | 1 => layout(None, None, 0, None, None, None),
            2 => layout(None, None, 0, None, Some(1), None),
            3 => layout(Some(0), None, 1, None, Some(2), None),
            4 => layout(Some(0), None, 1, Some(2), Some(3), None),
            5 => layout(Some(0), Some(1), 2, Some(3), Some(4), None),
            _ => layout(Some(0), Some(1), 2, Some(3), Some(4), Some(5)),
        }
    }
}

fn field_for_header(normalized: &str) -> Option<Field> {
    match normalized {
        "location" | "locationcode" | "locationid" | "store" | "storecode" | "storeid"
        | "storenumber" | "storeno" | "site" => Some(Field::Store),
        "locationname" | "storename" | "sitename" => Some(Field::StoreName),
        "itemnumber" | "item" | "itemno" | "itemcode" | "itemid" | "product"
        | "productnumber" => Some(Field::Item),
        "description" | "desc" | "itemdescription" | "productdescription" => {
            Some(Field::Description)
        }
        "quantity" | "qty" | "allocated" | "allocation" | "units" | "count" => {
            Some(Field::Quantity)
        }
        "sku" | "upc" | "barcode" => Some(Field::Sku),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<(usize, Vec<String>)> {
        lines
            .iter()
            .enumerate()
            .map(|(i, cells)| (i + 1, cells.iter().map(|c| c.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_parse_rows_with_header_skips_blank_and_zero_rows() {
        let entries = ColumnLayoutModel::parse_rows(rows(&[
            &["Store", "Item", "Qty"],
            &["", "", ""],
            &["S1", "I100", "5"],
            &["S1", "", "2"],
            &["S2", "I200", "0"],
            &["", "I300", "1,000"],
        ]))
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], AllocationEntry::new(Some("S1"), "I100", 5));
        assert_eq!(entries[1], AllocationEntry::new(None, "I300", 1000));
    }

    #[test]
    fn test_parse_rows_reports_bad_quantity() {
        let result = ColumnLayoutModel::parse_rows(rows(&[&["I100", "5"], &["I200", "lots"]]));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_column_counts_one_per_row() {
        let entries = ColumnLayoutModel::parse_rows(rows(&[&["I100"], &["I100"]])).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.quantity == 1));
    }

    #[test]
    fn test_export_header_is_detected() {
        let (layout, header) = ColumnLayoutModel::detect(&[
            "Location",
            "Location Name",
            "Item Number",
            "Description",
            "Quantity",
            "SKU",
        ]);
        assert!(header);
        assert_eq!(layout, ColumnLayoutModel::from_column_count(6));
    }

    #[test]
    fn test_reordered_header_with_aliases() {
        let (layout, header) = ColumnLayoutModel::detect(&["Qty", "Item #", "Store No."]);
        assert!(header);
        assert_eq!(layout.quantity, Some(0));
        assert_eq!(layout.item, 1);
        assert_eq!(layout.store, Some(2));
        assert_eq!(layout.description, None);
    }

    #[test]
    fn test_headerless_rows_fall_back_to_column_count() {
        let (layout, header) = ColumnLayoutModel::detect(&["I100", "5"]);
        assert!(!header);
        assert_eq!(layout.item, 0);
        assert_eq!(layout.quantity, Some(1));
        assert_eq!(layout.store, None);

        let (layout, _) = ColumnLayoutModel::detect(&["S1", "I100", "5"]);
        assert_eq!(layout.store, Some(0));
    }
}
