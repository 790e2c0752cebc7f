use crate::entities::{ClipboardSeparator, LocationAllocation};

/// Plain-text lines for pasting into spreadsheets or other tools.
pub(crate) struct ClipboardFormatter {
    separator: char,
}

impl ClipboardFormatter {
    pub(crate) fn new(separator: ClipboardSeparator) -> Self {
        Self {
            separator: separator.as_char(),
        }
    }

    /// `ItemNumber<sep>Quantity` per item of the location.
    pub(crate) fn location(&self, location: &LocationAllocation) -> Option<String> {
        self.lines(
            location
                .items
                .iter()
                .map(|i| (i.item_number.as_str(), i.quantity)),
        )
    }

    /// `Location<sep>Quantity` for every location holding the item.
    pub(crate) fn item_redistribution(
        &self,
        locations: &[LocationAllocation],
        item_number: &str,
    ) -> Option<String> {
        self.lines(locations.iter().filter_map(|l| {
            l.item(item_number)
                .map(|i| (l.location.as_str(), i.quantity))
        }))
    }

    fn lines<'a>(&self, rows: impl Iterator<Item = (&'a str, u32)>) -> Option<String> {
        let lines: Vec<String> = rows
            .map(|(code, qty)| format!("{}{}{}", code, self.separator, qty))
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}
