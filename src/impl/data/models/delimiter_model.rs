#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DelimiterModel {
    Tab,
    Comma,
    Semicolon,
}

impl DelimiterModel {
    /// Decided by the first non-empty line: tab wins over comma, comma over
    /// semicolon. A single-column paste is treated as tab separated.
    pub(crate) fn sniff(text: &str) -> Self {
        let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        if first.contains('\t') {
            DelimiterModel::Tab
        } else if first.contains(',') {
            DelimiterModel::Comma
        } else if first.contains(';') {
            DelimiterModel::Semicolon
        } else {
            DelimiterModel::Tab
        }
    }

    pub(crate) fn as_byte(&self) -> u8 {
        match self {
            DelimiterModel::Tab => b'\t',
            DelimiterModel::Comma => b',',
            DelimiterModel::Semicolon => b';',
        }
    }
}
