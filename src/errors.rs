use fractic_server_error::{define_client_error, define_internal_error};

// IO-related.
define_client_error!(ReadError, "Error reading file.");
define_client_error!(
    UnsupportedImportFile,
    "Unsupported import file type: '{path}'.",
    { path: &str }
);
define_internal_error!(WriteError, "Error writing file '{path}'.", { path: &str });
define_internal_error!(
    ArchiveDirectoryError,
    "Could not access archive directory '{path}'.",
    { path: &str }
);

// Parsing-related.
define_client_error!(InvalidCsv, "Invalid CSV format.");
define_client_error!(InvalidWorkbook, "Invalid or unreadable workbook.");
define_client_error!(
    InvalidQuantity,
    "Invalid quantity '{value}' on row {row}.",
    { value: &str, row: usize }
);
define_client_error!(
    QuantityOverflow,
    "Combined quantity of item '{item}' at location '{location}' is too large.",
    { item: &str, location: &str }
);
define_client_error!(
    ImportTooLarge,
    "Import payload is too large ({size} bytes, limit is {limit} bytes).",
    { size: usize, limit: usize }
);
define_client_error!(NoEntriesFound, "No allocation entries found in the input.");
define_client_error!(InvalidArchive, "Invalid archive file: '{path}'.", { path: &str });
define_client_error!(InvalidSettings, "Invalid settings file (invalid RON format).");
define_client_error!(
    InvalidDictionary,
    "Invalid {dictionary} dictionary file.",
    { dictionary: &str }
);

// Export-related.
define_internal_error!(ExportFailed, "Failed to build {format} export.", { format: &str });

// Background tasks.
define_internal_error!(
    BackgroundTaskFailed,
    "Background task '{task}' did not complete.",
    { task: &str }
);
define_client_error!(DictionaryLoadCancelled, "Dictionary load was superseded by a newer reload.");
