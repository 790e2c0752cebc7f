// Crate-internal.
// ---

pub(crate) mod data {
    pub(crate) mod datasources {
        pub(crate) mod archive_json_datasource;
        pub(crate) mod dictionary_csv_datasource;
        pub(crate) mod entries_csv_datasource;
        pub(crate) mod entries_xlsx_datasource;
        pub(crate) mod settings_ron_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod archive_model;
        pub(crate) mod column_layout_model;
        pub(crate) mod delimiter_model;
        pub(crate) mod quantity_model;
    }
    pub(crate) mod repositories {
        pub(crate) mod archive_repository_impl;
        pub(crate) mod entries_repository_impl;
    }
}

pub(crate) mod domain {
    pub(crate) mod entities {
        pub(crate) mod allocation_entry;
        pub(crate) mod archive;
        pub(crate) mod dictionary;
        pub(crate) mod handlers;
        pub(crate) mod import_report;
        pub(crate) mod item_allocation;
        pub(crate) mod item_totals;
        pub(crate) mod location_allocation;
        pub(crate) mod settings;
    }
    pub(crate) mod logic {
        pub(crate) mod allocation_aggregate;
        pub(crate) mod import_processor;
        pub(crate) mod search_filter;
        pub(crate) mod totals_processor;
        pub(crate) mod utils;
    }
    pub(crate) mod repositories {
        pub(crate) mod archive_repository;
        pub(crate) mod entries_repository;
    }
    pub(crate) mod services {
        pub(crate) mod dictionary_service;
    }
    pub(crate) mod usecases {
        pub(crate) mod session_usecase;
    }
}

pub(crate) mod presentation {
    pub(crate) mod clipboard_fmt;
    pub(crate) mod csv_exporter;
    pub(crate) mod status_fmt;
    pub(crate) mod xlsx_exporter;
}

// Public exports.
// ---

#[doc(hidden)]
#[allow(unused_imports)]
pub mod exports {
    // This mod represents how clients see the library, and can differ from the
    // internal structure.
    //
    // The contents of this mod are re-exported in the root of the crate.

    pub mod entities {
        pub use crate::domain::entities::allocation_entry::*;
        pub use crate::domain::entities::archive::*;
        pub use crate::domain::entities::dictionary::*;
        pub use crate::domain::entities::handlers::*;
        pub use crate::domain::entities::import_report::*;
        pub use crate::domain::entities::item_allocation::*;
        pub use crate::domain::entities::item_totals::*;
        pub use crate::domain::entities::location_allocation::*;
        pub use crate::domain::entities::settings::*;
    }

    pub mod session {
        pub use crate::domain::logic::allocation_aggregate::{AllocationAggregate, UndoOutcome};
        pub use crate::domain::repositories::archive_repository::ArchiveRepository;
        pub use crate::domain::repositories::entries_repository::EntriesRepository;
        pub use crate::domain::services::dictionary_service::{DictionaryService, DictionarySources};
        pub use crate::domain::usecases::session_usecase::AllocationSession;
    }
}
