use num_format::{Locale, ToFormattedString as _};

use crate::{
    domain::logic::allocation_aggregate::{AllocationAggregate, UndoOutcome},
    entities::ImportSummary,
};

fn units(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

pub(crate) fn import_status(summary: &ImportSummary) -> String {
    format!(
        "Imported {} unit(s) across {} location(s) from {} row(s).",
        units(summary.units),
        summary.locations,
        summary.entries.to_formatted_string(&Locale::en)
    )
}

pub(crate) fn undo_status(outcome: &UndoOutcome) -> String {
    if outcome.restored == outcome.requested {
        format!(
            "Restored {} unit(s) to {}.",
            units(outcome.restored),
            outcome.location
        )
    } else {
        format!(
            "Restored {} of {} unit(s) to {}; the rest were no longer in the pool.",
            units(outcome.restored),
            units(outcome.requested),
            outcome.location
        )
    }
}

pub(crate) fn session_status(aggregate: &AllocationAggregate) -> String {
    let active = aggregate.locations().iter().filter(|l| l.is_active).count();
    format!(
        "{} location(s) ({} active), {} allocated, {} in pool.",
        aggregate.locations().len(),
        active,
        units(aggregate.total_allocated()),
        units(aggregate.total_pooled())
    )
}
