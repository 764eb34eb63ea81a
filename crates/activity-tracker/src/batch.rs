//! Batch id resolution.

use crate::context::ActivityContext;

/// Pick the batch id for the next record.
///
/// Order: innermost explicit batch scope, then the contextual batch id, then
/// (when `auto_batch` is on) the unit's auto-generated id. `None` leaves the
/// record ungrouped.
pub fn resolve_batch_id(ctx: &mut ActivityContext, auto_batch: bool) -> Option<String> {
    if let Some(explicit) = ctx.explicit_batch_id() {
        return Some(explicit.to_string());
    }
    if let Some(contextual) = ctx.batch_id() {
        return Some(contextual.to_string());
    }
    auto_batch.then(|| ctx.auto_batch_id())
}
