//! Queued-notification status state machine.
//!
//! Statuses match the TEXT values in `queued_notifications.status`. The
//! dispatcher is the sole mutator after insert: it claims a row by flipping
//! `pending` to `processing`, then settles it to a terminal state or
//! requeues it for a later retry.

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Waiting to become due. Initial status for every row.
pub const STATUS_PENDING: &str = "pending";

/// Claimed by a dispatcher run. At most one run holds a row at a time.
pub const STATUS_PROCESSING: &str = "processing";

/// At least one channel delivered. Terminal.
pub const STATUS_SENT: &str = "sent";

/// Every channel failed and the attempts budget is exhausted. Terminal.
pub const STATUS_FAILED: &str = "failed";

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Returns the set of valid target statuses reachable from `from`.
///
/// Terminal states (`sent`, `failed`) return an empty slice because no
/// further transitions are allowed: a row never reopens.
pub fn valid_transitions(from: &str) -> &'static [&'static str] {
    match from {
        // Pending -> Processing (atomic claim).
        STATUS_PENDING => &[STATUS_PROCESSING],
        // Processing -> Sent | Failed | Pending (retry requeue with backoff).
        STATUS_PROCESSING => &[STATUS_SENT, STATUS_FAILED, STATUS_PENDING],
        // Terminal states.
        STATUS_SENT | STATUS_FAILED => &[],
        // Unknown status: no transitions allowed.
        _ => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: &str, to: &str) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a status transition, returning an error message for invalid ones.
pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!("Invalid queue transition: {from} -> {to}"))
    }
}

/// Whether a status is terminal.
pub fn is_terminal(status: &str) -> bool {
    matches!(status, STATUS_SENT | STATUS_FAILED)
}
