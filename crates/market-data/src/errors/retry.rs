/// Classification for retry policy.
///
/// Used by [`MarketDataClient`](crate::client::MarketDataClient) to decide
/// whether a failed attempt is worth another try.
///
/// # Behavior Summary
///
/// | Class | Consumes an attempt? | Next attempt? |
/// |-------|----------------------|---------------|
/// | `Never` | Yes | No, the error is returned as-is |
/// | `WithBackoff` | Yes | Yes, after the jittered delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - the request is fundamentally invalid (e.g. an asset the
    /// provider has no mapping for). Retrying won't help.
    Never,

    /// The attempt failed but a later one may succeed: rate limiting (429),
    /// timeouts, connection errors, unexpected statuses, malformed bodies.
    WithBackoff,
}
