/// Host scheduler callbacks for tasks that reached a terminal state.
///
/// Each tracked task receives exactly one of these calls.
pub trait TaskSink<K>: Send + Sync + 'static {
    fn on_success(&self, key: K);

    /// `reason` is the remote status reason when the service reported one.
    fn on_failure(&self, key: K, reason: Option<&str>);
}
