//! Defaults applied to every operation built from a set of bindings.

use std::sync::Arc;

/// Operation defaults shared by the collections of one [`crate::bindings::Bindings`].
///
/// A default applies to every descriptor created through a bound collection and can
/// be overridden per descriptor. Configuration is immutable once the bindings are
/// built; the `with_*` methods return a modified copy.
///
/// # Examples
///
/// ```rust,ignore
/// use quarry::bindings::bind;
///
/// let bindings = bind(driver)
///     .max_time_ms(5_000)
///     .comment("reporting")
///     .collection::<Order>("orders")
///     .build()?;
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuarryConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning across handles.
    inner: Arc<QuarryConfigInner>,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct QuarryConfigInner {
    max_time_ms: Option<u64>,
    comment: Option<String>,
    allow_disk_use: Option<bool>,
    log_commands: bool,
}

impl QuarryConfig {
    /// Creates a configuration with no defaults: every option is left to the server.
    pub fn new() -> Self {
        QuarryConfig {
            inner: Arc::new(QuarryConfigInner::default()),
        }
    }

    /// Server-side time limit for reads and aggregations, in milliseconds.
    pub fn max_time_ms(&self) -> Option<u64> {
        self.inner.max_time_ms
    }

    /// Comment attached to every command, visible in server logs and profiler output.
    pub fn comment(&self) -> Option<&str> {
        self.inner.comment.as_deref()
    }

    /// Whether aggregations and finds may spill to disk.
    pub fn allow_disk_use(&self) -> Option<bool> {
        self.inner.allow_disk_use
    }

    /// Whether triggers log the command they send at `info` level.
    pub fn log_commands(&self) -> bool {
        self.inner.log_commands
    }

    pub fn with_max_time_ms(&self, max_time_ms: u64) -> Self {
        self.modify(|inner| inner.max_time_ms = Some(max_time_ms))
    }

    pub fn with_comment(&self, comment: impl Into<String>) -> Self {
        let comment = comment.into();
        self.modify(|inner| inner.comment = Some(comment))
    }

    pub fn with_allow_disk_use(&self, allow_disk_use: bool) -> Self {
        self.modify(|inner| inner.allow_disk_use = Some(allow_disk_use))
    }

    pub fn with_log_commands(&self, log_commands: bool) -> Self {
        self.modify(|inner| inner.log_commands = log_commands)
    }

    fn modify(&self, change: impl FnOnce(&mut QuarryConfigInner)) -> Self {
        let mut inner = (*self.inner).clone();
        change(&mut inner);
        QuarryConfig {
            inner: Arc::new(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuarryConfig::new();
        assert_eq!(config.max_time_ms(), None);
        assert_eq!(config.comment(), None);
        assert_eq!(config.allow_disk_use(), None);
        assert!(!config.log_commands());
        assert_eq!(config, QuarryConfig::default());
    }

    #[test]
    fn test_with_returns_modified_copy() {
        let base = QuarryConfig::new();
        let tuned = base
            .with_max_time_ms(250)
            .with_comment("nightly")
            .with_allow_disk_use(true)
            .with_log_commands(true);

        assert_eq!(base.max_time_ms(), None);
        assert_eq!(tuned.max_time_ms(), Some(250));
        assert_eq!(tuned.comment(), Some("nightly"));
        assert_eq!(tuned.allow_disk_use(), Some(true));
        assert!(tuned.log_commands());
    }
}
