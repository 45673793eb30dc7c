//! Structured logging utilities for gvfs components.
//!
//! Provides consistent logging with component prefixes and structured fields.
//!
//! # Usage
//!
//! ```ignore
//! use gvfs_config::log_hook_info;
//!
//! log_hook_info!("Projection loaded", bytes = 4096);
//! ```

/// Component identifiers for log filtering
pub struct Component;

impl Component {
    pub const HOOK: &'static str = "HOOK";
    pub const FILTER: &'static str = "FILTER";
    pub const APPLY: &'static str = "APPLY";
    pub const CLI: &'static str = "CLI";
}

/// Log levels for runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// === HOOK logging macros ===

#[macro_export]
macro_rules! log_hook_error {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::error!(component = $crate::logging::Component::HOOK, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_hook_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = $crate::logging::Component::HOOK, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_hook_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::HOOK, $($key = $value,)* $msg)
    };
}

// === FILTER logging macros ===

#[macro_export]
macro_rules! log_filter_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::FILTER, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_filter_trace {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::trace!(component = $crate::logging::Component::FILTER, $($key = $value,)* $msg)
    };
}

// === APPLY logging macros ===

#[macro_export]
macro_rules! log_apply_info {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(component = $crate::logging::Component::APPLY, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_apply_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::APPLY, $($key = $value,)* $msg)
    };
}

// === CLI logging macros ===

#[macro_export]
macro_rules! log_cli_warn {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::warn!(component = $crate::logging::Component::CLI, $($key = $value,)* $msg)
    };
}

#[macro_export]
macro_rules! log_cli_debug {
    ($msg:literal $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(component = $crate::logging::Component::CLI, $($key = $value,)* $msg)
    };
}

/// Initialize logging with the given level filter.
/// `GVFS_LOG` wins over `RUST_LOG`, which wins over `level`.
/// Call this once at application startup.
pub fn init_logging(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_env("GVFS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_constants() {
        assert_eq!(Component::HOOK, "HOOK");
        assert_eq!(Component::FILTER, "FILTER");
        assert_eq!(Component::APPLY, "APPLY");
    }

    #[derive(Clone, Default)]
    struct Components(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

    impl tracing::field::Visit for Components {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "component" {
                self.0.lock().unwrap().push(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &tracing::field::Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Components {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            event.record(&mut self.clone());
        }
    }

    #[test]
    fn test_macros_tag_component() {
        use tracing_subscriber::layer::SubscriberExt;

        let seen = Components::default();
        let subscriber = tracing_subscriber::registry().with(seen.clone());
        tracing::subscriber::with_default(subscriber, || {
            crate::log_hook_info!("hook", bytes = 3);
            crate::log_filter_debug!("filter");
            crate::log_apply_debug!("apply", rows = 1);
            crate::log_cli_warn!("cli");
        });

        let seen = seen.0.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Component::HOOK,
                Component::FILTER,
                Component::APPLY,
                Component::CLI
            ]
        );
    }

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
        assert_eq!(LogLevel::Trace.as_filter(), "trace");
    }
}
