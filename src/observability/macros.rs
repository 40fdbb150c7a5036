//! `tracing`-shaped front end for [`Logger`](crate::observability::Logger).
//!
//! Expands to the [`Entry`](crate::observability::logging::Entry) builder, so
//! the pipeline sees exactly what the builder would produce.

/// Emit a record through a [`Logger`](crate::observability::Logger) with
/// `tracing`-style fields, message last.
///
/// ```ignore
/// pingpong_service::event!(logger, Level::Info, cx = &cx, port = 8000, addr = %addr, "Listening");
/// ```
///
/// `cx = ` attaches a [`RequestContext`](crate::observability::RequestContext).
/// `err = ` takes an error and records its source chain. A `%` prefix records
/// the value's `Display` text, so `err = %text` stores a plain message.
#[macro_export]
macro_rules! event {
    ($logger:expr, $level:expr, $($rest:tt)+) => {
        $crate::__event_fields!($logger, $level, [] $($rest)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __event_fields {
    ($logger:expr, $level:expr, [$($acc:tt)*] $msg:literal $(,)?) => {
        $logger.log($level, $msg) $($acc)* .emit()
    };
    ($logger:expr, $level:expr, [$($acc:tt)*] $key:ident = %$value:expr, $($rest:tt)+) => {
        $crate::__event_fields!(
            $logger,
            $level,
            [$($acc)* .display(::core::stringify!($key), $value)]
            $($rest)+
        )
    };
    ($logger:expr, $level:expr, [$($acc:tt)*] cx = $cx:expr, $($rest:tt)+) => {
        $crate::__event_fields!($logger, $level, [$($acc)* .context($cx)] $($rest)+)
    };
    ($logger:expr, $level:expr, [$($acc:tt)*] err = $err:expr, $($rest:tt)+) => {
        $crate::__event_fields!($logger, $level, [$($acc)* .err($err)] $($rest)+)
    };
    ($logger:expr, $level:expr, [$($acc:tt)*] $key:ident = $value:expr, $($rest:tt)+) => {
        $crate::__event_fields!(
            $logger,
            $level,
            [$($acc)* .field(::core::stringify!($key), $value)]
            $($rest)+
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::event!($logger, $crate::observability::Level::Debug, $($rest)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::event!($logger, $crate::observability::Level::Info, $($rest)+)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $($rest:tt)+) => {
        $crate::event!($logger, $crate::observability::Level::Warning, $($rest)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::event!($logger, $crate::observability::Level::Error, $($rest)+)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $($rest:tt)+) => {
        $crate::event!($logger, $crate::observability::Level::Critical, $($rest)+)
    };
}
