//! Error logging that keeps miette's diagnostic formatting in tracing output

/// Log an error at ERROR level using its `Debug` form, which for miette
/// diagnostics includes the code and help text.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = &$err;
        tracing::error!("{:?}", err);
    }};
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::error!("{}: {:?}", $msg, err);
    }};
}
