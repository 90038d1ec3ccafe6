/***************************************/
/*               Macros                */
/***************************************/

/// Unwraps a `Result` or logs the error and exits the process with status 1.
/// An optional context string is prefixed to the logged message.
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr) => {
        $crate::unwrap_or_exit!($expr, "liftsim")
    };
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                log::error!("{}: {}", $context, e);
                std::process::exit(1);
            }
        }
    };
}
