//! Panic containment and fatal-error handling at the C boundary

use std::any::Any;
use void_physics::PhysicsError;

/// Run a bridge call body, turning a panic into `$fallback`.
///
/// `return` inside the body returns from the guarded closure, not from the
/// enclosing `extern "C"` function. A caught panic records
/// `BridgeStatus::Panicked` as the thread's last status.
macro_rules! bridge_guard {
    ($fallback:expr, $body:block) => {{
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                ::log::error!(
                    "Panic caught at physics bridge boundary: {}",
                    $crate::guard::panic_message(payload.as_ref())
                );
                $crate::status::set_last($crate::status::BridgeStatus::Panicked);
                $fallback
            }
        }
    }};
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Log and abort. Used for errors the caller has no way to recover from.
pub(crate) fn fatal(context: &str, error: &PhysicsError) -> ! {
    log::error!("Fatal physics bridge error during {context}: {error}");
    std::process::abort()
}
