/// Times the enclosed expression and reports it at `info` level.
#[doc(hidden)]
#[macro_export]
macro_rules! time {
    ($label:expr, $($token:tt)*) => ({
        let start = std::time::Instant::now();
        let value = { $($token)* };
        $crate::tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "{} finished", $label);
        value
    });
}

pub use time;
