//! Bounded retry of a whole operation

/// Number of attempts made for each log write
pub const WRITE_ATTEMPTS: usize = 2;

/// Run `op` up to `attempts` times, stopping at the first success
///
/// `op` receives the 1-based attempt number. On exhaustion returns the last error
/// with the number of attempts made. No delay between attempts.
pub fn retry<T, E, F>(attempts: usize, mut op: F) -> Result<T, (usize, E)>
where
    F: FnMut(usize) -> Result<T, E>,
    E: std::fmt::Display,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err((attempt, e)),
            Err(e) => {
                tracing::warn!("Attempt {} of {} failed, retrying: {}", attempt, attempts, e);
                attempt += 1;
            }
        }
    }
}
