/// Helper macro for locking items
///
/// Evaluates to the guard, or returns [`crate::Error::LockError`] from the enclosing function
/// if the mutex was poisoned by a panicking thread.
///
/// ```rust, ignore
///  let mut state = lock!(self.state);
///  state.handle = Some(reader);
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)?
    };
}
