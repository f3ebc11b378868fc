//! The lock type backing promise state.
//!
//! Promise state is only ever touched through these types. parking_lot locks
//! do not poison, so a panicking callback elsewhere can never wedge a promise.

/// A mutual exclusion primitive useful for protecting shared data.
pub type Mutex<T> = parking_lot::Mutex<T>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn mutex_is_shared_across_threads() {
        pledge_logging::setup_log_no_panic_hook();
        let counter = Arc::new(Mutex::new(0usize));
        let handles = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        *counter.lock() += 1;
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(*counter.lock(), 800);
    }

    #[test]
    fn lock_survives_panicking_holder() {
        let lock = Arc::new(Mutex::new(1u8));
        let cloned = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock();
            panic!("holder panicked");
        })
        .join();

        assert_eq!(*lock.lock(), 1);
    }
}
