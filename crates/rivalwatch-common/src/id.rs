use snowflake::SnowflakeIdBucket;
use std::sync::{Mutex, MutexGuard};

static ID_GENERATOR: Mutex<Option<SnowflakeIdBucket>> = Mutex::new(None);

fn generator() -> MutexGuard<'static, Option<SnowflakeIdBucket>> {
    // a panic while holding the lock cannot leave the bucket half-updated
    ID_GENERATOR.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Configures the process-wide id generator.
///
/// `machine_id` and `node_id` must each be in `0..=31`. Calling this again
/// replaces the bucket, which is what tests do to get a fresh sequence.
pub fn init(machine_id: i32, node_id: i32) {
    *generator() = Some(SnowflakeIdBucket::new(machine_id, node_id));
}

/// Returns a new, time-ordered identifier in decimal string form.
///
/// Falls back to machine/node `1/1` when [`init`] was never called.
pub fn next_id() -> String {
    let mut guard = generator();
    let bucket = guard.get_or_insert_with(|| SnowflakeIdBucket::new(1, 1));
    bucket.get_id().to_string()
}
