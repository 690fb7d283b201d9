//! Report delivery with a bounded retry policy.

use station_traits::Uploader;
use station_traits::clock::Clock;

use crate::config::RetryPolicy;
use crate::error::StationError;
use crate::link_error::map_link_error;
use crate::report::UploadPayload;
use crate::util::duration_ms;

/// Result of handing one report to the uploader.
#[derive(Debug, Clone)]
pub enum Delivery {
    Delivered { attempts: u32 },
    Failed { attempts: u32, last_error: StationError },
    /// Upload disabled for this run.
    Skipped,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered { .. })
    }
}

/// Send `payload`, retrying up to `policy.max_retries` times with
/// `policy.pause` between attempts. Never fails the caller.
pub fn deliver<U, C>(
    uploader: &mut U,
    payload: &UploadPayload,
    policy: &RetryPolicy,
    clock: &C,
) -> Delivery
where
    U: Uploader<UploadPayload> + ?Sized,
    C: Clock + ?Sized,
{
    let max_attempts = policy.max_retries.saturating_add(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match uploader.send(payload) {
            Ok(()) => {
                tracing::debug!(attempt, "report delivered");
                return Delivery::Delivered { attempts: attempt };
            }
            Err(e) => {
                let err = map_link_error(e.as_ref());
                if attempt >= max_attempts {
                    tracing::error!(attempts = attempt, error = %err, "upload failed, giving up");
                    return Delivery::Failed {
                        attempts: attempt,
                        last_error: err,
                    };
                }
                tracing::warn!(
                    attempt,
                    of = max_attempts,
                    pause_ms = duration_ms(policy.pause),
                    error = %err,
                    "upload failed, retrying"
                );
                clock.sleep(policy.pause);
            }
        }
    }
}
