// ── Act-then-confirm convergence ──
//
// Some hardware acknowledges join/leave before the subscription state
// actually changes. The fix is to keep re-issuing the command until an
// independent observation agrees, bounded by a retry policy.

use tracing::debug;

use crate::backoff::RetryPolicy;
use crate::error::Error;

/// One side-effecting step plus an observation of whether it took hold.
pub(crate) trait Probe {
    /// Issue the command. Failure here is not retried.
    async fn act(&mut self) -> Result<(), Error>;

    /// Check the externally observed state.
    async fn converged(&mut self) -> Result<bool, Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Convergence {
    Converged { attempts: u32 },
    Exhausted { attempts: u32 },
}

/// Repeat `act` then `converged` until the observation agrees or the
/// policy runs out. Sleeps between attempts, never after the last.
pub(crate) async fn converge<P: Probe>(
    policy: &RetryPolicy,
    probe: &mut P,
) -> Result<Convergence, Error> {
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        probe.act().await?;
        if probe.converged().await? {
            return Ok(Convergence::Converged { attempts: attempt });
        }
        if attempt < max_attempts {
            let delay = policy.backoff.delay(attempt - 1);
            debug!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "state not converged yet, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
    Ok(Convergence::Exhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    struct Scripted {
        observations: Vec<bool>,
        acts: u32,
        checks: usize,
    }

    impl Probe for Scripted {
        async fn act(&mut self) -> Result<(), Error> {
            self.acts += 1;
            Ok(())
        }

        async fn converged(&mut self) -> Result<bool, Error> {
            let seen = self.observations.get(self.checks).copied().unwrap_or(false);
            self.checks += 1;
            Ok(seen)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn converges_with_doubling_delays() {
        let mut probe = Scripted {
            observations: vec![false, false, true],
            acts: 0,
            checks: 0,
        };
        let start = Instant::now();

        let outcome = converge(&RetryPolicy::VERIFY, &mut probe).await.unwrap();

        assert_eq!(outcome, Convergence::Converged { attempts: 3 });
        assert_eq!((probe.acts, probe.checks), (3, 3));
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_skips_the_trailing_sleep() {
        let mut probe = Scripted {
            observations: vec![],
            acts: 0,
            checks: 0,
        };
        let start = Instant::now();

        let outcome = converge(&RetryPolicy::VERIFY, &mut probe).await.unwrap();

        assert_eq!(outcome, Convergence::Exhausted { attempts: 5 });
        assert_eq!(probe.acts, 5);
        // 0.5 + 1 + 2 + 4
        assert_eq!(start.elapsed(), Duration::from_millis(7500));
    }

    struct Refused;

    impl Probe for Refused {
        async fn act(&mut self) -> Result<(), Error> {
            Err(Error::Api {
                message: "Join failed: bad stream".into(),
            })
        }

        async fn converged(&mut self) -> Result<bool, Error> {
            panic!("must not observe after a rejected command");
        }
    }

    #[tokio::test]
    async fn rejected_command_is_not_retried() {
        let err = converge(&RetryPolicy::VERIFY, &mut Refused).await.unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
    }
}
