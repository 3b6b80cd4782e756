use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use advisor_core::AdvisoryError;
use tokio::sync::watch;

/// Last-request-wins cancellation keyed by UI slot.
///
/// Starting a request in a slot supersedes whatever is still in flight there:
/// the older future is dropped at its next await point and resolves to
/// [`AdvisoryError::Superseded`].
#[derive(Debug, Default)]
pub struct RequestSlots {
    slots: Mutex<HashMap<String, watch::Sender<u64>>>,
}

impl RequestSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the slot's generation and watch for the next bump
    fn claim(&self, slot: &str) -> watch::Receiver<u64> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = slots
            .entry(slot.to_string())
            .or_insert_with(|| watch::channel(0).0);
        sender.send_modify(|generation| *generation += 1);
        sender.subscribe()
    }

    pub async fn run<T, E, F>(&self, slot: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: From<AdvisoryError>,
    {
        let mut superseded = self.claim(slot);
        tokio::pin!(fut);

        tokio::select! {
            biased;
            _ = superseded.changed() => {
                tracing::warn!(slot, "advisory request superseded");
                Err(AdvisoryError::Superseded(slot.to_string()).into())
            }
            out = &mut fut => out,
        }
    }

    pub fn in_use(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn newer_request_supersedes_older() {
        let slots = Arc::new(RequestSlots::new());

        let slow = {
            let slots = slots.clone();
            tokio::spawn(async move {
                slots
                    .run("analysis", async {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                        Ok::<_, AdvisoryError>("stale")
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let fresh = slots.run("analysis", async { Ok::<_, AdvisoryError>("fresh") }).await;
        assert_eq!(fresh.unwrap(), "fresh");

        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(AdvisoryError::Superseded(slot)) if slot == "analysis"));
    }

    #[tokio::test]
    async fn slots_are_independent() {
        let slots = RequestSlots::new();
        let (a, b) = tokio::join!(
            slots.run("chat", async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, AdvisoryError>(1)
            }),
            slots.run("analysis", async { Ok::<_, AdvisoryError>(2) }),
        );
        assert_eq!(a.unwrap(), 1);
        assert_eq!(b.unwrap(), 2);
        assert_eq!(slots.in_use(), 2);
    }
}
