//! Auto-refresh - Task periodico legato al ciclo di vita di un handle
//!
//! Il task gira in background su un `tokio::time::interval` e si ferma quando
//! l'handle viene cancellato o rilasciato.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

pub struct AutoRefresh;

impl AutoRefresh {
    /// Avvia `task` ogni `period`. Il primo tick (immediato) viene saltato:
    /// il caricamento iniziale spetta al chiamante.
    pub fn start<F, Fut>(period: Duration, mut task: F) -> RefreshHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        info!("Starting auto-refresh every {:?}", period);
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            // un refresh lento non deve produrre una raffica di recuperi
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                debug!("Auto-refresh tick");
                task().await;
            }
        });

        RefreshHandle { task: handle }
    }
}

/// Handle del task di refresh: rilasciarlo ferma il task
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(period: Duration) -> (RefreshHandle, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let handle = AutoRefresh::start(period, move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (handle, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn runs_on_every_tick_but_not_immediately() {
        let (handle, runs) = counting(Duration::from_secs(10));

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_secs(30)).await;
        assert!(runs.load(Ordering::SeqCst) >= 2);
        assert!(handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_the_task() {
        let (handle, runs) = counting(Duration::from_secs(10));
        time::sleep(Duration::from_secs(25)).await;

        handle.cancel();
        tokio::task::yield_now().await;
        let after_cancel = runs.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(runs.load(Ordering::SeqCst), after_cancel);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let (handle, runs) = counting(Duration::from_secs(10));
        time::sleep(Duration::from_secs(15)).await;

        drop(handle);
        tokio::task::yield_now().await;
        let after_drop = runs.load(Ordering::SeqCst);
        time::sleep(Duration::from_secs(60)).await;

        assert_eq!(runs.load(Ordering::SeqCst), after_drop);
    }
}
