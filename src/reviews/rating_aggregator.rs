use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::attractions::{Attraction, AttractionRepository, RatingSummary};
use crate::error::DbResult;
use crate::reviews::ReviewRepository;

/// Count and arithmetic mean of a review set
///
/// The mean is left unrounded; rounding happens when the attraction stores it.
/// An empty set yields the defaults (0 reviews, 4.5).
pub fn aggregate_ratings(ratings: &[f64]) -> RatingSummary {
    if ratings.is_empty() {
        return RatingSummary::default();
    }

    let sum: f64 = ratings.iter().sum();
    RatingSummary {
        ratings_quantity: ratings.len() as i32,
        ratings_average: sum / ratings.len() as f64,
    }
}

type LockTable = std::sync::Mutex<HashMap<i32, Arc<Mutex<()>>>>;

/// One async lock per attraction id
///
/// Entries are dropped once no task holds or waits on them, including when
/// the holder is cancelled.
#[derive(Default)]
struct AttractionLocks {
    table: Arc<LockTable>,
}

impl AttractionLocks {
    async fn acquire(&self, attraction_id: i32) -> AttractionLockGuard {
        let ticket = {
            let mut table = lock_table(&self.table);
            LockTicket {
                table: Arc::clone(&self.table),
                attraction_id,
                lock: Arc::clone(table.entry(attraction_id).or_default()),
            }
        };
        let guard = Arc::clone(&ticket.lock).lock_owned().await;
        AttractionLockGuard {
            _guard: guard,
            _ticket: ticket,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        lock_table(&self.table).len()
    }
}

fn lock_table(table: &LockTable) -> std::sync::MutexGuard<'_, HashMap<i32, Arc<Mutex<()>>>> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Claim on a table entry; prunes the entry when the last claim goes
struct LockTicket {
    table: Arc<LockTable>,
    attraction_id: i32,
    lock: Arc<Mutex<()>>,
}

impl Drop for LockTicket {
    fn drop(&mut self) {
        let mut table = lock_table(&self.table);
        // The table's own handle plus this ticket's
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.attraction_id);
        }
    }
}

/// Exclusive hold on one attraction's ratings
///
/// Field order matters: the mutex guard is released before the ticket prunes.
pub(crate) struct AttractionLockGuard {
    _guard: OwnedMutexGuard<()>,
    _ticket: LockTicket,
}

/// Keeps an attraction's `ratingsAverage`/`ratingsQuantity` equal to the
/// aggregate of its current reviews
#[derive(Clone)]
pub struct RatingAggregator {
    reviews: Arc<dyn ReviewRepository>,
    attractions: Arc<dyn AttractionRepository>,
    locks: Arc<AttractionLocks>,
}

impl RatingAggregator {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        attractions: Arc<dyn AttractionRepository>,
    ) -> Self {
        Self {
            reviews,
            attractions,
            locks: Arc::new(AttractionLocks::default()),
        }
    }

    /// Recomputes and stores the statistics for one attraction
    ///
    /// Returns the updated attraction, or `None` when the attraction does not
    /// exist (nothing to update). Concurrent calls for the same attraction run
    /// one at a time, so the last writer always sees the final review set.
    pub async fn recompute(&self, attraction_id: i32) -> DbResult<Option<Attraction>> {
        let _guard = self.locks.acquire(attraction_id).await;
        self.recompute_locked(attraction_id).await
    }

    /// Holds the attraction's lock, stalling recomputes until dropped
    #[cfg(test)]
    pub(crate) async fn lock_attraction(&self, attraction_id: i32) -> AttractionLockGuard {
        self.locks.acquire(attraction_id).await
    }

    async fn recompute_locked(&self, attraction_id: i32) -> DbResult<Option<Attraction>> {
        let ratings = self.reviews.ratings_for_attraction(attraction_id).await?;
        let summary = aggregate_ratings(&ratings);

        let updated = self
            .attractions
            .update_ratings(attraction_id, &summary)
            .await?;

        match &updated {
            Some(attraction) => tracing::debug!(
                "Recomputed ratings for attraction {}: quantity={} average={}",
                attraction_id,
                attraction.ratings_quantity,
                attraction.ratings_average
            ),
            None => tracing::debug!(
                "Skipped rating recompute: attraction {} does not exist",
                attraction_id
            ),
        }

        Ok(updated)
    }
}
