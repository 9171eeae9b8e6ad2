//! Ordered worker pool
//!
//! Work items are fanned out to a fixed number of scoped worker threads over
//! crossbeam channels. Results are handed to the sink strictly in input order,
//! whatever order the workers finish in.

use std::collections::BTreeMap;

use crossbeam_channel::bounded;

/// Run `work` over `items` on up to `jobs` threads, feeding results to `sink`
/// in input order
///
/// With `jobs <= 1` everything runs on the calling thread, one item at a time.
/// If `sink` fails, no further results are delivered, the workers wind down
/// and the error is returned.
pub fn run_ordered<T, R, E, W, S>(items: Vec<T>, jobs: usize, work: W, mut sink: S) -> Result<(), E>
where
    T: Send,
    R: Send,
    W: Fn(T) -> R + Sync,
    S: FnMut(usize, R) -> Result<(), E>,
{
    let workers = jobs.min(items.len());
    if workers <= 1 {
        for (index, item) in items.into_iter().enumerate() {
            sink(index, work(item))?;
        }
        return Ok(());
    }

    let (job_tx, job_rx) = bounded::<(usize, T)>(workers);
    let (result_tx, result_rx) = bounded::<(usize, R)>(workers);
    let work = &work;

    std::thread::scope(|scope| {
        for id in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for (index, item) in job_rx.iter() {
                    if result_tx.send((index, work(item))).is_err() {
                        break;
                    }
                }
                tracing::trace!("Worker {} finished", id);
            });
        }
        drop(job_rx);
        drop(result_tx);

        scope.spawn(move || {
            for job in items.into_iter().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        });

        // Owned here so an early return disconnects the workers
        let results = result_rx;
        let mut pending = BTreeMap::new();
        let mut next = 0;
        for (index, result) in results.iter() {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next) {
                sink(next, result)?;
                next += 1;
            }
        }
        Ok(())
    })
}
