//! Fan-out of independent utterances over a fixed group of decode workers.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use ndarray::Array2;

use crate::decoder::{DecodeError, Decoder};

type Task<'b> = (usize, &'b Array2<f32>);
type TaskResult = (usize, Result<String, DecodeError>);

fn resolve_worker_count(requested: usize, tasks: usize) -> usize {
    let available = num_cpus::get();
    let workers = if requested == 0 {
        available
    } else {
        requested.min(available)
    };
    let workers = workers.min(tasks).max(1);
    log::debug!(
        "Batch decode: {} worker(s) for {} task(s) (requested={}, cpus={})",
        workers,
        tasks,
        requested,
        available
    );
    workers
}

/// Decodes `batch` on up to `num_workers` threads and returns the texts in
/// input order. `num_workers == 0` uses one worker per available CPU.
///
/// Each worker runs its own search; the only shared state is the decoder
/// itself, which is read-only. The first failing item (by index) fails the
/// whole batch.
pub fn decode_batch<D>(
    decoder: &D,
    batch: &[Array2<f32>],
    num_workers: usize,
) -> Result<Vec<String>, DecodeError>
where
    D: Decoder + ?Sized,
{
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let start = Instant::now();
    let workers = resolve_worker_count(num_workers, batch.len());

    let (task_tx, task_rx) = mpsc::sync_channel::<Task<'_>>(workers);
    let (result_tx, result_rx) = mpsc::channel::<TaskResult>();
    let task_rx = Arc::new(Mutex::new(task_rx));

    let mut results: Vec<TaskResult> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let task_rx = Arc::clone(&task_rx);
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    run_worker(decoder, &task_rx, |result| result_tx.send(result).is_ok())
                })
            })
            .collect();
        // Workers own the queue from here, so sends fail once they are all gone.
        drop(task_rx);
        drop(result_tx);

        for task in batch.iter().enumerate() {
            if task_tx.send(task).is_err() {
                break;
            }
        }
        // Closing the queue stops each worker once it runs dry.
        drop(task_tx);

        let collected: Vec<TaskResult> = result_rx.iter().take(batch.len()).collect();
        for handle in handles {
            if handle.join().is_err() {
                log::error!("Decode worker panicked");
            }
        }
        collected
    });

    if results.len() < batch.len() {
        return Err(DecodeError::WorkerDisconnected {
            received: results.len(),
            expected: batch.len(),
        });
    }

    results.sort_by_key(|(index, _)| *index);

    log::info!(
        "Decoded batch of {} item(s) on {} worker(s) in {:?}",
        batch.len(),
        workers,
        start.elapsed()
    );

    results.into_iter().map(|(_, text)| text).collect()
}

fn run_worker<D, F>(decoder: &D, tasks: &Mutex<Receiver<Task<'_>>>, mut emit: F)
where
    D: Decoder + ?Sized,
    F: FnMut(TaskResult) -> bool,
{
    loop {
        let next = match tasks.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => {
                log::warn!("Decode task queue poisoned, worker exiting");
                return;
            }
        };
        let Ok((index, probs)) = next else {
            return;
        };

        let result = decoder.decode(probs.view());
        if !emit((index, result)) {
            return;
        }
    }
}
