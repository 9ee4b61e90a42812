use crate::error::BridgeError;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of named worker threads draining a shared job queue.
///
/// Dropping the pool closes the queue and waits for queued jobs to finish.
pub struct WorkerPool {
    tx: Option<crossbeam::channel::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam::channel::unbounded::<Job>();
        let workers = (0..threads.max(1))
            .map(|i| {
                let rx = rx.clone();
                std::thread::Builder::new()
                    .name(format!("modelbridge-worker-{i}"))
                    .spawn(move || {
                        log::debug!("Worker {i} started");
                        for job in rx.iter() {
                            job();
                        }
                        log::debug!("Worker {i} stopped");
                    })
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self {
            tx: Some(tx),
            workers,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn execute(&self, job: impl FnOnce() + Send + 'static) -> Result<(), BridgeError> {
        let tx = self.tx.as_ref().ok_or(BridgeError::PipelineClosed)?;
        tx.send(Box::new(job))
            .map_err(|_| BridgeError::PipelineClosed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.tx.take());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::warn!("A worker thread panicked during shutdown");
            }
        }
    }
}
