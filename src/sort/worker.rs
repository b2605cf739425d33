use std::{
    sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender},
    thread::JoinHandle,
    time::Duration,
};

use tracing::{debug, trace};

use crate::{
    error::CloudError,
    sort::{engine::DepthSorter, SortMode, SortRequest, SortResponse},
};


/// Handle to the depth-sort thread. Requests cross by value, responses come
/// back over a second channel the owner drains. Dropping the handle hangs up
/// the request channel; the thread drains what is queued and exits, and the
/// drop joins it.
pub struct SortWorker {
    request_tx: Option<Sender<SortRequest>>,
    response_rx: Receiver<SortResponse>,
    thread: Option<JoinHandle<()>>,
}

impl SortWorker {
    pub fn spawn(mode: SortMode) -> Result<Self, CloudError> {
        let (request_tx, request_rx) = channel::<SortRequest>();
        let (response_tx, response_rx) = channel::<SortResponse>();

        let thread = std::thread::Builder::new()
            .name("splat-depth-sort".into())
            .spawn(move || {
                debug!("depth sort worker started");

                let mut sorter = DepthSorter::new(mode);

                while let Ok(request) = request_rx.recv() {
                    if let Some(response) = sorter.handle(request) {
                        if response_tx.send(response).is_err() {
                            break;
                        }
                    }
                }

                debug!("depth sort worker exited");
            })?;

        Ok(Self {
            request_tx: Some(request_tx),
            response_rx,
            thread: Some(thread),
        })
    }

    /// Sending after the worker has gone is an inert no-op, not an error.
    pub fn send(&self, request: SortRequest) {
        let Some(request_tx) = &self.request_tx else {
            return;
        };

        if request_tx.send(request).is_err() {
            trace!("sort worker hung up; request dropped");
        }
    }

    pub fn try_recv(&self) -> Option<SortResponse> {
        self.response_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SortResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for SortWorker {
    fn drop(&mut self) {
        self.request_tx.take();

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::camera::SortCamera;
    use crate::splat::PositionBuffer;


    fn show_all(worker: &SortWorker, addresses: Vec<u32>, id: u64) {
        worker.send(SortRequest::ShowBatches {
            addresses,
            camera: SortCamera { xyz: [0.0, 0.0, 10.0], vpm: None },
            id,
        });
    }

    #[test]
    fn responses_arrive_in_request_order() {
        let worker = SortWorker::spawn(SortMode::default()).unwrap();

        worker.send(SortRequest::AddBatches {
            addresses: vec![0],
            positions: PositionBuffer::tight(vec![
                0.0, 0.0, 0.0,
                1.0, 0.0, 0.0,
            ]),
            batch_size: 4,
        });

        show_all(&worker, vec![0], 0);
        worker.send(SortRequest::Sort {
            camera: SortCamera { xyz: [5.0, 0.0, 0.0], vpm: None },
            id: 1,
        });

        let timeout = Duration::from_secs(5);
        let first = worker.recv_timeout(timeout).unwrap();
        let second = worker.recv_timeout(timeout).unwrap();

        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        assert_eq!(second.order, vec![0, 1]);
        assert_eq!(second.count, 2);
    }

    #[test]
    fn drop_joins_cleanly_with_queued_requests() {
        let worker = SortWorker::spawn(SortMode::default()).unwrap();

        for id in 0..32 {
            show_all(&worker, vec![], id);
        }

        drop(worker);
    }
}
