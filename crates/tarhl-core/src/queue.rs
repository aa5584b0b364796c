//! Bounded write-request queue between the archive walker and the file
//! writer.
//!
//! The queue has exactly one producer and one consumer. Submitting blocks
//! while the queue is full, which is how the walker is held back when the
//! writer falls behind. Dropping (or [closing](RequestSender::close)) the
//! sender marks the end of the archive: the receiver keeps yielding the
//! requests still buffered and then stops. [Aborting](RequestSender::abort)
//! instead discards whatever is still buffered, so a walker failure stops
//! the writer after the request it is currently handling.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use crossbeam_channel::bounded;

use crate::ExtractionError;
use crate::Result;
use crate::types::FileMetadata;

/// A regular file waiting to be materialized by the file writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Destination path under the output root.
    pub dest: PathBuf,

    /// Candidate path under the base root, when deduplication is enabled.
    pub pair: Option<PathBuf>,

    /// Full file content as read from the archive.
    pub content: Vec<u8>,

    /// Metadata recorded in the archive header.
    pub metadata: FileMetadata,
}

/// Creates a queue holding at most `capacity` pending requests.
///
/// A capacity of zero is bumped to one so that the walker and writer still
/// hand requests over one at a time.
#[must_use]
pub fn write_queue(capacity: usize) -> (RequestSender, RequestReceiver) {
    let (sender, receiver) = bounded(capacity.max(1));
    let aborted = Arc::new(AtomicBool::new(false));
    (
        RequestSender {
            sender,
            aborted: Arc::clone(&aborted),
        },
        RequestReceiver { receiver, aborted },
    )
}

/// Producer side of the write-request queue.
#[derive(Debug)]
pub struct RequestSender {
    sender: Sender<WriteRequest>,
    aborted: Arc<AtomicBool>,
}

impl RequestSender {
    /// Enqueues a request, blocking while the queue is full.
    ///
    /// Fails with [`ExtractionError::WriterDisconnected`] once the writer has
    /// stopped, which only happens after it hit an error.
    pub fn submit(&self, request: WriteRequest) -> Result<()> {
        self.sender
            .send(request)
            .map_err(|_| ExtractionError::WriterDisconnected)
    }

    /// Number of requests currently waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    /// Closes the queue. The writer drains what is left and then stops.
    pub fn close(self) {
        drop(self);
    }

    /// Closes the queue and drops the requests still waiting. The writer
    /// stops once its current request is done.
    pub fn abort(self) {
        self.aborted.store(true, Ordering::Release);
        drop(self);
    }
}

/// Consumer side of the write-request queue.
#[derive(Debug)]
pub struct RequestReceiver {
    receiver: Receiver<WriteRequest>,
    aborted: Arc<AtomicBool>,
}

impl RequestReceiver {
    /// Blocks until the next request arrives.
    ///
    /// Returns `None` once the queue is closed and empty, or as soon as the
    /// producer aborted.
    pub fn next_request(&self) -> Option<WriteRequest> {
        let request = self.receiver.recv().ok()?;
        if self.is_aborted() {
            return None;
        }
        Some(request)
    }

    /// Returns `true` if the producer aborted the queue.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Iterates over requests in submission order until the queue is closed
    /// and drained.
    pub fn iter(&self) -> impl Iterator<Item = WriteRequest> + '_ {
        std::iter::from_fn(|| self.next_request())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::thread;
    use std::time::Duration;

    fn request(name: &str) -> WriteRequest {
        WriteRequest {
            dest: PathBuf::from(name),
            pair: None,
            content: name.as_bytes().to_vec(),
            metadata: FileMetadata::regular(name.len() as u64, 0o644, FileTime::zero()),
        }
    }

    #[test]
    fn test_fifo_order_and_drain_after_close() {
        let (sender, receiver) = write_queue(4);
        sender.submit(request("a")).unwrap();
        sender.submit(request("b")).unwrap();
        sender.submit(request("c")).unwrap();
        sender.close();

        let names: Vec<_> = receiver.iter().map(|r| r.dest).collect();
        assert_eq!(
            names,
            vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
        );
        assert!(receiver.next_request().is_none());
    }

    #[test]
    fn test_submit_fails_after_receiver_dropped() {
        let (sender, receiver) = write_queue(1);
        drop(receiver);
        assert!(matches!(
            sender.submit(request("a")),
            Err(ExtractionError::WriterDisconnected)
        ));
    }

    #[test]
    fn test_zero_capacity_still_hands_over() {
        let (sender, receiver) = write_queue(0);
        sender.submit(request("a")).unwrap();
        assert_eq!(sender.pending(), 1);
        assert_eq!(receiver.next_request().unwrap().dest, PathBuf::from("a"));
    }

    #[test]
    fn test_full_queue_blocks_producer() {
        let (sender, receiver) = write_queue(2);
        let producer = thread::spawn(move || {
            for name in ["a", "b", "c", "d"] {
                sender.submit(request(name)).unwrap();
            }
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());

        let drained: Vec<_> = receiver.iter().collect();
        producer.join().unwrap();
        assert_eq!(drained.len(), 4);
    }

    #[test]
    fn test_abort_discards_buffered_requests() {
        let (sender, receiver) = write_queue(4);
        sender.submit(request("a")).unwrap();
        sender.submit(request("b")).unwrap();
        sender.abort();

        assert!(receiver.is_aborted());
        assert!(receiver.next_request().is_none());
        assert_eq!(receiver.iter().count(), 0);
    }

    #[test]
    fn test_abort_wakes_waiting_consumer() {
        let (sender, receiver) = write_queue(4);
        let consumer = thread::spawn(move || receiver.iter().count());

        thread::sleep(Duration::from_millis(20));
        sender.abort();
        assert_eq!(consumer.join().unwrap(), 0);
    }
}
