//! Chunk accumulation
//!
//! The buffer keeps encoded fragments in arrival order. Each recording
//! restarts it under a new generation; a [`ChunkSink`] only writes while its
//! generation is current and the buffer has not been sealed.

use crate::capture::traits::RecordedChunk;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// What happened to a delivered chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    Appended,
    /// Zero-length chunk, dropped
    Discarded,
    /// Delivered by a session that is no longer current, or after sealing
    Stale,
}

#[derive(Debug)]
pub struct ChunkBuffer<C> {
    chunks: Vec<C>,
    total_bytes: u64,
    generation: u64,
    open: bool,
}

impl<C> Default for ChunkBuffer<C> {
    fn default() -> Self {
        Self {
            chunks: Vec::new(),
            total_bytes: 0,
            generation: 0,
            open: false,
        }
    }
}

impl<C: RecordedChunk> ChunkBuffer<C> {
    /// Clear the buffer and open it for a new session.
    pub fn restart(&mut self) -> u64 {
        self.chunks.clear();
        self.total_bytes = 0;
        self.generation += 1;
        self.open = true;
        self.generation
    }

    pub fn accept(&mut self, generation: u64, chunk: C) -> ChunkOutcome {
        if !self.open || generation != self.generation {
            return ChunkOutcome::Stale;
        }

        let len = chunk.byte_len();
        if len == 0 {
            return ChunkOutcome::Discarded;
        }

        self.chunks.push(chunk);
        self.total_bytes += len;
        ChunkOutcome::Appended
    }

    /// Close the buffer for `generation`. Returns false if already sealed or stale.
    pub fn seal(&mut self, generation: u64) -> bool {
        if self.open && generation == self.generation {
            self.open = false;
            true
        } else {
            false
        }
    }

    /// Seal whatever session is current.
    pub fn seal_current(&mut self) -> bool {
        self.seal(self.generation)
    }

    /// Drop the contents of a session that never started.
    pub fn abandon(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
        self.open = false;
    }

    pub fn chunks(&self) -> &[C] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Buffer shared between the controller and the host's notification callbacks
pub type SharedChunks<C> = Rc<RefCell<ChunkBuffer<C>>>;

/// Write handle given to exactly one recorder session
pub struct ChunkSink<C> {
    buffer: SharedChunks<C>,
    generation: u64,
}

impl<C> Clone for ChunkSink<C> {
    fn clone(&self) -> Self {
        Self {
            buffer: Rc::clone(&self.buffer),
            generation: self.generation,
        }
    }
}

impl<C: RecordedChunk> ChunkSink<C> {
    pub fn new(buffer: SharedChunks<C>, generation: u64) -> Self {
        Self { buffer, generation }
    }

    /// Data-available notification
    pub fn deliver(&self, chunk: C) -> ChunkOutcome {
        let len = chunk.byte_len();
        let outcome = self.buffer.borrow_mut().accept(self.generation, chunk);
        match outcome {
            ChunkOutcome::Appended => {
                tracing::debug!("Recorded chunk of {} bytes", len);
            }
            ChunkOutcome::Discarded => {
                tracing::trace!("Discarding empty chunk");
            }
            ChunkOutcome::Stale => {
                tracing::debug!(
                    "Ignoring {} byte chunk from stale session {}",
                    len,
                    self.generation
                );
            }
        }
        outcome
    }

    /// Stop notification: the session has flushed its last chunk.
    pub fn finish(&self) {
        if self.buffer.borrow_mut().seal(self.generation) {
            tracing::debug!("Recorder session {} finished", self.generation);
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn buffer(&self) -> Ref<'_, ChunkBuffer<C>> {
        self.buffer.borrow()
    }
}
