//! Bounded in-memory byte channels.
//!
//! A [`ByteChannel`] stands in for one direction of a socket between the two
//! handshake endpoints. It is a plain FIFO with a hard capacity; there is no
//! locking because the scheduler drives everything from a single thread.
//!
//! Both directions of a connection are grouped in a [`Wire`], and an endpoint
//! only ever sees the pair of channels bound to its role through a
//! [`ChannelPair`].

use std::collections::VecDeque;
use std::io;

use crate::endpoint::Role;
use crate::error::WouldBlock;

/// Default capacity of a channel, one maximum-size TLS plaintext record.
pub const CHANNEL_CAPACITY: usize = 16 * 1024;

/// Bounded FIFO byte queue.
#[derive(Debug, Clone)]
pub struct ByteChannel {
    buf: VecDeque<u8>,
    capacity: usize,
}

impl ByteChannel {
    /// Creates an empty channel holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates an empty channel with [`CHANNEL_CAPACITY`].
    pub fn with_default_capacity() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }

    /// Bytes currently queued.
    pub fn available(&self) -> usize {
        self.buf.len()
    }

    /// Maximum number of queued bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that a `write` would accept right now.
    pub fn free_space(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buf.len() == self.capacity
    }

    /// Appends as much of `bytes` as fits and returns the count written.
    ///
    /// A full channel yields `Err(WouldBlock)`; an empty `bytes` on a channel
    /// with room yields `Ok(0)`.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, WouldBlock> {
        let room = self.free_space();
        if room == 0 {
            return Err(WouldBlock);
        }
        let n = bytes.len().min(room);
        self.buf.extend(&bytes[..n]);
        Ok(n)
    }

    /// Removes up to `max_len` bytes from the front.
    pub fn read(&mut self, max_len: usize) -> Result<Vec<u8>, WouldBlock> {
        if self.buf.is_empty() {
            return Err(WouldBlock);
        }
        let n = max_len.min(self.buf.len());
        Ok(self.buf.drain(..n).collect())
    }

    /// Copies up to `max_len` bytes from the front without removing them.
    pub fn peek(&self, max_len: usize) -> Vec<u8> {
        self.buf.iter().take(max_len).copied().collect()
    }

    /// Fills `dst` from the front of the queue and returns the count copied.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<usize, WouldBlock> {
        if self.buf.is_empty() {
            return Err(WouldBlock);
        }
        let n = dst.len().min(self.buf.len());
        for (slot, byte) in dst.iter_mut().zip(self.buf.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Default for ByteChannel {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl io::Write for ByteChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ByteChannel::write(self, buf).map_err(|_| io::ErrorKind::WouldBlock.into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for ByteChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf)
            .map_err(|_| io::ErrorKind::WouldBlock.into())
    }
}

/// The two channels connecting a client and a server.
#[derive(Debug, Clone)]
pub struct Wire {
    /// Client-to-server direction.
    pub c2s: ByteChannel,
    /// Server-to-client direction.
    pub s2c: ByteChannel,
}

impl Wire {
    pub fn new(capacity: usize) -> Self {
        Self {
            c2s: ByteChannel::new(capacity),
            s2c: ByteChannel::new(capacity),
        }
    }

    /// Borrows the channels bound to `role`: the client writes `c2s` and
    /// reads `s2c`, the server the other way round.
    pub fn link(&mut self, role: Role) -> ChannelPair<'_> {
        match role {
            Role::Client => ChannelPair {
                inbound: &mut self.s2c,
                outbound: &mut self.c2s,
            },
            Role::Server => ChannelPair {
                inbound: &mut self.c2s,
                outbound: &mut self.s2c,
            },
        }
    }

    /// Total bytes in flight in both directions.
    pub fn in_flight(&self) -> usize {
        self.c2s.available() + self.s2c.available()
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

/// One endpoint's view of the wire for the duration of a step.
#[derive(Debug)]
pub struct ChannelPair<'a> {
    pub inbound: &'a mut ByteChannel,
    pub outbound: &'a mut ByteChannel,
}
