//! Remote code queue for `no_std` environments.
//!
//! The IR decoder usually finishes a frame inside an interrupt handler. It
//! pushes the raw code here and the control loop drains the queue through
//! [`RemoteDecoder`]. Interrupt safe via critical sections.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::RemoteDecoder;

/// Error returned when trying to send to a full channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError(pub u32);

/// Bounded queue of raw remote codes.
///
/// Backed by a fixed-size `heapless::Deque`.
pub struct RemoteChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<u32, SIZE>>>,
}

impl<const SIZE: usize> RemoteChannel<SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for the decoder side.
    pub const fn sender(&self) -> RemoteSender<'_, SIZE> {
        RemoteSender { channel: self }
    }

    /// Get a receiver handle for the control loop.
    pub const fn receiver(&self) -> RemoteReceiver<'_, SIZE> {
        RemoteReceiver { channel: self }
    }

    /// Try to queue a code.
    ///
    /// Returns `Err(TrySendError(code))` if the channel is full.
    pub fn try_send(&self, code: u32) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(code).map_err(TrySendError)
        })
    }

    /// Take the oldest queued code.
    pub fn try_receive(&self) -> Option<u32> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front()
        })
    }

    /// Drop every queued code.
    pub fn clear(&self) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).borrow_mut().clear();
        });
    }
}

impl<const SIZE: usize> Default for RemoteChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender handle of a [`RemoteChannel`].
#[derive(Clone, Copy)]
pub struct RemoteSender<'a, const SIZE: usize> {
    channel: &'a RemoteChannel<SIZE>,
}

impl<const SIZE: usize> RemoteSender<'_, SIZE> {
    /// Try to queue a code.
    ///
    /// Returns `Err(TrySendError(code))` if the channel is full.
    pub fn try_send(&self, code: u32) -> Result<(), TrySendError> {
        self.channel.try_send(code)
    }
}

/// Receiver handle of a [`RemoteChannel`].
///
/// Yields one code per [`RemoteDecoder::poll`].
#[derive(Clone, Copy)]
pub struct RemoteReceiver<'a, const SIZE: usize> {
    channel: &'a RemoteChannel<SIZE>,
}

impl<const SIZE: usize> RemoteDecoder for RemoteReceiver<'_, SIZE> {
    fn poll(&mut self) -> Option<u32> {
        self.channel.try_receive()
    }
}
