//! # rtmp-future-ext
//!
//! A single extension trait for imposing a wall-clock deadline on any
//! future, used throughout the publisher for connect/write/handshake/ack
//! timeouts instead of each call site hand-rolling a `tokio::select!`.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`

use std::future::Future;
use std::time::Duration;

use tokio::time::error::Elapsed;

pub trait FutureExt: Future + Sized {
    /// Await this future, racing it against `duration`. A `duration` of
    /// zero is treated as "no deadline" (the future is awaited directly)
    /// rather than failing instantly, matching the "zero means use a
    /// sane default elsewhere" convention the write-timeout setting uses.
    fn with_timeout(self, duration: Duration) -> impl Future<Output = Result<Self::Output, Elapsed>> {
        async move {
            if duration.is_zero() {
                Ok(self.await)
            } else {
                tokio::time::timeout(duration, self).await
            }
        }
    }
}

impl<F: Future> FutureExt for F {}
