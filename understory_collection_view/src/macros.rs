// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(feature = "tracing")]
macro_rules! cv_trace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "understory_collection_view", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cv_trace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! cv_debug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "understory_collection_view", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cv_debug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! cv_warn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "understory_collection_view", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cv_warn {
    ($($tt:tt)*) => {};
}
