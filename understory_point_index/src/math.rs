// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float functions that live in `std` (or `libm` for `no_std` builds).

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_point_index requires either the `std` or the `libm` feature");

#[cfg(feature = "std")]
#[inline]
pub(crate) fn log10(v: f64) -> f64 {
    v.log10()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn log10(v: f64) -> f64 {
    libm::log10(v)
}

#[cfg(feature = "std")]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    v.sqrt()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    libm::sqrt(v)
}
