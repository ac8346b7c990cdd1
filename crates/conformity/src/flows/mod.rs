//! The two submissions: analysis upload and spreadsheet conversion.

use std::sync::atomic::{AtomicBool, Ordering};

pub mod convert;
pub mod upload;

pub use convert::ConvertFlow;
pub use upload::UploadFlow;

/// One-at-a-time flag for a flow's submit control.
#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
  /// Claim the flag, or `None` if a submission already holds it.
  pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
    self
      .0
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| InFlightGuard(&self.0))
  }

  pub fn is_active(&self) -> bool {
    self.0.load(Ordering::Acquire)
  }
}

/// Releases the in-flight flag when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}
