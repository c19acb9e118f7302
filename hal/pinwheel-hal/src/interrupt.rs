//! Interrupt controller abstraction
//!
//! The minimal slice of an NVIC-style controller a driver needs to own one
//! interrupt line: mask it, drop a stale pending request, pick a priority
//! and unmask it again.

/// Interrupt controller
pub trait InterruptController {
    /// Identifier of one interrupt line
    type Line: Copy;

    /// Mask `line`; requests stay pending until it is enabled again
    fn disable_line(&mut self, line: Self::Line);

    /// Drop a pending request on `line`
    fn clear_pending(&mut self, line: Self::Line);

    /// Set the logical priority of `line` (0 is the most urgent)
    fn set_priority(&mut self, line: Self::Line, level: u8);

    /// Unmask `line`
    fn enable_line(&mut self, line: Self::Line);
}
