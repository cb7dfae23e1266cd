use std::alloc::{GlobalAlloc, Layout, System};

use crate::tracker;

/// Global allocator hook: forwards every request to [`System`] and reports it
/// to the installed tracker.
///
/// Install it once at crate root, then hold a [`LeakGuard`](crate::LeakGuard)
/// for the region you want tracked:
///
/// ```rust,ignore
/// #[global_allocator]
/// static GLOBAL: leaktrail::TrackingAllocator = leaktrail::TrackingAllocator;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let guard = leaktrail::GuardBuilder::new("main").build()?;
///     // tracked region
///     drop(guard);
///     Ok(())
/// }
/// ```
///
/// Requests made while no tracker is installed, and the tracker's own
/// bookkeeping allocations, pass straight through to the raw allocator.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            tracker::notify_alloc(ptr as usize, layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        tracker::notify_dealloc(ptr as usize);
        unsafe {
            System.dealloc(ptr, layout);
        }
    }

    // realloc and alloc_zeroed use the default implementations, which route
    // through alloc/dealloc above and keep the event logs consistent.
}
