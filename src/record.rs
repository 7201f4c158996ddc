//! Fallible heap allocation for provider records.
//!
//! `Box::new` aborts the process when the allocator is exhausted. Provider
//! records are allocated on behalf of the host library, which expects a
//! failed allocation to come back as an error for that one call.

use alloc::alloc::{Layout, alloc_zeroed};
use alloc::boxed::Box;
use alloc::string::String;
use core::mem::MaybeUninit;

use axerrno::{AxError, AxResult};

/// Allocates zeroed, uninitialized storage for one `T`.
///
/// Dropping the returned box releases the storage without running `T`'s
/// destructor.
pub fn try_new_uninit<T>() -> AxResult<Box<MaybeUninit<T>>> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return Ok(Box::new(MaybeUninit::uninit()));
    }

    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { alloc_zeroed(layout) }.cast::<MaybeUninit<T>>();
    if ptr.is_null() {
        return Err(AxError::NoMemory);
    }

    // SAFETY: `ptr` is non-null and was returned by the global allocator for
    // `Layout::new::<T>()`, which is also the layout of `MaybeUninit<T>`.
    Ok(unsafe { Box::from_raw(ptr) })
}

/// Moves `value` into a freshly allocated box, failing instead of aborting
/// when memory is exhausted.
pub fn try_new_box<T>(value: T) -> AxResult<Box<T>> {
    Ok(init_box(try_new_uninit()?, value))
}

/// Moves `value` into storage obtained from [`try_new_uninit`].
pub fn init_box<T>(mut slot: Box<MaybeUninit<T>>, value: T) -> Box<T> {
    slot.write(value);
    // SAFETY: the slot was initialized just above.
    unsafe { slot.assume_init() }
}

/// Copies `s` into a new `String`, failing instead of aborting when memory
/// is exhausted.
pub fn try_clone_str(s: &str) -> AxResult<String> {
    let mut out = String::new();
    out.try_reserve_exact(s.len()).map_err(|_| AxError::NoMemory)?;
    out.push_str(s);
    Ok(out)
}
