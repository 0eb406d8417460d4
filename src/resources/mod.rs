//! Bridge-owned resources - strings and sequences handed to the host
//!
//! Design: every string or sequence result is a fresh, refcounted entry.
//! The caller owns one reference on return and gives it back with
//! [`ResourceTable::release`]. A released handle goes stale instead of
//! dangling, so a double release is reported, not undefined.

mod slots;

pub use slots::SlotMap;

use crate::errors::{BridgeError, Result};
use crate::handle::{Handle, HandleKind, Native, RawRef, SequenceHandle, StringHandle};
use crate::logging::{log_allocation, log_leak, log_release};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

struct Entry<T> {
    value: T,
    refs: u32,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self { value, refs: 1 }
    }
}

struct Sequence {
    element: HandleKind,
    items: Box<[Handle]>,
}

/// Snapshot of resource usage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceStats {
    pub live_strings: usize,
    pub live_sequences: usize,
    pub allocated: u64,
    pub released: u64,
}

pub struct ResourceTable {
    strings: Mutex<SlotMap<Entry<Box<str>>>>,
    sequences: Mutex<SlotMap<Entry<Sequence>>>,
    max_live: Option<usize>,
    report_leaks: bool,
    allocated: AtomicU64,
    released: AtomicU64,
}

impl ResourceTable {
    pub fn new() -> Self {
        Self::with_limits(None, true)
    }

    /// `max_live` caps live entries per kind; `report_leaks` logs entries
    /// still alive when the table is dropped.
    pub fn with_limits(max_live: Option<usize>, report_leaks: bool) -> Self {
        Self {
            strings: Mutex::new(SlotMap::new()),
            sequences: Mutex::new(SlotMap::new()),
            max_live,
            report_leaks,
            allocated: AtomicU64::new(0),
            released: AtomicU64::new(0),
        }
    }

    fn check_limit(&self, kind: HandleKind, live: usize) -> Result<()> {
        match self.max_live {
            Some(max) if live >= max => Err(BridgeError::ResourceLimit { kind, live }),
            _ => Ok(()),
        }
    }

    /// Copy `value` into a new owned entry.
    pub fn alloc_string(&self, value: impl Into<Box<str>>) -> Result<StringHandle> {
        let value = value.into();
        let len = value.len();

        let mut strings = self.strings.lock();
        self.check_limit(HandleKind::String, strings.len())?;
        let handle = StringHandle::from_raw(strings.insert(Entry::new(value)));
        drop(strings);

        self.allocated.fetch_add(1, Ordering::Relaxed);
        log_allocation(handle.handle(), len);
        Ok(handle)
    }

    /// Box `items` into a new owned sequence of `element` handles.
    pub fn alloc_sequence(&self, element: HandleKind, items: Vec<Handle>) -> Result<SequenceHandle> {
        let len = items.len();
        let sequence = Sequence { element, items: items.into_boxed_slice() };

        let mut sequences = self.sequences.lock();
        self.check_limit(HandleKind::Sequence, sequences.len())?;
        let handle = SequenceHandle::from_raw(sequences.insert(Entry::new(sequence)));
        drop(sequences);

        self.allocated.fetch_add(1, Ordering::Relaxed);
        log_allocation(handle.handle(), len);
        Ok(handle)
    }

    fn stale(kind: HandleKind, raw: RawRef) -> BridgeError {
        BridgeError::StaleHandle { kind, index: raw.index, generation: raw.generation }
    }

    /// Run `f` on the string without copying it out.
    pub fn with_string<R>(&self, handle: StringHandle, f: impl FnOnce(&str) -> R) -> Result<R> {
        let strings = self.strings.lock();
        strings
            .get(handle.raw())
            .map(|entry| f(&entry.value))
            .ok_or_else(|| Self::stale(HandleKind::String, handle.raw()))
    }

    pub fn string(&self, handle: StringHandle) -> Result<String> {
        self.with_string(handle, str::to_owned)
    }

    fn with_sequence<R>(&self, handle: SequenceHandle, f: impl FnOnce(&Sequence) -> R) -> Result<R> {
        let sequences = self.sequences.lock();
        sequences
            .get(handle.raw())
            .map(|entry| f(&entry.value))
            .ok_or_else(|| Self::stale(HandleKind::Sequence, handle.raw()))
    }

    pub fn sequence_len(&self, handle: SequenceHandle) -> Result<usize> {
        self.with_sequence(handle, |seq| seq.items.len())
    }

    pub fn sequence_element_kind(&self, handle: SequenceHandle) -> Result<HandleKind> {
        self.with_sequence(handle, |seq| seq.element)
    }

    pub fn sequence_get(&self, handle: SequenceHandle, index: usize) -> Result<Handle> {
        self.with_sequence(handle, |seq| {
            seq.items
                .get(index)
                .copied()
                .ok_or(BridgeError::IndexOutOfBounds { index, len: seq.items.len() })
        })?
    }

    pub fn sequence_items(&self, handle: SequenceHandle) -> Result<Vec<Handle>> {
        self.with_sequence(handle, |seq| seq.items.to_vec())
    }

    /// Whether `handle` names a live entry of this table.
    pub fn is_live(&self, handle: Handle) -> bool {
        match handle.kind() {
            Some(HandleKind::String) => self.strings.lock().contains(handle.raw()),
            Some(HandleKind::Sequence) => self.sequences.lock().contains(handle.raw()),
            _ => false,
        }
    }

    /// Add a reference, returning the new count.
    pub fn retain(&self, handle: Handle) -> Result<u32> {
        let raw = handle.raw();
        match handle.kind() {
            Some(HandleKind::String) => {
                let mut strings = self.strings.lock();
                let entry = strings.get_mut(raw).ok_or_else(|| Self::stale(HandleKind::String, raw))?;
                entry.refs += 1;
                Ok(entry.refs)
            }
            Some(HandleKind::Sequence) => {
                let mut sequences = self.sequences.lock();
                let entry = sequences.get_mut(raw).ok_or_else(|| Self::stale(HandleKind::Sequence, raw))?;
                entry.refs += 1;
                Ok(entry.refs)
            }
            _ => Err(Self::not_owned(handle)),
        }
    }

    /// Drop a reference, freeing the entry when it reaches zero. Returns the
    /// remaining count.
    pub fn release(&self, handle: Handle) -> Result<u32> {
        let raw = handle.raw();
        let remaining = match handle.kind() {
            Some(HandleKind::String) => release_in(&mut self.strings.lock(), HandleKind::String, raw)?,
            Some(HandleKind::Sequence) => {
                release_in(&mut self.sequences.lock(), HandleKind::Sequence, raw)?
            }
            _ => return Err(Self::not_owned(handle)),
        };

        if remaining == 0 {
            self.released.fetch_add(1, Ordering::Relaxed);
            log_release(handle);
        }
        Ok(remaining)
    }

    // Backend-owned or malformed handle passed where a resource is expected
    fn not_owned(handle: Handle) -> BridgeError {
        if handle.is_null() {
            return BridgeError::NullHandle { expected: HandleKind::String };
        }
        BridgeError::HandleKindMismatch {
            expected: HandleKind::String,
            found: handle
                .kind()
                .map_or_else(|| format!("tag {}", handle.tag()), |kind| kind.name().to_string()),
        }
    }

    pub fn stats(&self) -> ResourceStats {
        ResourceStats {
            live_strings: self.strings.lock().len(),
            live_sequences: self.sequences.lock().len(),
            allocated: self.allocated.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
        }
    }
}

fn release_in<T>(map: &mut SlotMap<Entry<T>>, kind: HandleKind, raw: RawRef) -> Result<u32> {
    let entry = map.get_mut(raw).ok_or_else(|| ResourceTable::stale(kind, raw))?;
    entry.refs -= 1;
    let remaining = entry.refs;
    if remaining == 0 {
        map.remove(raw);
    }
    Ok(remaining)
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResourceTable {
    fn drop(&mut self) {
        if !self.report_leaks {
            return;
        }
        let stats = self.stats();
        if stats.live_strings + stats.live_sequences > 0 {
            log_leak(stats.live_strings, stats.live_sequences);
        }
    }
}
