// rust/ttlc-arena/src/page.rs
// Page-aligned backing region with no-access head and tail guard pages

use crate::error::{ArenaError, ArenaResult};

/// Page-aligned region: [guard][payload pages][guard].
///
/// The payload spans `size` usable bytes starting one page past the
/// mapping base. Head and tail pages are PROT_NONE so stray writes
/// fault instead of corrupting neighbouring allocations.
pub struct GuardedRegion {
    base: *mut u8,
    map_len: usize,
    size: usize,
    page: usize,
}

// The region is uniquely owned; the raw pointer never escapes.
unsafe impl Send for GuardedRegion {}

#[cfg(unix)]
impl GuardedRegion {
    pub fn new(size: usize) -> ArenaResult<Self> {
        let page = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
        let payload = size.div_ceil(page) * page;
        let map_len = payload + 2 * page;

        let base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(ArenaError::GuardProtect(errno()));
        }
        let base = base as *mut u8;

        // Head and tail pages become no-access; failure unwinds the mapping.
        let head = unsafe { libc::mprotect(base as *mut libc::c_void, page, libc::PROT_NONE) };
        let tail = unsafe {
            libc::mprotect(
                base.add(page + payload) as *mut libc::c_void,
                page,
                libc::PROT_NONE,
            )
        };
        if head != 0 || tail != 0 {
            let code = errno();
            unsafe { libc::munmap(base as *mut libc::c_void, map_len) };
            return Err(ArenaError::GuardProtect(code));
        }

        Ok(Self {
            base,
            map_len,
            size,
            page,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.base.add(self.page), self.size) }
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.base.add(self.page), self.size) }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(unix)]
impl Drop for GuardedRegion {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.base as *mut libc::c_void, self.map_len);
        }
    }
}

#[cfg(unix)]
fn errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

#[cfg(not(unix))]
impl GuardedRegion {
    pub fn new(_size: usize) -> ArenaResult<Self> {
        Err(ArenaError::GuardUnsupported)
    }

    pub fn bytes(&self) -> &[u8] {
        &[]
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut []
    }

    pub fn size(&self) -> usize {
        0
    }
}
