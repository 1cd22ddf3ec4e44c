use crate::error::Error;

// MAX_PATH is the common case; long-path-aware processes can see up to
// 32767 characters, so the growth loop is capped just above that.
const INITIAL_CAPACITY: usize = 260;
const MAX_CAPACITY: usize = 32 * 1024;

/// Buffer-growth loop shared by the platform entry point and the tests.
///
/// `fill` writes a path into the buffer and reports how many UTF-16 units it
/// wrote. A written count equal to the buffer size is ambiguous (the OS may
/// have truncated), so the buffer doubles and the call is retried until the
/// path fits with room to spare or the capacity cap is hit.
pub fn resolve_with<F>(mut fill: F) -> Result<Vec<u16>, Error>
where
    F: FnMut(&mut [u16]) -> Result<u32, Error>,
{
    let mut buffer = vec![0u16; INITIAL_CAPACITY];

    loop {
        let written = fill(&mut buffer)? as usize;

        if written < buffer.len() {
            buffer.truncate(written);
            return Ok(buffer);
        }

        if buffer.len() >= MAX_CAPACITY {
            return Err(Error::PathTooLong(MAX_CAPACITY));
        }

        let grown = (buffer.len() * 2).min(MAX_CAPACITY);
        log::debug!("module path buffer grown to {}", grown);
        buffer.resize(grown, 0);
    }
}

/// Path of the executable backing the current process.
#[cfg(windows)]
pub fn process_module_path() -> Result<std::path::PathBuf, Error> {
    use std::os::windows::ffi::OsStringExt;

    use windows::Win32::Foundation::HMODULE;
    use windows::Win32::System::LibraryLoader::GetModuleFileNameW;

    let units = resolve_with(|buffer| {
        let written = unsafe { GetModuleFileNameW(HMODULE::default(), buffer) };
        if written == 0 {
            Err(Error::last_os_call("GetModuleFileNameW"))
        } else {
            Ok(written)
        }
    })?;

    Ok(std::ffi::OsString::from_wide(&units).into())
}
