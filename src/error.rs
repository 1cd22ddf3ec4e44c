use thiserror::Error;

/// Everything that can go wrong while poking a service or resolving the
/// module path. OS failures always carry the API name and the Win32 error
/// code so a log line is enough to diagnose them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("{call} failed with OS error {code}")]
    OsCall { call: &'static str, code: u32 },

    #[error("timed out waiting for the service to stop")]
    StopTimeout,

    #[error("module path exceeds {0} characters")]
    PathTooLong(usize),

    #[error("service name contains an interior nul character")]
    InvalidServiceName,
}

impl Error {
    /// Capture the calling thread's last OS error for calls that signal
    /// failure through their return value rather than a `Result`.
    pub(crate) fn last_os_call(call: &'static str) -> Self {
        let code = std::io::Error::last_os_error()
            .raw_os_error()
            .unwrap_or(0) as u32;
        Error::OsCall { call, code }
    }

    /// The `windows` crate wraps `GetLastError` into an HRESULT; the low
    /// word is the original Win32 code.
    #[cfg(windows)]
    pub(crate) fn os_call(call: &'static str, source: windows::core::Error) -> Self {
        Error::OsCall {
            call,
            code: (source.code().0 as u32) & 0xFFFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn os_call_display_names_the_call_and_code() {
        let err = Error::OsCall {
            call: "DeleteService",
            code: 5,
        };
        assert_eq!(err.to_string(), "DeleteService failed with OS error 5");
    }

    #[test]
    fn path_too_long_display_names_the_cap() {
        assert_eq!(
            Error::PathTooLong(32768).to_string(),
            "module path exceeds 32768 characters"
        );
    }
}
