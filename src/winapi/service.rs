use std::time::{Duration, Instant};

use crate::error::Error;

/// How long to wait for a service to reach the stopped state, and how often
/// to re-query it while waiting.
#[derive(Clone, Copy)]
pub struct Timing {
    pub stop_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            stop_wait: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Connection to the service control manager.
pub trait ScManager {
    type Service: ScService;

    fn open_service(&self, name: &str) -> Result<Self::Service, Error>;
}

/// An open handle to a single service. Dropping the value releases the
/// handle, so every exit path out of [`poke_with`] closes what it opened.
pub trait ScService {
    /// Send a stop control. Best effort: a service that rejects the control
    /// (already stopped, not accepting controls) looks the same to us as one
    /// that takes a while, and the poll loop decides either way.
    fn send_stop(&self);

    /// Query the current run state. A failed query reports `false`; the
    /// caller retries until its deadline.
    fn is_stopped(&self) -> bool;

    fn delete(&self) -> Result<(), Error>;
}

/// Stop and/or delete the named service.
///
/// Stops first when both flags are set. A failure partway through is not
/// rolled back: stop succeeding and delete failing leaves the service
/// stopped but still registered.
pub fn poke_with<M: ScManager>(
    manager: M,
    service_name: &str,
    stop_service: bool,
    delete_service: bool,
    timing: Timing,
) -> Result<(), Error> {
    log::debug!("Opening handle to service {:?}", service_name);
    let service = manager.open_service(service_name)?;

    if stop_service {
        log::info!("Stopping service");
        service.send_stop();
        wait_until_stopped(&service, timing)?;
        log::info!("Successfully stopped service");
    }

    if delete_service {
        log::info!("Deleting service");
        service.delete()?;
        log::info!("Successfully deleted service");
    }

    Ok(())
}

fn wait_until_stopped<S: ScService>(service: &S, timing: Timing) -> Result<(), Error> {
    let deadline = Instant::now() + timing.stop_wait;

    loop {
        if service.is_stopped() {
            return Ok(());
        }

        if Instant::now() > deadline {
            return Err(Error::StopTimeout);
        }

        std::thread::sleep(timing.poll_interval);
    }
}

#[cfg(windows)]
mod sys {
    use std::mem;

    use widestring::U16CString;
    use windows::core::PCWSTR;
    use windows::Win32::Security::SC_HANDLE;
    use windows::Win32::System::Services::{
        CloseServiceHandle, ControlService, DeleteService, OpenSCManagerW, OpenServiceW,
        QueryServiceStatusEx, SC_MANAGER_ALL_ACCESS, SC_STATUS_PROCESS_INFO, SERVICE_ALL_ACCESS,
        SERVICE_CONTROL_STOP, SERVICE_STATUS, SERVICE_STATUS_PROCESS, SERVICE_STOPPED,
    };

    use super::{ScManager, ScService};
    use crate::error::Error;

    struct ScHandle(SC_HANDLE);

    impl Drop for ScHandle {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseServiceHandle(self.0);
            }
        }
    }

    pub struct ServiceManager(ScHandle);

    impl ServiceManager {
        pub fn open() -> Result<Self, Error> {
            let handle = unsafe { OpenSCManagerW(None, None, SC_MANAGER_ALL_ACCESS) }
                .map_err(|e| Error::os_call("OpenSCManagerW", e))?;
            Ok(ServiceManager(ScHandle(handle)))
        }
    }

    impl ScManager for ServiceManager {
        type Service = Service;

        fn open_service(&self, name: &str) -> Result<Service, Error> {
            let wide = U16CString::from_str(name).map_err(|_| Error::InvalidServiceName)?;
            let handle = unsafe {
                OpenServiceW(
                    self.0 .0,
                    PCWSTR::from_raw(wide.as_ptr()),
                    SERVICE_ALL_ACCESS,
                )
            }
            .map_err(|e| Error::os_call("OpenServiceW", e))?;
            Ok(Service(ScHandle(handle)))
        }
    }

    pub struct Service(ScHandle);

    impl ScService for Service {
        fn send_stop(&self) {
            let mut status = SERVICE_STATUS::default();
            unsafe {
                let _ = ControlService(self.0 .0, SERVICE_CONTROL_STOP, &mut status);
            }
        }

        fn is_stopped(&self) -> bool {
            let mut ssp = SERVICE_STATUS_PROCESS::default();
            let mut bytes_needed = 0u32;

            let queried = unsafe {
                let buffer = std::slice::from_raw_parts_mut(
                    &mut ssp as *mut SERVICE_STATUS_PROCESS as *mut u8,
                    mem::size_of::<SERVICE_STATUS_PROCESS>(),
                );
                QueryServiceStatusEx(
                    self.0 .0,
                    SC_STATUS_PROCESS_INFO,
                    Some(buffer),
                    &mut bytes_needed,
                )
            };

            queried.is_ok() && ssp.dwCurrentState == SERVICE_STOPPED
        }

        fn delete(&self) -> Result<(), Error> {
            unsafe { DeleteService(self.0 .0) }.map_err(|e| Error::os_call("DeleteService", e))
        }
    }
}

/// Stop and/or delete a service registered with the local service control
/// manager. Waits up to five seconds for the service to stop.
#[cfg(windows)]
pub fn poke_service(
    service_name: &str,
    stop_service: bool,
    delete_service: bool,
) -> Result<(), Error> {
    let manager = sys::ServiceManager::open()?;
    poke_with(
        manager,
        service_name,
        stop_service,
        delete_service,
        Timing::default(),
    )
}
