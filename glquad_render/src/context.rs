use std::cell::{Cell, RefCell};
use std::fmt;
use std::process;
use std::rc::Rc;

use crate::device::Device;
use crate::error::{DeviceResult, ErrorPolicy, RenderError, Result};

/// A shared handle to the device every resource talks to, plus the policy for errors.
///
/// Cloning is cheap; every resource keeps a clone so it can clean up after itself on drop. The
/// context is `!Send`: device handles are only valid on the thread owning the graphics context.
#[derive(Clone)]
pub struct Context {
    device: Rc<RefCell<dyn Device>>,
    policy: ErrorPolicy,
    max_texture_units: Rc<Cell<Option<u32>>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("device", &self.device.borrow().name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Context {
    pub fn new<D: Device + 'static>(device: D, policy: ErrorPolicy) -> Self {
        Self::from_shared(Rc::new(RefCell::new(device)), policy)
    }

    /// Wraps a device the caller keeps a handle to, e.g. to inspect a
    /// [`HeadlessDevice`](crate::HeadlessDevice) afterwards.
    pub fn from_shared(device: Rc<RefCell<dyn Device>>, policy: ErrorPolicy) -> Self {
        log::debug!("created {} context, errors are {:?}", device.borrow().name(), policy);

        Self {
            device,
            policy,
            max_texture_units: Rc::new(Cell::new(None)),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Runs `f` against the device and applies the error policy to whatever it reports.
    pub fn with_device<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Device) -> DeviceResult<T>,
    {
        let result = f(&mut *self.device.borrow_mut());
        result.map_err(|e| self.report(e.into()))
    }

    /// Logs `err` and, under [`ErrorPolicy::Fatal`], terminates the process. Otherwise the error
    /// is handed back for the caller to return.
    pub fn report(&self, err: RenderError) -> RenderError {
        for line in err.diagnostics() {
            log::error!("{}", line);
        }

        match self.policy {
            ErrorPolicy::Fatal => {
                log::error!("exiting after unrecoverable rendering error");
                process::exit(1)
            }
            ErrorPolicy::Propagate => err,
        }
    }

    /// Like [`with_device`](Self::with_device), for cleanup paths that can't return errors:
    /// failures are logged and otherwise ignored, whatever the policy.
    pub(crate) fn release<F>(&self, what: &str, f: F)
    where
        F: FnOnce(&mut dyn Device) -> DeviceResult<()>,
    {
        let mut device = match self.device.try_borrow_mut() {
            Ok(device) => device,
            Err(_) => {
                log::warn!("device busy, leaking {}", what);
                return;
            }
        };

        if let Err(e) = f(&mut *device) {
            log::warn!("failed to release {}: {}", what, e);
        } else {
            log::trace!("released {}", what);
        }
    }

    /// The number of texture units the device supports. Queried once, then remembered.
    pub fn max_texture_units(&self) -> Result<u32> {
        if let Some(units) = self.max_texture_units.get() {
            return Ok(units);
        }

        let units = self.with_device(|d| d.max_texture_units())?;
        self.max_texture_units.set(Some(units));
        Ok(units)
    }
}
