/// GpuContext - shared driver access for every Nebula GL resource
///
/// Bundles the driver with the configuration. Buffers and programs keep an
/// `Rc<GpuContext>` so they can release their handles on drop. The `Rc`
/// keeps every resource on the thread that owns the GL context.

use std::fmt;
use std::rc::Rc;

use crate::config::Config;
use crate::device::GraphicsDevice;
use crate::error::Result;
use crate::guard::{checked_call, CallSite};

/// Shared GPU context
pub struct GpuContext {
    device: Rc<dyn GraphicsDevice>,
    config: Config,
}

impl GpuContext {
    /// Create a context around an initialized driver
    ///
    /// The GL context behind `device` must already be current on this thread.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::rc::Rc;
    /// use nebula_gl::nebula::{Config, device::{GpuContext, MockDevice}};
    ///
    /// let context = GpuContext::new(Rc::new(MockDevice::new()), Config::default());
    /// ```
    pub fn new(device: Rc<dyn GraphicsDevice>, config: Config) -> Rc<Self> {
        crate::nebula_info!("nebula::GpuContext", "Attached to driver: {}", device.version());
        if !config.check_gpu_errors {
            crate::nebula_debug!("nebula::GpuContext", "GPU error checks disabled");
        }
        Rc::new(Self { device, config })
    }

    /// Raw driver access (calls made here are not checked)
    pub fn device(&self) -> &dyn GraphicsDevice {
        &*self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Invoke a driver call through the error guard
    ///
    /// With `check_gpu_errors` disabled the call runs directly and always succeeds.
    /// Prefer the `gl_call!` macro, which fills in the call site.
    pub fn call<T, F>(&self, site: CallSite, call: F) -> Result<T>
    where
        F: FnOnce(&dyn GraphicsDevice) -> T,
    {
        if self.config.check_gpu_errors {
            checked_call(&*self.device, site, call)
        } else {
            Ok(call(&*self.device))
        }
    }
}

impl fmt::Debug for GpuContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
