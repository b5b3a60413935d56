//! Rendering capability probe
//!
//! The viewer asks for a GPU adapter before building the 3D app. When none
//! is available the caller switches to the textual fallback listing; the
//! failure is recoverable, never fatal to the process.

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("no compatible GPU adapter available: {0}")]
    NoAdapter(String),
}

/// Probe for a usable GPU adapter.
pub fn probe_render_support() -> Result<(), CapabilityError> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    match pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())) {
        Ok(adapter) => {
            debug!(adapter = ?adapter.get_info().name, "render capability probe succeeded");
            Ok(())
        }
        Err(err) => Err(CapabilityError::NoAdapter(err.to_string())),
    }
}
