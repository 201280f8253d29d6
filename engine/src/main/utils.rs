use crate::error::RunError;

/// Compiles WGSL inside a validation error scope so a broken shader is reported instead of panicking later.
pub fn create_shader_module(device: &wgpu::Device, label: &str, source: &str) -> Result<wgpu::ShaderModule, RunError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::FutureExt::block_on(device.pop_error_scope()) {
        Some(e) => Err(RunError::Gpu(format!("shader '{label}' failed to compile: {e}"))),
        None => Ok(shader),
    }
}
