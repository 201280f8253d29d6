use glam::Mat4;

use crate::{
    config::ViewerConfig,
    error::RunError,
    game::animator::AnimatedModel,
    main::wgpu_context::WgpuContext,
};

use super::{
    attachments::depth::DepthTexture,
    bindgroups::{
        bones::BonesBinding,
        camera::{CameraBinding, CameraMatrices},
        lights::{LightsBinding, LightsUniform},
    },
    buffers::gpu_mesh::GpuMesh,
    pipelines::skinned::SkinnedPipeline,
};

pub struct Renderer {
    pipeline: SkinnedPipeline,
    camera: CameraBinding,
    lights: LightsBinding,
    bones: BonesBinding,
    mesh: Option<GpuMesh>,
    depth: DepthTexture,
    config: ViewerConfig,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub fn new(wgpu_context: &WgpuContext, model: &AnimatedModel, config: &ViewerConfig) -> Result<Self, RunError> {
        let device = &wgpu_context.device;
        let camera_layout = device.create_bind_group_layout(&CameraBinding::desc());
        let lights_layout = device.create_bind_group_layout(&LightsBinding::desc());
        let bones_layout = device.create_bind_group_layout(&BonesBinding::desc());

        let pipeline = SkinnedPipeline::new(wgpu_context, &camera_layout, &lights_layout, &bones_layout)?;
        let camera = CameraBinding::new(
            device,
            &camera_layout,
            &CameraMatrices::from_config(config, wgpu_context.aspect()),
        );
        let lights = LightsBinding::new(device, &lights_layout, &LightsUniform::from_config(config));
        let bones = BonesBinding::new(&bones_layout, device, model.skeleton().bone_count());
        let mesh = GpuMesh::new(device, model.mesh());
        let depth = DepthTexture::new(device, &wgpu_context.surface_config);
        let [r, g, b] = config.clear_color;

        Ok(Self {
            pipeline,
            camera,
            lights,
            bones,
            mesh,
            depth,
            config: config.clone(),
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
        })
    }

    /// Call after the surface was reconfigured.
    pub fn resize(&mut self, wgpu_context: &WgpuContext) {
        self.depth = DepthTexture::new(&wgpu_context.device, &wgpu_context.surface_config);
        self.camera.update(
            &CameraMatrices::from_config(&self.config, wgpu_context.aspect()),
            &wgpu_context.queue,
        );
    }

    /// Uploads the skinning matrices, then draws the model. A rejected upload leaves
    /// only the clear colour on screen for that frame.
    pub fn render(&mut self, wgpu_context: &WgpuContext, skinning: &[Mat4]) -> Result<(), wgpu::SurfaceError> {
        let skinned = self.bones.set_bone_matrices(skinning, &wgpu_context.queue);

        let output = wgpu_context.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = wgpu_context.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Skinned Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(mesh) = self.mesh.as_ref().filter(|_| skinned) {
                render_pass.set_pipeline(&self.pipeline.render_pipeline);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                render_pass.set_bind_group(1, &self.lights.bind_group, &[]);
                render_pass.set_bind_group(2, &self.bones.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        wgpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
