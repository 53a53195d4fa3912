//! Opaque instanced-geometry pass.
//!
//! Clears color + depth, binds the scene uniform at group 0, then issues one
//! instanced draw per `InstancedDraw` in the `FramePacket`: a direct
//! `draw_indexed` when the count is known on the CPU, `draw_indexed_indirect`
//! when the culling kernel wrote it.
use std::sync::Arc;

use wgpu::{
    Color, CommandEncoder, Device, LoadOp, Operations, Queue, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, StoreOp, TextureView,
};

use crate::graph::{DrawCount, FramePacket, RenderPass};
use crate::pipeline::{InstancedPipeline, PipelineLayouts};

pub struct InstancedPass {
    layouts: PipelineLayouts,
    /// Built in `on_attach`, once the target format is known.
    pipeline: Option<InstancedPipeline>,
    scene_bind_group: Arc<wgpu::BindGroup>,
    /// Sky / clear color.
    pub clear_color: Color,
}

impl InstancedPass {
    pub fn new(layouts: PipelineLayouts, scene_bind_group: Arc<wgpu::BindGroup>) -> Self {
        Self {
            layouts,
            pipeline: None,
            scene_bind_group,
            clear_color: Color { r: 0.1, g: 0.2, b: 0.3, a: 1.0 },
        }
    }
}

impl RenderPass for InstancedPass {
    fn name(&self) -> &str {
        "Instanced Opaque Pass"
    }

    fn on_attach(
        &mut self,
        device: &Device,
        _queue: &Queue,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) {
        self.pipeline = Some(InstancedPipeline::new(
            device,
            format,
            sample_count,
            self.layouts.clone(),
        ));
    }

    fn prepare(&mut self, _device: &Device, _queue: &Queue, _packet: &FramePacket) {}

    fn execute(
        &mut self,
        _device: &Device,
        _queue: &Queue,
        encoder: &mut CommandEncoder,
        color_view: &TextureView,
        depth_view: Option<&TextureView>,
        packet: &FramePacket,
    ) {
        let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(self.name()),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(self.clear_color),
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: depth_view.map(|v| RenderPassDepthStencilAttachment {
                view: v,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = &self.pipeline else {
            return;
        };

        if let Some(vp) = &packet.viewport {
            rpass.set_viewport(
                vp.x as f32,
                vp.y as f32,
                vp.width as f32,
                vp.height as f32,
                0.0,
                1.0,
            );
            rpass.set_scissor_rect(vp.x, vp.y, vp.width, vp.height);
        }

        rpass.set_pipeline(&pipeline.inner);
        rpass.set_bind_group(0, &*self.scene_bind_group, &[]);

        for draw in &packet.draws {
            if let DrawCount::Direct(0) = draw.count {
                continue;
            }
            rpass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            rpass.set_vertex_buffer(1, draw.instances.slice(..));
            rpass.set_index_buffer(draw.index_buffer.slice(..), draw.index_format);
            match &draw.count {
                DrawCount::Direct(n) => rpass.draw_indexed(0..draw.index_count, 0, 0..*n),
                DrawCount::Indirect(args) => rpass.draw_indexed_indirect(args, 0),
            }
        }
    }
}
