use wgpu::{CommandEncoder, ComputePassDescriptor};

use crate::pipeline::ComputePipeline;

/// A single compute dispatch: pipeline, bind groups and workgroup counts.
///
/// Opens its own `wgpu::ComputePass` on the frame encoder, so it can be
/// recorded ahead of the render passes that consume its output.
pub struct ComputePass {
    name: String,
    pipeline: ComputePipeline,
    workgroup_count: (u32, u32, u32),
    bind_groups: Vec<wgpu::BindGroup>,
}

impl ComputePass {
    pub fn new(
        name: impl Into<String>,
        pipeline: ComputePipeline,
        workgroup_count: (u32, u32, u32),
        bind_groups: Vec<wgpu::BindGroup>,
    ) -> Self {
        Self {
            name: name.into(),
            pipeline,
            workgroup_count,
            bind_groups,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replaces the bind groups (index = group number), e.g. after a buffer
    /// they reference was reallocated.
    pub fn set_bind_groups(&mut self, bind_groups: Vec<wgpu::BindGroup>) {
        self.bind_groups = bind_groups;
    }

    pub fn set_workgroup_count(&mut self, x: u32, y: u32, z: u32) {
        self.workgroup_count = (x, y, z);
    }

    /// Records the dispatch.  Nothing is recorded for an empty grid.
    pub fn record(&self, encoder: &mut CommandEncoder) {
        let (x, y, z) = self.workgroup_count;
        if x == 0 || y == 0 || z == 0 {
            return;
        }

        let mut cpass = encoder.begin_compute_pass(&ComputePassDescriptor {
            label: Some(self.name()),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline.inner);
        for (i, bind_group) in self.bind_groups.iter().enumerate() {
            cpass.set_bind_group(i as u32, bind_group, &[]);
        }
        cpass.dispatch_workgroups(x, y, z);
    }
}
