/// Camera-facing point quad material with an optional clip plane
use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::render::mesh::MeshVertexBufferLayoutRef;
use bevy::render::render_resource::{
    AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType, SpecializedMeshPipelineError,
};
use constants::render_settings::POINT_OPACITY;

use crate::session::state::ViewSettings;

pub const SCAN_POINT_SHADER_PATH: &str = "shaders/scan_points.wgsl";

#[derive(Debug, Clone, Copy, ShaderType)]
pub struct ScanPointParams {
    /// World-space quad edge length.
    pub point_size: f32,
    pub opacity: f32,
    /// 0 or 1.
    pub clip_enabled: u32,
    pub _padding: u32,
    /// `(normal.xyz, constant)`; fragments with `dot(n, p) + c < 0` are discarded.
    pub clip_plane: Vec4,
}

impl ScanPointParams {
    pub fn from_settings(settings: &ViewSettings) -> Self {
        let clip = settings.clip_plane();
        Self {
            point_size: settings.point_size,
            opacity: POINT_OPACITY,
            clip_enabled: clip.is_some() as u32,
            _padding: 0,
            clip_plane: clip.map(|plane| plane.to_vec4()).unwrap_or(Vec4::ZERO),
        }
    }
}

#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct ScanPointMaterial {
    #[uniform(0)]
    pub params: ScanPointParams,
}

impl Material for ScanPointMaterial {
    fn vertex_shader() -> ShaderRef {
        SCAN_POINT_SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SCAN_POINT_SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Blend
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(1),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Billboards are never culled.
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}
