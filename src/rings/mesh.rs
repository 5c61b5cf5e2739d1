//! Shared triangle-fan topology for every ring.

use bytemuck::{Pod, Zeroable};
use std::f32::consts::TAU;

use super::NUM_POINTS;

/// Vertex data for ring meshes (position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Fan indices: triangle (center, i, i+1) for each perimeter point,
/// the last one closing back to point 1.
pub fn fan_indices() -> Vec<u32> {
    let n = NUM_POINTS as u32;
    let mut indices = Vec::with_capacity(NUM_POINTS * 3);
    for i in 1..=n {
        let next = if i == n { 1 } else { i + 1 };
        indices.extend_from_slice(&[0, i, next]);
    }
    indices
}

/// UVs of the unit circle mapped into [0, 1]², center first.
///
/// They never follow the displaced positions, so the radial fade is always
/// measured on the undistorted circle.
pub fn perimeter_uvs() -> Vec<[f32; 2]> {
    let mut uvs = Vec::with_capacity(NUM_POINTS + 1);
    uvs.push([0.5, 0.5]);
    for i in 0..NUM_POINTS {
        let theta = i as f32 / NUM_POINTS as f32 * TAU;
        uvs.push([0.5 + 0.5 * theta.cos(), 0.5 + 0.5 * theta.sin()]);
    }
    uvs
}
