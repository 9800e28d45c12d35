//! Integration tests for meshmask-preview
//!
//! These tests drive the filter and node the way a preview host does and
//! check the generated proxy meshes end to end.

use meshmask_algorithms::{ParallelConfig, SkipReason, SubmeshStatus};
use meshmask_core::{
    AssetRef, Color32, Error, InMemoryMaskSource, MaskImage, MaterialSetting, Mesh, MeshTopology,
    Point3f, RemoveMeshByMask, RemoveMode, Result, SubMesh,
};
use meshmask_preview::*;
use std::sync::Arc;

const HALF_MASK: &str = "half.png";

/// 2x2 mask: row 0 (v < 0.5) black, row 1 (v >= 0.5) white
fn half_mask() -> MaskImage {
    MaskImage::from_rows(&[&[false, false], &[true, true]]).unwrap()
}

/// Vertices 0..3 sample row 0, vertices 3..6 sample row 1
fn create_test_mesh(submeshes: Vec<SubMesh>) -> Mesh {
    let uvs = vec![
        [0.1, 0.1],
        [0.9, 0.1],
        [0.5, 0.1],
        [0.1, 0.9],
        [0.9, 0.9],
        [0.5, 0.9],
    ];
    let vertices = uvs.iter().map(|uv| Point3f::new(uv[0], uv[1], 0.0)).collect();
    Mesh::from_parts("avatar_body", vertices, uvs, submeshes)
}

fn create_triangle_mesh(indices: Vec<u32>) -> Mesh {
    create_test_mesh(vec![SubMesh::new(MeshTopology::Triangles, indices)])
}

struct Scene {
    hub: Arc<InvalidationHub>,
    source: Arc<InMemoryMaskSource>,
    edits: Arc<LiveMaskEdits>,
    resolver: DefaultMaskResolver<Arc<InMemoryMaskSource>>,
    original: SkinnedMeshRenderer,
    proxy: SkinnedMeshRenderer,
}

impl Scene {
    fn new(mesh: Mesh) -> Self {
        let hub = InvalidationHub::new();
        let source = Arc::new(InMemoryMaskSource::new());
        source.insert(HALF_MASK, half_mask());
        let edits = Arc::new(LiveMaskEdits::new(hub.clone()));
        let resolver = DefaultMaskResolver::new(source.clone()).with_live_edits(edits.clone());

        let mesh = Arc::new(mesh);
        Self {
            hub,
            source,
            edits,
            resolver,
            original: SkinnedMeshRenderer::new(RendererId(1), "Body", Some(mesh.clone())),
            proxy: SkinnedMeshRenderer::new(RendererId(1001), "Body", Some(mesh)),
        }
    }

    fn context(&self) -> ComputeContext {
        ComputeContext::new(self.hub.clone())
    }

    fn process(
        &mut self,
        node: &mut RemoveMeshByMaskNode,
        settings: &RemoveMeshByMask,
    ) -> Result<()> {
        let ctx = self.context();
        node.process(&self.original, &mut self.proxy, settings, &self.resolver, &ctx)?;
        Ok(())
    }

    fn proxy_mesh(&self) -> Arc<Mesh> {
        self.proxy.shared_mesh.clone().unwrap()
    }

    fn renderer_pairs(&self) -> [(Renderer, Renderer); 1] {
        [(self.original.clone().into(), self.proxy.clone().into())]
    }
}

fn masked(mode: RemoveMode) -> RemoveMeshByMask {
    RemoveMeshByMask::new(vec![MaterialSetting::masked(HALF_MASK, mode)])
}

#[test]
fn test_all_black_triangle_removed_in_remove_black() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2]));
    let mut node = RemoveMeshByMaskNode::default();

    scene.process(&mut node, &masked(RemoveMode::RemoveBlack)).unwrap();

    assert!(scene.proxy_mesh().submeshes[0].indices.is_empty());
    assert_eq!(
        node.report().submeshes,
        vec![SubmeshStatus::Rebuilt { kept: 0, removed: 1 }]
    );
}

#[test]
fn test_mixed_triangle_kept_in_either_mode() {
    for mode in [RemoveMode::RemoveWhite, RemoveMode::RemoveBlack] {
        let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 5]));
        let mut node = RemoveMeshByMaskNode::default();

        scene.process(&mut node, &masked(mode)).unwrap();
        assert_eq!(scene.proxy_mesh().submeshes[0].indices, vec![0, 1, 5]);
    }
}

#[test]
fn test_lines_keep_mixed_primitive_in_order() {
    // primitive 0 both white, primitive 1 mixed
    let lines = SubMesh::new(MeshTopology::Lines, vec![3, 4, 0, 5]);
    let mut scene = Scene::new(create_test_mesh(vec![lines]));
    let mut node = RemoveMeshByMaskNode::default();

    scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
    assert_eq!(scene.proxy_mesh().submeshes[0].indices, vec![0, 5]);
}

#[test]
fn test_all_disabled_settings_are_identity() {
    let mesh = create_test_mesh(vec![
        SubMesh::new(MeshTopology::Triangles, vec![0, 1, 2, 3, 4, 5]),
        SubMesh::new(MeshTopology::Quads, vec![0, 1, 4, 3]),
    ]);
    let mut scene = Scene::new(mesh.clone());
    let mut node = RemoveMeshByMaskNode::default();
    let settings =
        RemoveMeshByMask::new(vec![MaterialSetting::disabled(), MaterialSetting::disabled()]);

    scene.process(&mut node, &settings).unwrap();

    let generated = scene.proxy_mesh();
    assert_eq!(generated.submeshes, mesh.submeshes);
    assert_eq!(generated.vertices, mesh.vertices);
    assert_eq!(generated.uvs, mesh.uvs);
    assert_eq!(
        node.report().submeshes,
        vec![SubmeshStatus::Skipped(SkipReason::Disabled); 2]
    );
}

#[test]
fn test_vertex_attributes_are_bit_identical() {
    let mut mesh = create_triangle_mesh(vec![0, 1, 2, 3, 4, 5]);
    mesh.uvs[0] = [-0.9, 1.1];
    let mut scene = Scene::new(mesh.clone());
    let mut node = RemoveMeshByMaskNode::default();

    scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();

    let generated = scene.proxy_mesh();
    assert_eq!(generated.vertex_count(), mesh.vertex_count());
    for (a, b) in generated.uvs.iter().zip(&mesh.uvs) {
        assert_eq!(a[0].to_bits(), b[0].to_bits());
        assert_eq!(a[1].to_bits(), b[1].to_bits());
    }
    for (a, b) in generated.vertices.iter().zip(&mesh.vertices) {
        approx::assert_relative_eq!(a.coords, b.coords);
    }
    assert_eq!(generated.submeshes[0].indices, vec![0, 1, 2]);
}

#[test]
fn test_processing_is_idempotent() {
    let mesh = create_test_mesh(vec![
        SubMesh::new(MeshTopology::Triangles, vec![0, 1, 2, 3, 4, 5, 0, 4, 2]),
        SubMesh::new(MeshTopology::Points, vec![0, 3, 1, 4]),
    ]);
    let settings = RemoveMeshByMask::new(vec![
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveBlack),
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveWhite),
    ]);

    let run = || {
        let mut scene = Scene::new(mesh.clone());
        let mut node = RemoveMeshByMaskNode::new(ParallelConfig::default().with_batch_size(1));
        scene.process(&mut node, &settings).unwrap();
        scene.proxy_mesh()
    };

    let first = run();
    let second = run();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.submeshes, second.submeshes);
    assert_eq!(first.submeshes[0].indices, vec![3, 4, 5, 0, 4, 2]);
    assert_eq!(first.submeshes[1].indices, vec![0, 1]);
}

#[test]
fn test_unknown_mode_and_unsupported_topology_pass_through() {
    let mut scene = Scene::new(create_test_mesh(vec![
        SubMesh::new(MeshTopology::Triangles, vec![3, 4, 5]),
        SubMesh::new(MeshTopology::LineStrip, vec![3, 4, 5]),
        SubMesh::new(MeshTopology::Triangles, vec![3, 4, 5]),
    ]));
    let mut node = RemoveMeshByMaskNode::default();
    let settings = RemoveMeshByMask::new(vec![
        MaterialSetting::masked(HALF_MASK, RemoveMode::Unknown),
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveWhite),
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveWhite),
    ]);

    scene.process(&mut node, &settings).unwrap();

    let generated = scene.proxy_mesh();
    assert_eq!(generated.submeshes[0].indices, vec![3, 4, 5]);
    assert_eq!(generated.submeshes[1].indices, vec![3, 4, 5]);
    assert!(generated.submeshes[2].indices.is_empty());
    assert_eq!(
        node.report().submeshes,
        vec![
            SubmeshStatus::Skipped(SkipReason::UnknownMode),
            SubmeshStatus::Skipped(SkipReason::UnsupportedTopology),
            SubmeshStatus::Rebuilt { kept: 0, removed: 1 },
        ]
    );
}

#[test]
fn test_cancelled_process_keeps_previous_output() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2, 3, 4, 5]));
    let mut node = RemoveMeshByMaskNode::default();
    scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
    let previous = scene.proxy_mesh();

    let ctx = scene.context();
    ctx.invalidate();
    let result = node.process(
        &scene.original,
        &mut scene.proxy,
        &masked(RemoveMode::RemoveBlack),
        &scene.resolver,
        &ctx,
    );

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(Arc::ptr_eq(&scene.proxy_mesh(), &previous));
    assert!(Arc::ptr_eq(node.mesh().unwrap(), &previous));
    assert_eq!(previous.submeshes[0].indices, vec![0, 1, 2]);
}

/// Resolves through `inner`, invalidating the context once `submesh` is reached
struct InvalidateAt<'a> {
    inner: &'a dyn MaskResolver,
    submesh: usize,
}

impl MaskResolver for InvalidateAt<'_> {
    fn resolve(
        &self,
        original: RendererId,
        submesh: usize,
        configured: &AssetRef,
        ctx: &ComputeContext,
    ) -> Option<Arc<MaskImage>> {
        if submesh == self.submesh {
            ctx.invalidate();
        }
        self.inner.resolve(original, submesh, configured, ctx)
    }
}

#[test]
fn test_invalidation_mid_process_discards_partial_result() {
    let mesh = create_test_mesh(vec![
        SubMesh::new(MeshTopology::Triangles, vec![0, 1, 2, 3, 4, 5]),
        SubMesh::new(MeshTopology::Triangles, vec![3, 4, 5, 0, 1, 2]),
    ]);
    let mut scene = Scene::new(mesh);
    let mut node = RemoveMeshByMaskNode::default();
    let settings = RemoveMeshByMask::new(vec![
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveWhite),
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveWhite),
    ]);
    scene.process(&mut node, &settings).unwrap();
    let previous = scene.proxy_mesh();

    let ctx = scene.context();
    let resolver = InvalidateAt { inner: &scene.resolver, submesh: 1 };
    let settings = RemoveMeshByMask::new(vec![
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveBlack),
        MaterialSetting::masked(HALF_MASK, RemoveMode::RemoveBlack),
    ]);
    let result = node.process(&scene.original, &mut scene.proxy, &settings, &resolver, &ctx);

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(Arc::ptr_eq(&scene.proxy_mesh(), &previous));
    assert_eq!(previous.submeshes[0].indices, vec![0, 1, 2]);
    assert_eq!(previous.submeshes[1].indices, vec![0, 1, 2]);
}

#[test]
fn test_reprocessing_restores_primitives_removed_by_earlier_settings() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2, 3, 4, 5]));
    let mut node = RemoveMeshByMaskNode::default();

    scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
    assert_eq!(scene.proxy_mesh().submeshes[0].indices, vec![0, 1, 2]);

    scene.process(&mut node, &masked(RemoveMode::RemoveBlack)).unwrap();
    let generated = scene.proxy_mesh();
    assert_eq!(generated.submeshes[0].indices, vec![3, 4, 5]);
    assert_eq!(generated.name, "avatar_body (Mask Generated)");
}

#[test]
fn test_invalid_geometry_keeps_previous_output() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2]));
    let mut node = RemoveMeshByMaskNode::default();
    scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
    let previous = node.mesh().cloned().unwrap();

    let broken = Arc::new(create_triangle_mesh(vec![0, 1, 42]));
    scene.proxy.shared_mesh = Some(broken.clone());

    let result = scene.process(&mut node, &masked(RemoveMode::RemoveWhite));
    assert!(matches!(result, Err(Error::InvalidData(_))));
    assert!(Arc::ptr_eq(node.mesh().unwrap(), &previous));
    assert!(Arc::ptr_eq(&scene.proxy_mesh(), &broken));

    node.on_frame(&mut scene.proxy);
    assert!(Arc::ptr_eq(&scene.proxy_mesh(), &previous));
}

#[test]
fn test_live_edit_triggers_recompute_with_edited_mask() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2, 3, 4, 5]));
    let settings = masked(RemoveMode::RemoveWhite);
    let filter = RemoveMeshByMaskFilter::default();

    let ctx = scene.context();
    let mut pairs = scene.renderer_pairs();
    let node = filter
        .instantiate(&mut pairs, &settings, &scene.resolver, &ctx)
        .unwrap()
        .unwrap();
    assert_eq!(node.mesh().unwrap().submeshes[0].indices, vec![0, 1, 2]);

    let observed = ctx.observed();
    assert!(observed.contains(&DependencyKey::Settings(RendererId(1))));
    assert!(observed.contains(&DependencyKey::Mask(AssetRef::new(HALF_MASK))));
    assert!(observed.contains(&DependencyKey::LiveMask {
        renderer: RendererId(1),
        submesh: 0
    }));

    // Paint the whole mask white
    scene.edits.update(RendererId(1), 0, MaskImage::filled(2, 2, Color32::WHITE));
    assert!(ctx.is_invalidated());

    let ctx = scene.context();
    let mut pairs = scene.renderer_pairs();
    let node = filter
        .instantiate(&mut pairs, &settings, &scene.resolver, &ctx)
        .unwrap()
        .unwrap();
    assert!(node.mesh().unwrap().submeshes[0].indices.is_empty());

    // Committing a different asset image invalidates through the mask key
    scene.source.insert(HALF_MASK, MaskImage::filled(2, 2, Color32::BLACK));
    assert_eq!(scene.hub.notify(&DependencyKey::Mask(AssetRef::new(HALF_MASK))), 1);
    assert!(ctx.is_invalidated());
}

#[test]
fn test_dispose_releases_generated_mesh() {
    let mut scene = Scene::new(create_triangle_mesh(vec![0, 1, 2]));
    let generated = {
        let mut node = RemoveMeshByMaskNode::default();
        scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
        Arc::downgrade(node.mesh().unwrap())
    };

    // The proxy still shares the mesh until the host resets it
    assert!(generated.upgrade().is_some());
    scene.proxy.shared_mesh = scene.original.shared_mesh.clone();
    assert!(generated.upgrade().is_none());
}

#[test]
fn test_parallel_and_sequential_agree() {
    let grid = 24usize;
    let mut uvs = Vec::new();
    for y in 0..=grid {
        for x in 0..=grid {
            uvs.push([x as f32 / grid as f32, y as f32 / grid as f32]);
        }
    }
    let mut indices = Vec::new();
    for y in 0..grid as u32 {
        for x in 0..grid as u32 {
            let i = y * (grid as u32 + 1) + x;
            indices.extend_from_slice(&[i, i + 1, i + grid as u32 + 1]);
        }
    }
    let vertices = vec![Point3f::origin(); uvs.len()];
    let submeshes = vec![SubMesh::new(MeshTopology::Triangles, indices)];
    let mesh = Mesh::from_parts("grid", vertices, uvs, submeshes);

    let mut checker = MaskImage::filled(8, 8, Color32::BLACK);
    for row in 0..8 {
        for col in 0..8 {
            if (row + col) % 2 == 0 {
                checker.put(row, col, Color32::WHITE).unwrap();
            }
        }
    }

    let run = |config: ParallelConfig| {
        let mut scene = Scene::new(mesh.clone());
        scene.source.insert(HALF_MASK, checker.clone());
        let mut node = RemoveMeshByMaskNode::new(config);
        scene.process(&mut node, &masked(RemoveMode::RemoveWhite)).unwrap();
        scene.proxy_mesh().submeshes[0].indices.clone()
    };

    let sequential = run(ParallelConfig::sequential());
    let parallel = run(
        ParallelConfig::default()
            .with_batch_size(3)
            .with_min_parallel_primitives(0),
    );
    assert_eq!(sequential, parallel);
    assert!(sequential.len() < mesh.submeshes[0].indices.len());
}
