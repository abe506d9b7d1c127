use glam::{Mat3, Mat4, Vec3};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Radius the model's bounding sphere is scaled to.
pub const MODEL_RADIUS: f32 = 4.0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn radius(&self) -> f32 {
        self.extent().length() * 0.5
    }
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = Vec3::from(self.vertices.first()?.position);
        let (min, max) = self.vertices.iter().fold((first, first), |(min, max), vertex| {
            let p = Vec3::from(vertex.position);
            (min.min(p), max.max(p))
        });
        Some(Bounds { min, max })
    }

    /// Moves the bounding box centre to the origin and scales uniformly so
    /// the bounding sphere has `radius`.
    pub fn center_and_normalize(&mut self, radius: f32) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        let center = bounds.center();
        let scale = if bounds.radius() > f32::EPSILON {
            radius / bounds.radius()
        } else {
            1.0
        };
        for vertex in &mut self.vertices {
            let p = (Vec3::from(vertex.position) - center) * scale;
            vertex.position = p.to_array();
        }
    }

    /// Appends a triangle list, offsetting its indices.
    fn append(&mut self, vertices: Vec<Vertex>, indices: impl IntoIterator<Item = u32>) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        self.indices.extend(indices.into_iter().map(|index| base + index));
    }
}

/// Area-weighted smooth normals for an indexed triangle list.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from(positions[a]),
            Vec3::from(positions[b]),
            Vec3::from(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

#[derive(Debug, Clone)]
pub struct ModelData {
    pub name: String,
    pub mesh: MeshData,
}

#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub model: ModelData,
    /// Linear RGB average of the environment map, when one was loaded.
    pub environment_tint: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub model_path: PathBuf,
    pub hdri_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to import glTF at {path}: {source}")]
    Gltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF at {path} contains no triangle geometry")]
    NoGeometry { path: String },
    #[error("failed to load environment map at {path}: {source}")]
    Environment {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to start asset worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("asset worker exited without a result")]
    WorkerDisconnected,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Background loader for the scene's model and environment.
pub struct AssetLoader {
    request: AssetRequest,
    status: AssetStatus,
    receiver: Option<Receiver<Result<SceneAssets, AssetError>>>,
}

impl AssetLoader {
    pub fn spawn(request: AssetRequest) -> Self {
        let mut loader = Self {
            request,
            status: AssetStatus::Loading,
            receiver: None,
        };
        loader.start();
        loader
    }

    pub fn status(&self) -> &AssetStatus {
        &self.status
    }

    /// Starts over with the same request, e.g. from the error fallback.
    pub fn reload(&mut self) {
        log::info!("Reloading scene assets");
        self.start();
    }

    /// Returns freshly loaded assets exactly once, when the worker finishes.
    pub fn poll(&mut self) -> Option<SceneAssets> {
        let receiver = self.receiver.as_ref()?;
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(AssetError::WorkerDisconnected),
        };
        self.receiver = None;
        match result {
            Ok(assets) => {
                log::info!(
                    "Loaded model '{}' ({} vertices, {} triangles)",
                    assets.model.name,
                    assets.model.mesh.vertices.len(),
                    assets.model.mesh.indices.len() / 3
                );
                self.status = AssetStatus::Ready;
                Some(assets)
            }
            Err(err) => {
                log::warn!("Scene assets failed to load: {err}");
                self.status = AssetStatus::Failed(err.to_string());
                None
            }
        }
    }

    fn start(&mut self) {
        let (sender, receiver) = mpsc::channel();
        let request = self.request.clone();
        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                // The receiver may be gone if the app exited mid-load.
                let _ = sender.send(load_scene_assets(&request));
            });
        match spawned {
            Ok(_) => {
                self.status = AssetStatus::Loading;
                self.receiver = Some(receiver);
            }
            Err(source) => {
                let err = AssetError::WorkerSpawn(source);
                log::warn!("{err}");
                self.status = AssetStatus::Failed(err.to_string());
                self.receiver = None;
            }
        }
    }
}

pub fn load_scene_assets(request: &AssetRequest) -> Result<SceneAssets, AssetError> {
    let model = load_model(&request.model_path)?;
    let environment_tint = match &request.hdri_path {
        Some(path) => Some(load_environment_tint(path)?),
        None => None,
    };
    Ok(SceneAssets {
        model,
        environment_tint,
    })
}

/// Imports every triangle primitive of the default scene into one mesh,
/// baked into world space, centred and normalised.
pub fn load_model(path: &Path) -> Result<ModelData, AssetError> {
    let display = path.display().to_string();
    let (document, buffers, _images) = gltf::import(path).map_err(|source| AssetError::Gltf {
        path: display.clone(),
        source,
    })?;

    let mut mesh = MeshData::default();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
        None => {
            for gltf_mesh in document.meshes() {
                collect_mesh(&gltf_mesh, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
    }

    if mesh.is_empty() {
        return Err(AssetError::NoGeometry { path: display });
    }
    mesh.center_and_normalize(MODEL_RADIUS);

    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("model")
        .to_string();
    Ok(ModelData { name, mesh })
}

fn collect_node(node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data], mesh: &mut MeshData) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(gltf_mesh) = node.mesh() {
        collect_mesh(&gltf_mesh, world, buffers, mesh);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, mesh);
    }
}

fn collect_mesh(gltf_mesh: &gltf::Mesh, world: Mat4, buffers: &[gltf::buffer::Data], mesh: &mut MeshData) {
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    for primitive in gltf_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh {:?}", gltf_mesh.name());
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_normals(&positions, &indices),
        };
        let colors: Option<Vec<[f32; 3]>> = reader.read_colors(0).map(|colors| colors.into_rgb_f32().collect());

        let base = primitive.material().pbr_metallic_roughness().base_color_factor();
        let base = Vec3::new(base[0], base[1], base[2]);

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, position)| {
                let normal = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
                let tint = colors
                    .as_ref()
                    .and_then(|colors| colors.get(i))
                    .map(|&c| Vec3::from(c))
                    .unwrap_or(Vec3::ONE);
                Vertex {
                    position: world.transform_point3(Vec3::from(*position)).to_array(),
                    normal: (normal_matrix * Vec3::from(normal))
                        .try_normalize()
                        .unwrap_or(Vec3::Y)
                        .to_array(),
                    color: (base * tint).to_array(),
                }
            })
            .collect();
        mesh.append(vertices, indices);
    }
}

/// Average colour of an environment image in linear RGB.
pub fn load_environment_tint(path: &Path) -> Result<Vec3, AssetError> {
    let image = image::open(path).map_err(|source| AssetError::Environment {
        path: path.display().to_string(),
        source,
    })?;
    Ok(average_rgb(&image.to_rgb32f()))
}

pub fn average_rgb(image: &image::Rgb32FImage) -> Vec3 {
    let (sum, count) = image
        .pixels()
        .filter(|pixel| pixel.0.iter().all(|c| c.is_finite()))
        .fold((Vec3::ZERO, 0u32), |(sum, count), pixel| (sum + Vec3::from(pixel.0), count + 1));
    if count == 0 {
        return Vec3::ZERO;
    }
    sum / count as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(position: [f32; 3]) -> Vertex {
        Vertex {
            position,
            normal: [0.0, 1.0, 0.0],
            color: [1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn flat_triangle_normals_point_along_winding() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        for normal in normals {
            assert_eq!(normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn unreferenced_vertices_get_a_fallback_normal() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [5.0, 5.0, 5.0]];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn normalization_centers_and_scales() {
        let mut mesh = MeshData {
            vertices: vec![vertex([10.0, 10.0, 10.0]), vertex([14.0, 10.0, 10.0]), vertex([10.0, 13.0, 10.0])],
            indices: vec![0, 1, 2],
        };
        mesh.center_and_normalize(2.0);
        let bounds = mesh.bounds().unwrap();
        assert!(bounds.center().length() < 1e-5);
        assert!((bounds.radius() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn append_offsets_indices() {
        let mut mesh = MeshData::default();
        mesh.append(vec![vertex([0.0; 3]), vertex([1.0, 0.0, 0.0]), vertex([0.0, 1.0, 0.0])], [0, 1, 2]);
        mesh.append(vec![vertex([0.0; 3]), vertex([1.0, 0.0, 0.0]), vertex([0.0, 1.0, 0.0])], [0, 2, 1]);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 5, 4]);
    }

    #[test]
    fn average_of_uniform_image_is_its_colour() {
        let image = image::Rgb32FImage::from_pixel(4, 2, image::Rgb([0.5, 0.25, 2.0]));
        let average = average_rgb(&image);
        assert!((average - Vec3::new(0.5, 0.25, 2.0)).length() < 1e-6);
    }

    fn sample_model_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/models/mud_hut.gltf")
    }

    #[test]
    fn sample_model_merges_all_primitives() {
        let model = load_model(&sample_model_path()).unwrap();
        assert_eq!(model.name, "mud_hut.gltf");
        assert_eq!(model.mesh.indices.len() % 3, 0);
        let bounds = model.mesh.bounds().unwrap();
        assert!(bounds.center().length() < 1e-3);
        assert!((bounds.radius() - MODEL_RADIUS).abs() < 1e-3);

        let wall = Vec3::new(0.55, 0.36, 0.2);
        let thatch = Vec3::new(0.78, 0.63, 0.29);
        let has = |color: Vec3| {
            model
                .mesh
                .vertices
                .iter()
                .any(|vertex| (Vec3::from(vertex.color) - color).length() < 1e-5)
        };
        assert!(has(wall));
        assert!(has(thatch));
    }

    #[test]
    fn missing_model_fails_with_path() {
        let err = load_model(Path::new("does/not/exist.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Gltf { .. }));
        assert!(err.to_string().contains("does/not/exist.glb"));
    }

    #[test]
    fn loader_reports_failure_through_status() {
        let mut loader = AssetLoader::spawn(AssetRequest {
            model_path: PathBuf::from("does/not/exist.glb"),
            hdri_path: None,
        });
        assert_eq!(loader.status(), &AssetStatus::Loading);
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while loader.status() == &AssetStatus::Loading && std::time::Instant::now() < deadline {
            assert!(loader.poll().is_none());
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(matches!(loader.status(), AssetStatus::Failed(_)));
    }
}
