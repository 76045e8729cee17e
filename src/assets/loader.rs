//! Threaded model loading with one-shot completion futures
//!
//! Each [`AssetRequest`] is parsed on its own worker thread and reports back
//! through a `futures` one-shot channel. The event loop drains finished
//! tickets non-blockingly via [`AssetLoader::poll`]; headless callers can
//! instead await a whole batch with [`join_batch`], which fails fast on the
//! first error but never cancels workers already in flight.

use std::path::{Path, PathBuf};
use std::thread;

use cgmath::Vector3;
use futures::channel::oneshot;
use thiserror::Error;

/// Where a loaded model goes in the scene: translation plus per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Placement {
    pub fn new(position: Vector3<f32>, scale: Vector3<f32>) -> Self {
        Self { position, scale }
    }

    /// Placement with the same scale factor on every axis.
    pub fn uniform(position: Vector3<f32>, scale: f32) -> Self {
        Self::new(position, Vector3::new(scale, scale, scale))
    }

    /// All six components must be finite for the placement to be usable.
    pub fn is_finite(&self) -> bool {
        let p = self.position;
        let s = self.scale;
        [p.x, p.y, p.z, s.x, s.y, s.z].iter().all(|c| c.is_finite())
    }
}

/// One model to load: a logical prop name, the file it comes from, and
/// where it lands in the scene. Immutable once issued.
#[derive(Debug, Clone)]
pub struct AssetRequest {
    pub name: String,
    pub path: PathBuf,
    pub placement: Placement,
}

impl AssetRequest {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, placement: Placement) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            placement,
        }
    }
}

/// Why a load failed. There are no retries; the owning batch can never
/// reach ready once one of these is reported.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("model '{name}' at {path:?} could not be read: {source}")]
    Unreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model '{name}' was requested with a non-finite placement")]
    BadPlacement { name: String },

    #[error("worker for model '{name}' went away before reporting a result")]
    WorkerLost { name: String },
}

/// CPU-side mesh data parsed from one OBJ model entry.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub material: Option<usize>,
}

/// Material parameters lifted from the companion MTL file.
#[derive(Debug, Clone)]
pub struct MaterialSpec {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
}

/// Everything a worker hands back for one successful request. Owned by the
/// completion until the scene installs it.
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialSpec>,
}

/// The result of one finished request, success or failure.
#[derive(Debug)]
pub struct LoadCompletion {
    pub request: AssetRequest,
    pub result: Result<ModelData, LoadError>,
}

/// Pending load: the issued request plus the one-shot future its worker
/// will fulfill. Consume with [`LoadTicket::try_take`] (non-blocking) or
/// [`LoadTicket::wait`] (async).
pub struct LoadTicket {
    request: AssetRequest,
    receiver: oneshot::Receiver<Result<ModelData, LoadError>>,
}

impl LoadTicket {
    pub fn request(&self) -> &AssetRequest {
        &self.request
    }

    /// Returns the completion if the worker has finished, None otherwise.
    /// A dropped worker counts as a failed completion.
    pub fn try_take(&mut self) -> Option<Result<ModelData, LoadError>> {
        match self.receiver.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(LoadError::WorkerLost {
                name: self.request.name.clone(),
            })),
        }
    }

    /// Awaits the worker and resolves into a [`LoadCompletion`].
    pub async fn wait(self) -> LoadCompletion {
        let LoadTicket { request, receiver } = self;
        let result = match receiver.await {
            Ok(result) => result,
            Err(oneshot::Canceled) => Err(LoadError::WorkerLost {
                name: request.name.clone(),
            }),
        };
        LoadCompletion { request, result }
    }
}

/// Issues one request. The placement is validated up front; a bad placement
/// fails the ticket without ever spawning a worker.
pub fn load(request: AssetRequest) -> LoadTicket {
    let (sender, receiver) = oneshot::channel();

    if !request.placement.is_finite() {
        let _ = sender.send(Err(LoadError::BadPlacement {
            name: request.name.clone(),
        }));
    } else {
        let name = request.name.clone();
        let path = request.path.clone();
        thread::spawn(move || {
            // The receiver may be gone by the time parsing ends; that load
            // was simply never observed, so the send result is ignored.
            let _ = sender.send(parse_obj(&name, &path));
        });
    }

    LoadTicket { request, receiver }
}

/// Awaits a whole batch, preserving request order. Fails on the first
/// error; workers still in flight are detached and run to completion on
/// their own (there is no cancellation primitive in this design).
pub async fn join_batch(
    tickets: Vec<LoadTicket>,
) -> Result<Vec<(AssetRequest, ModelData)>, LoadError> {
    let loads = tickets.into_iter().map(|ticket| async move {
        let completion = ticket.wait().await;
        match completion.result {
            Ok(data) => Ok((completion.request, data)),
            Err(err) => Err(err),
        }
    });
    futures::future::try_join_all(loads).await
}

/// Non-blocking pump over an issued batch, for use from the event loop.
///
/// All requests are fired concurrently at construction; [`AssetLoader::poll`]
/// then drains whichever workers have finished since the last call.
pub struct AssetLoader {
    pending: Vec<LoadTicket>,
}

impl AssetLoader {
    pub fn start_batch(requests: Vec<AssetRequest>) -> Self {
        Self {
            pending: requests.into_iter().map(load).collect(),
        }
    }

    /// Drains every finished ticket, leaving unfinished ones pending.
    pub fn poll(&mut self) -> Vec<LoadCompletion> {
        let mut done = Vec::new();
        self.pending.retain_mut(|ticket| match ticket.try_take() {
            Some(result) => {
                done.push(LoadCompletion {
                    request: ticket.request().clone(),
                    result,
                });
                false
            }
            None => true,
        });
        done
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }
}

/// Parses an OBJ file (and its MTL, when present) into CPU-side mesh and
/// material data. Triangulated, single-index, matching what the mesh
/// builder expects.
fn parse_obj(name: &str, path: &Path) -> Result<ModelData, LoadError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| LoadError::Unreadable {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        log::debug!("no usable MTL for '{}': {}", name, err);
        Vec::new()
    });

    let materials = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| {
            let mtl_name = if mtl.name.is_empty() {
                format!("{}_material_{}", name, i)
            } else {
                mtl.name.clone()
            };
            let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
            MaterialSpec {
                name: mtl_name,
                base_color: [
                    diffuse[0],
                    diffuse[1],
                    diffuse[2],
                    mtl.dissolve.unwrap_or(1.0),
                ],
                metallic: 0.0,
                // Shininess maps inversely onto roughness
                roughness: 1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0),
            }
        })
        .collect();

    let meshes = models
        .iter()
        .map(|m| MeshData {
            name: m.name.clone(),
            positions: m.mesh.positions.clone(),
            normals: m.mesh.normals.clone(),
            indices: m.mesh.indices.clone(),
            material: m.mesh.material_id,
        })
        .collect();

    Ok(ModelData { meshes, materials })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FIXTURE_SEQ: AtomicUsize = AtomicUsize::new(0);

    /// Writes a one-triangle OBJ into the temp dir and returns its path.
    pub(crate) fn write_triangle_obj(tag: &str) -> PathBuf {
        let seq = FIXTURE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "diorama_{}_{}_{}.obj",
            tag,
            std::process::id(),
            seq
        ));
        fs::write(
            &path,
            "v 0.0 0.0 0.0\nv 1.0 0.0 0.0\nv 0.0 1.0 0.0\nf 1 2 3\n",
        )
        .expect("failed to write OBJ fixture");
        path
    }

    /// Writes a unit cube OBJ (quads, spanning [-0.5, 0.5] on every axis)
    /// into the temp dir and returns its path.
    pub(crate) fn write_cube_obj(tag: &str) -> PathBuf {
        let seq = FIXTURE_SEQ.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "diorama_{}_{}_{}.obj",
            tag,
            std::process::id(),
            seq
        ));
        fs::write(
            &path,
            "v -0.5 -0.5 -0.5\nv 0.5 -0.5 -0.5\nv 0.5 0.5 -0.5\nv -0.5 0.5 -0.5\n\
             v -0.5 -0.5 0.5\nv 0.5 -0.5 0.5\nv 0.5 0.5 0.5\nv -0.5 0.5 0.5\n\
             f 4 3 2 1\nf 5 6 7 8\nf 1 2 6 5\nf 2 3 7 6\nf 3 4 8 7\nf 4 1 5 8\n",
        )
        .expect("failed to write OBJ fixture");
        path
    }

    fn unit_placement() -> Placement {
        Placement::uniform(Vector3::new(0.0, 0.0, 0.0), 1.0)
    }

    #[test]
    fn test_load_success() {
        let path = write_triangle_obj("ok");
        let ticket = load(AssetRequest::new("tri", &path, unit_placement()));
        let completion = pollster::block_on(ticket.wait());
        let data = completion.result.expect("triangle should parse");
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.meshes[0].positions.len(), 9);
        assert_eq!(data.meshes[0].indices.len(), 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_missing_file_fails() {
        let ticket = load(AssetRequest::new(
            "ghost",
            "/definitely/not/here.obj",
            unit_placement(),
        ));
        let completion = pollster::block_on(ticket.wait());
        assert!(matches!(
            completion.result,
            Err(LoadError::Unreadable { .. })
        ));
    }

    #[test]
    fn test_non_finite_placement_rejected() {
        let path = write_triangle_obj("nan");
        let placement = Placement::uniform(Vector3::new(0.0, 0.0, 0.0), f32::NAN);
        let ticket = load(AssetRequest::new("tri", &path, placement));
        let completion = pollster::block_on(ticket.wait());
        assert!(matches!(
            completion.result,
            Err(LoadError::BadPlacement { .. })
        ));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_join_batch_fails_on_first_error() {
        let good = write_triangle_obj("joined");
        let tickets = vec![
            load(AssetRequest::new("good", &good, unit_placement())),
            load(AssetRequest::new(
                "bad",
                "/nope/missing.obj",
                unit_placement(),
            )),
        ];
        let joined = pollster::block_on(join_batch(tickets));
        assert!(joined.is_err());
        let _ = fs::remove_file(good);
    }

    #[test]
    fn test_join_batch_preserves_order() {
        let a = write_triangle_obj("order_a");
        let b = write_triangle_obj("order_b");
        let tickets = vec![
            load(AssetRequest::new("a", &a, unit_placement())),
            load(AssetRequest::new("b", &b, unit_placement())),
        ];
        let joined = pollster::block_on(join_batch(tickets)).expect("both should parse");
        assert_eq!(joined[0].0.name, "a");
        assert_eq!(joined[1].0.name, "b");
        let _ = fs::remove_file(a);
        let _ = fs::remove_file(b);
    }

    #[test]
    fn test_poll_drains_batch() {
        let a = write_triangle_obj("poll_a");
        let b = write_triangle_obj("poll_b");
        let mut loader = AssetLoader::start_batch(vec![
            AssetRequest::new("a", &a, unit_placement()),
            AssetRequest::new("b", &b, unit_placement()),
        ]);

        let mut completions = Vec::new();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while loader.in_flight() > 0 {
            assert!(std::time::Instant::now() < deadline, "loader stalled");
            completions.extend(loader.poll());
            thread::yield_now();
        }

        assert_eq!(completions.len(), 2);
        assert!(completions.iter().all(|c| c.result.is_ok()));
        let _ = fs::remove_file(a);
        let _ = fs::remove_file(b);
    }
}
