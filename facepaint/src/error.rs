use thiserror::Error;

use crate::engine::ObjError;

//Fatal setup failures. Recoverable runtime conditions, like a frame with no
//detected face or a pointer ray that misses, are plain Options instead.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to load face mesh asset: {0}")]
    MeshAsset(#[from] ObjError),
    #[error("tracking model reports {landmarks} landmarks but the face mesh has {vertices} vertices")]
    LandmarkCountMismatch { landmarks: usize, vertices: usize },
    #[error("face mesh has no triangles")]
    EmptyMesh,
}
