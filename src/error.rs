use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("camera error: {0}")]
    Camera(String),
    #[error("onnx runtime error: {0}")]
    Ort(#[from] ort::OrtError),
    #[error("failed to read anchors: {0}")]
    Anchors(#[from] ndarray_npy::ReadNpyError),
    #[error("tensor shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("simulator transport error: {0}")]
    Transport(#[from] nng::Error),
    #[error("simulator rejected `{request}`: {message}")]
    Simulator { request: String, message: String },
    #[error("malformed simulator reply: {0}")]
    Protocol(String),
    #[error("could not spawn {blueprint} at spawn point {spawn_point}")]
    SpawnFailed { blueprint: String, spawn_point: usize },
    #[error("unexpected model output: {0}")]
    Model(String),
    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, Error>;
