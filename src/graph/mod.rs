//! Job graph representation and linear-algebra views of it

pub mod compressed;
pub mod builder;
pub mod eigen;
pub mod laplacian;

pub use builder::GraphBuilder;
pub use compressed::JobGraph;
pub use laplacian::LaplacianMode;
