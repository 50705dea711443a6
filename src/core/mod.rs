pub mod cluster;
pub mod error;
pub mod origin;
pub mod policy;
pub mod resources;
pub mod route;
pub mod snapshot;

pub use cluster::ClusterSynthesizer;
pub use error::{XdsError, XdsResult};
pub use origin::Origin;
pub use policy::SynthesisPolicy;
pub use route::RouteSynthesizer;
pub use snapshot::{Snapshot, SnapshotAssembler};
