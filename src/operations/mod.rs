// Operations module
// Resolution, probing, archive handling and the filesystem side of a sync

pub mod archive;
pub mod launch;
pub mod mount;
pub mod probe;
pub mod resolver;
pub mod secrets;
pub mod sync;

pub use mount::RemoteMount;
pub use probe::{probe, ProbeResult};
pub use resolver::{resolve, FailReason, Intent, ResolveRequest, SourceState, SyncAction};
pub use secrets::{ChainedSecretStore, SecretStore};
pub use sync::{Outcome, SyncEngine, SyncOptions};
