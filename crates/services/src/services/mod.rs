pub mod embed_policy;
pub mod navigation;
pub mod probe;
pub mod proxy;
pub mod rewrite;

pub use embed_policy::EmbedPolicy;
pub use navigation::SimulatorNavState;
pub use probe::EmbedProbeService;
pub use proxy::{ProxyError, ProxyPayload, ProxyService};
pub use rewrite::RewriteContext;
