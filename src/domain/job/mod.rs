pub mod invocation;
pub mod job;
pub mod node_spec;
pub mod resource_specs;

pub use invocation::Invocation;
pub use job::{IoSpecs, IoTarget, Job, MailSpecs};
pub use node_spec::{NodeSpec, NodeSpecIssue};
pub use resource_specs::{ResourceSpecs, SizeResource, TimeResource};
