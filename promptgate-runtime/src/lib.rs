mod entitlement;
mod options;
mod orchestrator;
mod stub;
mod usage;

pub use entitlement::{EntitlementError, EntitlementGate, OpenGate};
pub use options::InvokeOptions;
pub use orchestrator::{InvocationOutput, InvocationRuntime, InvocationRuntimeBuilder};
pub use stub::DeterministicStub;
pub use usage::{MemoryUsageStore, NoopUsageStore, UsageEvent, UsageStore, UsageStoreError};
