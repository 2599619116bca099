//! # brokerform-kernel: Functional core of `Brokerform`
//!
//! The kernel is the pure, deterministic heart of the broker console. It
//! receives edit commands and produces new form states whose descriptor is
//! internally consistent.
//!
//! ## Key Principles
//!
//! - **No IO**: Fetching and submitting descriptors happens outside the kernel
//! - **Total**: Every command either fully applies or leaves the descriptor unchanged
//! - **Structured model is authoritative**: `rawProperties` and certificate
//!   templates are projections recomputed after every change
//! - **Pure functions**: `apply(state, command) -> state`
//!
//! ## Architecture
//!
//! - [`allocator`]: Deterministic endpoint names and ports
//! - [`properties`]: `rawProperties` projection of endpoint configuration
//! - [`naming`]: Selector, secret and TLS host derivation
//! - [`automation`]: Certificate automation activation and teardown
//! - [`command`]: The closed set of edit commands
//! - [`kernel`]: The `apply` function that ties it all together
//! - [`form`]: Descriptor plus dirty flags
//! - [`invariants`]: Structural checks every output satisfies
//!
//! ## Example
//!
//! ```
//! use brokerform_kernel::{Command, FormState, apply_batch, check_invariants};
//! use brokerform_types::EndpointRole;
//!
//! let form = apply_batch(
//!     &FormState::new_broker(),
//!     [
//!         Command::SetBrokerName { name: "ex-aao".into() },
//!         Command::add_endpoint(EndpointRole::Acceptor),
//!         Command::activate_cert_automation("acceptors0", "letsencrypt"),
//!     ],
//! );
//!
//! assert!(check_invariants(form.descriptor()).is_ok());
//! assert_eq!(form.descriptor().cert_templates().len(), 1);
//! ```

pub mod allocator;
pub mod automation;
pub mod command;
pub mod form;
pub mod invariants;
pub mod kernel;
pub mod naming;
pub mod properties;
pub mod state_hash;


// Re-export commonly used items
pub use command::{Command, ReplaceOrigin};
pub use form::FormState;
pub use invariants::{InvariantViolation, check_invariants, collect_violations};
pub use kernel::{apply, apply_batch};
pub use state_hash::fingerprint;
