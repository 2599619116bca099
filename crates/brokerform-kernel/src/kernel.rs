//! The kernel - pure transition engine for broker forms.
//!
//! The kernel applies commands to produce a new form state. It is completely
//! pure: no IO, no clocks, no shared state. Every command either yields a
//! fully consistent new descriptor or leaves the descriptor exactly as it was.
//!
//! # Example
//!
//! ```
//! use brokerform_kernel::{Command, FormState, apply};
//! use brokerform_types::EndpointRole;
//!
//! let form = FormState::new_broker();
//! let form = apply(&form, Command::add_endpoint(EndpointRole::Acceptor));
//!
//! assert!(form.has_changes());
//! assert_eq!(form.descriptor().acceptors[0].port, 5555);
//! ```

use brokerform_types::{Console, Descriptor, Endpoint, EndpointRole};
use tracing::{debug, trace};

use crate::command::Command;
use crate::form::FormState;
use crate::invariants::check_invariants;
use crate::naming::MAX_REPLICA_COUNT;
use crate::{allocator, automation, properties};

/// Applies a command to a form, producing the next form.
///
/// Borrows the current state and returns a new one; the caller's state is
/// left untouched. Commands that name a missing endpoint, rename onto a
/// taken name or move onto a taken port keep the descriptor as it was; like
/// every other non-bookkeeping command they still mark the form as changed.
#[allow(clippy::too_many_lines)]
pub fn apply(state: &FormState, cmd: Command) -> FormState {
    trace!(command = cmd.kind(), "applying command");

    // Precondition: postconditions below only hold for consistent input
    let was_consistent = cfg!(debug_assertions) && check_invariants(state.descriptor()).is_ok();
    let current = state.descriptor();

    let edited = match cmd {
        // ====================================================================
        // Endpoint Lifecycle
        // ====================================================================
        Command::AddEndpoint { role } => Some(add_endpoint(current, role)),

        Command::DeleteEndpoint { role, name } => delete_endpoint(current, role, &name),

        Command::RenameEndpoint {
            role,
            name,
            new_name,
        } => rename_endpoint(current, role, &name, &new_name),

        // ====================================================================
        // Endpoint Settings
        // ====================================================================
        Command::SetPort { role, name, port } => set_port(current, role, &name, port),

        Command::SetProtocols {
            role,
            name,
            protocols,
        } => edit_endpoint(current, role, &name, |e| e.protocols = protocols),

        Command::SetHost { role, name, host } => {
            if role == EndpointRole::Acceptor {
                debug!(endpoint = %name, "host only applies to connectors; ignoring");
                None
            } else {
                edit_endpoint(current, role, &name, |e| e.host = non_empty(host))
            }
        }

        Command::SetBindToAllInterfaces { role, name, bind } => {
            edit_endpoint(current, role, &name, |e| e.bind_to_all_interfaces = Some(bind))
        }

        Command::SetFactory {
            role,
            name,
            factory,
        } => edit_projected(current, role, &name, |e| e.factory = factory),

        Command::SetOtherParams { role, name, params } => {
            edit_projected(current, role, &name, |e| {
                e.other_params = params
                    .into_iter()
                    .filter(|(key, _)| !key.is_empty() && !key.contains('='))
                    .collect();
            })
        }

        Command::SetSslEnabled {
            role,
            name,
            enabled,
        } => set_ssl_enabled(current, role, &name, enabled),

        Command::SetSecret {
            role,
            name,
            is_ca,
            secret,
        } => set_secret(current, role, &name, is_ca, non_empty(secret)),

        Command::SetClientAuth {
            role,
            name,
            need,
            want,
        } => match current.endpoint(role, &name) {
            Some(endpoint) if endpoint.trust_secret.is_none() => {
                debug!(%role, endpoint = %name, "client auth needs a trust secret; ignoring");
                None
            }
            _ => edit_endpoint(current, role, &name, |e| {
                e.need_client_auth = need;
                e.want_client_auth = want;
            }),
        },

        // ====================================================================
        // Console
        // ====================================================================
        Command::SetConsoleExpose { expose } => {
            Some(edit_console(current, |c| c.expose = expose))
        }

        Command::SetConsoleExposeMode { mode } => {
            Some(edit_console(current, |c| c.expose_mode = Some(mode)))
        }

        Command::SetConsoleSslEnabled { enabled } => Some(edit_console(current, |c| {
            if enabled {
                c.ssl_enabled = true;
            } else {
                c.clear_ssl();
            }
        })),

        Command::SetConsoleCredentials {
            admin_user,
            admin_password,
        } => Some(edit_console(current, |c| {
            c.admin_user = non_empty(admin_user);
            c.admin_password = non_empty(admin_password);
        })),

        Command::SetConsoleSecret { is_ca, secret } => {
            let secret = non_empty(secret);
            Some(edit_console(current, |c| match (is_ca, secret) {
                (false, Some(secret)) => {
                    c.ssl_enabled = true;
                    c.ssl_secret = Some(secret);
                }
                (false, None) => c.ssl_secret = None,
                (true, Some(secret)) => {
                    c.ssl_enabled = true;
                    c.trust_secret = Some(secret);
                }
                (true, None) => {
                    c.trust_secret = None;
                    c.use_client_auth = None;
                }
            }))
        }

        Command::SetConsoleClientAuth { enabled } => {
            if current.console.trust_secret.is_none() {
                debug!("console client auth needs a trust secret; ignoring");
                None
            } else {
                Some(edit_console(current, |c| c.use_client_auth = Some(enabled)))
            }
        }

        // ====================================================================
        // Deployment
        // ====================================================================
        Command::SetReplicaCount { count } => Some(set_replica_count(current, count)),

        Command::IncrementReplicas => Some(set_replica_count(
            current,
            i64::from(current.replica_count) + 1,
        )),

        Command::DecrementReplicas => Some(set_replica_count(
            current,
            i64::from(current.replica_count) - 1,
        )),

        Command::SetBrokerName { name } => {
            let mut next = current.clone();
            next.identity.name = name;
            automation::refresh(&mut next, current.broker_name());
            Some(next)
        }

        Command::SetNamespace { namespace } => {
            let mut next = current.clone();
            next.identity.namespace = namespace;
            automation::refresh(&mut next, current.broker_name());
            Some(next)
        }

        Command::SetIngressDomain { domain } => {
            let mut next = current.clone();
            next.ingress_domain = domain;
            automation::refresh(&mut next, current.broker_name());
            Some(next)
        }

        // ====================================================================
        // Certificate Automation
        // ====================================================================
        Command::ActivateCertAutomation { acceptor, issuer } => {
            let mut next = current.clone();
            if automation::activate(&mut next, &acceptor, &issuer) {
                Some(next)
            } else {
                missing(EndpointRole::Acceptor, &acceptor);
                None
            }
        }

        Command::DeactivateCertAutomation { acceptor } => {
            if current.endpoint_exists(EndpointRole::Acceptor, &acceptor) {
                let mut next = current.clone();
                if automation::is_automated(&next, &acceptor) {
                    automation::deactivate(&mut next, &acceptor);
                }
                Some(next)
            } else {
                missing(EndpointRole::Acceptor, &acceptor);
                None
            }
        }

        Command::UpdateCertIssuer { acceptor, issuer } => {
            let mut next = current.clone();
            if automation::set_issuer(&mut next, &acceptor, &issuer) {
                Some(next)
            } else {
                debug!(%acceptor, "acceptor has no certificate template; ignoring issuer");
                None
            }
        }

        // ====================================================================
        // Whole Document and Bookkeeping
        // ====================================================================
        Command::ReplaceDescriptor { descriptor, origin } => {
            let mut descriptor = *descriptor;
            properties::hydrate(&mut descriptor);
            if descriptor.replica_count > MAX_REPLICA_COUNT {
                debug!(
                    replica_count = descriptor.replica_count,
                    "clamping replica count on hydration"
                );
                descriptor.replica_count = MAX_REPLICA_COUNT;
            }
            return FormState::replaced(descriptor, origin.marks_changes());
        }

        Command::SetYamlUnsaved { unsaved } => return state.clone().with_yaml_unsaved(unsaved),

        Command::MarkSaved => return state.clone().saved(),
    };

    // A refused command leaves the descriptor alone but still counts as an edit
    let Some(descriptor) = edited else {
        return state.with_edit(current.clone());
    };

    // Postcondition: consistent input stays consistent
    debug_assert!(
        !was_consistent || check_invariants(&descriptor).is_ok(),
        "transition broke an invariant: {:?}",
        check_invariants(&descriptor)
    );

    state.with_edit(descriptor)
}

/// Applies commands in order, each against the previous result.
pub fn apply_batch(state: &FormState, commands: impl IntoIterator<Item = Command>) -> FormState {
    commands
        .into_iter()
        .fold(state.clone(), |form, cmd| apply(&form, cmd))
}

// ============================================================================
// Transitions
// ============================================================================

fn add_endpoint(current: &Descriptor, role: EndpointRole) -> Descriptor {
    let name = allocator::unique_name(role.name_prefix(), &current.endpoint_names(role));
    let port = allocator::next_port(&current.endpoint_ports(role));
    let endpoint = Endpoint::new(role, name, port);

    let mut next = current.clone();
    properties::sync_endpoint(&mut next.raw_properties, role, &endpoint);
    next.endpoints_mut(role).push(endpoint);

    // Postcondition: endpoint count grew by one
    debug_assert_eq!(
        next.endpoints(role).len(),
        current.endpoints(role).len() + 1
    );
    next
}

fn delete_endpoint(current: &Descriptor, role: EndpointRole, name: &str) -> Option<Descriptor> {
    if !current.endpoint_exists(role, name) {
        missing(role, name);
        return None;
    }

    let mut next = current.clone();
    // Template first, so no template ever points at a deleted acceptor
    if role == EndpointRole::Acceptor {
        automation::remove_template(&mut next, current.broker_name(), name);
    }
    properties::remove_endpoint(&mut next.raw_properties, role, name);
    next.endpoints_mut(role).retain(|e| e.name != name);

    debug_assert!(!next.endpoint_exists(role, name));
    Some(next)
}

fn rename_endpoint(
    current: &Descriptor,
    role: EndpointRole,
    name: &str,
    new_name: &str,
) -> Option<Descriptor> {
    if !current.endpoint_exists(role, name) {
        missing(role, name);
        return None;
    }
    if !allocator::is_name_available(new_name, &current.endpoint_names(role)) {
        debug!(%role, endpoint = name, new_name, "rename refused: name unavailable");
        return None;
    }

    let mut next = current.clone();
    if let Some(endpoint) = next.endpoint_mut(role, name) {
        endpoint.name = new_name.to_string();
    }
    // Leftover lines under the new name belong to no endpoint
    properties::remove_endpoint(&mut next.raw_properties, role, new_name);
    properties::rename_endpoint(&mut next.raw_properties, role, name, new_name);
    if role == EndpointRole::Acceptor {
        automation::rename(&mut next, name, new_name);
    }

    // Postcondition: exactly one endpoint carries the new name
    debug_assert_eq!(
        next.endpoints(role)
            .iter()
            .filter(|e| e.name == new_name)
            .count(),
        1
    );
    Some(next)
}

fn set_port(current: &Descriptor, role: EndpointRole, name: &str, port: u32) -> Option<Descriptor> {
    let taken = current
        .endpoints(role)
        .iter()
        .any(|e| e.name != name && e.port == port);
    if taken && current.endpoint_exists(role, name) {
        debug!(%role, endpoint = name, port, "port refused: already in use");
        return None;
    }
    edit_endpoint(current, role, name, |e| e.port = port)
}

fn set_ssl_enabled(
    current: &Descriptor,
    role: EndpointRole,
    name: &str,
    enabled: bool,
) -> Option<Descriptor> {
    if enabled {
        return edit_endpoint(current, role, name, |e| e.ssl_enabled = true);
    }
    if !current.endpoint_exists(role, name) {
        missing(role, name);
        return None;
    }

    let mut next = current.clone();
    if role == EndpointRole::Acceptor && automation::is_automated(&next, name) {
        automation::deactivate(&mut next, name);
    }
    if let Some(endpoint) = next.endpoint_mut(role, name) {
        endpoint.clear_ssl();
    }
    Some(next)
}

fn set_secret(
    current: &Descriptor,
    role: EndpointRole,
    name: &str,
    is_ca: bool,
    secret: Option<String>,
) -> Option<Descriptor> {
    let Some(endpoint) = current.endpoint(role, name) else {
        missing(role, name);
        return None;
    };

    let mut next = current.clone();
    // A user-chosen TLS secret takes the acceptor out of automation
    if !is_ca
        && role == EndpointRole::Acceptor
        && endpoint.ssl_secret != secret
        && automation::is_automated(current, name)
    {
        automation::release(&mut next, name);
    }

    let endpoint = next.endpoint_mut(role, name)?;
    match (is_ca, secret) {
        (false, Some(secret)) => {
            endpoint.ssl_enabled = true;
            endpoint.ssl_secret = Some(secret);
        }
        (false, None) => endpoint.ssl_secret = None,
        (true, Some(secret)) => {
            endpoint.ssl_enabled = true;
            endpoint.trust_secret = Some(secret);
        }
        (true, None) => endpoint.clear_trust(),
    }
    Some(next)
}

fn set_replica_count(current: &Descriptor, count: i64) -> Descriptor {
    let count = u32::try_from(count.clamp(0, i64::from(MAX_REPLICA_COUNT)))
        .unwrap_or(MAX_REPLICA_COUNT);

    let mut next = current.clone();
    next.replica_count = count;
    automation::refresh(&mut next, current.broker_name());
    next
}

// ============================================================================
// Helpers
// ============================================================================

fn edit_endpoint(
    current: &Descriptor,
    role: EndpointRole,
    name: &str,
    edit: impl FnOnce(&mut Endpoint),
) -> Option<Descriptor> {
    if !current.endpoint_exists(role, name) {
        missing(role, name);
        return None;
    }
    let mut next = current.clone();
    edit(next.endpoint_mut(role, name)?);
    Some(next)
}

/// Like [`edit_endpoint`], then re-projects the endpoint's properties.
fn edit_projected(
    current: &Descriptor,
    role: EndpointRole,
    name: &str,
    edit: impl FnOnce(&mut Endpoint),
) -> Option<Descriptor> {
    let mut next = edit_endpoint(current, role, name, edit)?;
    let endpoint = next.endpoint(role, name)?.clone();
    properties::sync_endpoint(&mut next.raw_properties, role, &endpoint);
    Some(next)
}

fn edit_console(current: &Descriptor, edit: impl FnOnce(&mut Console)) -> Descriptor {
    let mut next = current.clone();
    edit(&mut next.console);
    next
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn missing(role: EndpointRole, name: &str) {
    debug!(%role, endpoint = name, "command targets a missing endpoint; ignoring");
}
