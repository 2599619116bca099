//! Structural invariants every engine output satisfies.
//!
//! The engine checks these as a debug postcondition. The CLI and tests call
//! [`check_invariants`] directly on hydrated descriptors.

use std::collections::BTreeSet;

use brokerform_types::{Descriptor, EndpointRole};

use crate::{automation, naming, properties};

/// A broken structural rule, naming the offending item.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{role} name '{name}' is used more than once")]
    DuplicateName { role: EndpointRole, name: String },

    #[error("{role} port {port} is used more than once")]
    DuplicatePort { role: EndpointRole, port: u32 },

    #[error("{role} '{name}' has SSL disabled but carries SSL settings")]
    SslFieldsWithoutSsl { role: EndpointRole, name: String },

    #[error("{role} '{name}' has client-auth flags without a trust secret")]
    ClientAuthWithoutTrust { role: EndpointRole, name: String },

    #[error("{role} '{name}' has {count} factoryClassName properties, expected exactly 1")]
    FactoryEntryCount {
        role: EndpointRole,
        name: String,
        count: usize,
    },

    #[error("{role} '{name}' params properties do not match its other parameters")]
    ParamsMismatch { role: EndpointRole, name: String },

    #[error("console has SSL disabled but carries SSL settings")]
    ConsoleSslFieldsWithoutSsl,

    #[error("certificate templates collection is present but empty")]
    EmptyCertTemplates,

    #[error("certificate template '{selector}' does not belong to any acceptor")]
    OrphanCertTemplate { selector: String },

    #[error("certificate template '{selector}' has a stale {field}")]
    StaleCertTemplate {
        selector: String,
        field: &'static str,
    },
}

/// Returns the first violated invariant, if any.
pub fn check_invariants(descriptor: &Descriptor) -> Result<(), InvariantViolation> {
    match collect_violations(descriptor).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Returns every violated invariant, in a stable order.
pub fn collect_violations(descriptor: &Descriptor) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    for role in EndpointRole::ALL {
        check_endpoints(descriptor, role, &mut violations);
    }

    let console = &descriptor.console;
    if !console.ssl_enabled
        && (console.ssl_secret.is_some()
            || console.trust_secret.is_some()
            || console.use_client_auth.is_some())
    {
        violations.push(InvariantViolation::ConsoleSslFieldsWithoutSsl);
    }

    check_cert_templates(descriptor, &mut violations);
    violations
}

fn check_endpoints(
    descriptor: &Descriptor,
    role: EndpointRole,
    violations: &mut Vec<InvariantViolation>,
) {
    let mut names = BTreeSet::new();
    let mut ports = BTreeSet::new();

    for endpoint in descriptor.endpoints(role) {
        if !names.insert(endpoint.name.as_str()) {
            violations.push(InvariantViolation::DuplicateName {
                role,
                name: endpoint.name.clone(),
            });
        }
        if !ports.insert(endpoint.port) {
            violations.push(InvariantViolation::DuplicatePort {
                role,
                port: endpoint.port,
            });
        }
        if !endpoint.ssl_enabled && endpoint.has_ssl_fields() {
            violations.push(InvariantViolation::SslFieldsWithoutSsl {
                role,
                name: endpoint.name.clone(),
            });
        }
        if endpoint.trust_secret.is_none()
            && (endpoint.need_client_auth.is_some() || endpoint.want_client_auth.is_some())
        {
            violations.push(InvariantViolation::ClientAuthWithoutTrust {
                role,
                name: endpoint.name.clone(),
            });
        }

        let parsed = properties::parse_endpoint(&descriptor.raw_properties, role, &endpoint.name);
        if parsed.factory_entries != 1 {
            violations.push(InvariantViolation::FactoryEntryCount {
                role,
                name: endpoint.name.clone(),
                count: parsed.factory_entries,
            });
        }
        if parsed.params != endpoint.other_params {
            violations.push(InvariantViolation::ParamsMismatch {
                role,
                name: endpoint.name.clone(),
            });
        }
    }
}

fn check_cert_templates(descriptor: &Descriptor, violations: &mut Vec<InvariantViolation>) {
    let Some(templates) = descriptor.cert_templates.as_ref() else {
        return;
    };
    if templates.is_empty() {
        violations.push(InvariantViolation::EmptyCertTemplates);
        return;
    }

    for template in templates {
        let owner = descriptor.acceptors.iter().find(|a| {
            naming::selector_name(descriptor.broker_name(), &a.name) == template.selector_name
        });
        let Some(acceptor) = owner else {
            violations.push(InvariantViolation::OrphanCertTemplate {
                selector: template.selector_name.clone(),
            });
            continue;
        };

        let stale = |field| InvariantViolation::StaleCertTemplate {
            selector: template.selector_name.clone(),
            field,
        };
        let expected_secret = naming::secret_name(descriptor.broker_name(), &acceptor.name);

        if template.secret_name != expected_secret {
            violations.push(stale("secret name"));
        } else if acceptor.ssl_secret.as_deref() != Some(template.secret_name.as_str()) {
            violations.push(stale("acceptor secret"));
        }
        // Lengths first: the replica count of a foreign document is unbounded
        let hosts_fresh = usize::try_from(descriptor.replica_count)
            .is_ok_and(|count| count == template.tls_hosts.len())
            && template.tls_hosts
                == naming::tls_hosts(
                    &acceptor.name,
                    descriptor.broker_name(),
                    descriptor.namespace(),
                    &descriptor.ingress_domain,
                    descriptor.replica_count,
                );
        if !hosts_fresh {
            violations.push(stale("host list"));
        }
        if automation::template_for(descriptor, &acceptor.name).is_none() {
            violations.push(stale("secret suffix"));
        }
    }
}

#[cfg(test)]
mod tests {
    use brokerform_types::{CertTemplate, Endpoint};

    use super::*;

    fn consistent() -> Descriptor {
        let mut descriptor = Descriptor::with_identity("b", "ns");
        let endpoint = Endpoint::new(EndpointRole::Acceptor, "a0", 5555);
        properties::sync_endpoint(&mut descriptor.raw_properties, EndpointRole::Acceptor, &endpoint);
        descriptor.acceptors.push(endpoint);
        descriptor
    }

    #[test]
    fn consistent_descriptor_passes() {
        assert_eq!(check_invariants(&consistent()), Ok(()));
        assert_eq!(check_invariants(&Descriptor::new()), Ok(()));
    }

    #[test]
    fn duplicate_ports_are_reported() {
        let mut descriptor = consistent();
        let endpoint = Endpoint::new(EndpointRole::Acceptor, "a1", 5555);
        properties::sync_endpoint(&mut descriptor.raw_properties, EndpointRole::Acceptor, &endpoint);
        descriptor.acceptors.push(endpoint);

        assert_eq!(
            check_invariants(&descriptor),
            Err(InvariantViolation::DuplicatePort {
                role: EndpointRole::Acceptor,
                port: 5555
            })
        );
    }

    #[test]
    fn missing_factory_entry_is_reported() {
        let mut descriptor = consistent();
        descriptor.raw_properties.clear();

        assert!(matches!(
            check_invariants(&descriptor),
            Err(InvariantViolation::FactoryEntryCount { count: 0, .. })
        ));
    }

    #[test]
    fn ssl_fields_without_ssl_are_reported() {
        let mut descriptor = consistent();
        descriptor.acceptors[0].trust_secret = Some("ca".to_string());

        assert!(matches!(
            check_invariants(&descriptor),
            Err(InvariantViolation::SslFieldsWithoutSsl { .. })
        ));
    }

    #[test]
    fn empty_template_collection_is_reported() {
        let mut descriptor = consistent();
        descriptor.cert_templates = Some(Vec::new());

        assert_eq!(
            check_invariants(&descriptor),
            Err(InvariantViolation::EmptyCertTemplates)
        );
    }

    #[test]
    fn orphan_template_is_reported() {
        let mut descriptor = consistent();
        descriptor.cert_templates = Some(vec![CertTemplate {
            selector_name: "b-gone-0-svc-ing".to_string(),
            ..CertTemplate::default()
        }]);

        assert!(matches!(
            check_invariants(&descriptor),
            Err(InvariantViolation::OrphanCertTemplate { .. })
        ));
    }

    #[test]
    fn stale_hosts_are_reported() {
        let mut descriptor = consistent();
        automation::activate(&mut descriptor, "a0", "ca");
        descriptor.replica_count = 3;

        let violations = collect_violations(&descriptor);
        assert_eq!(
            violations,
            vec![InvariantViolation::StaleCertTemplate {
                selector: "b-a0-0-svc-ing".to_string(),
                field: "host list",
            }]
        );
    }
}
