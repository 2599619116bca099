//! Deterministic fingerprints of broker descriptors.
//!
//! Same descriptor → same fingerprint. The CLI uses this to report whether a
//! batch of commands changed anything; tests use it to compare lineages.
//!
//! We use BLAKE3 over every field in a fixed order. Strings are length
//! prefixed and optional values carry a presence tag, so adjacent fields
//! cannot alias each other.

use blake3::Hasher;
use brokerform_types::{Descriptor, Endpoint, ExposeMode, FactoryKind};

use crate::form::FormState;

/// Computes a 32-byte BLAKE3 fingerprint of a descriptor.
///
/// # Examples
///
/// ```
/// use brokerform_kernel::state_hash::fingerprint;
/// use brokerform_types::Descriptor;
///
/// assert_eq!(fingerprint(&Descriptor::new()), fingerprint(&Descriptor::new()));
/// ```
pub fn fingerprint(descriptor: &Descriptor) -> [u8; 32] {
    let mut hasher = Hasher::new();

    // Identity and deployment
    update_str(&mut hasher, &descriptor.identity.name);
    update_str(&mut hasher, &descriptor.identity.namespace);
    hasher.update(&descriptor.replica_count.to_le_bytes());
    update_str(&mut hasher, &descriptor.ingress_domain);

    // Endpoints, in document order
    for endpoints in [&descriptor.acceptors, &descriptor.connectors] {
        hasher.update(&(endpoints.len() as u64).to_le_bytes());
        for endpoint in endpoints {
            update_endpoint(&mut hasher, endpoint);
        }
    }

    // Console
    let console = &descriptor.console;
    hasher.update(&[u8::from(console.expose), u8::from(console.ssl_enabled)]);
    update_expose_mode(&mut hasher, console.expose_mode);
    update_opt_str(&mut hasher, console.ssl_secret.as_deref());
    update_opt_str(&mut hasher, console.trust_secret.as_deref());
    update_opt_bool(&mut hasher, console.use_client_auth);
    update_opt_str(&mut hasher, console.admin_user.as_deref());
    update_opt_str(&mut hasher, console.admin_password.as_deref());

    // Raw properties
    hasher.update(&(descriptor.raw_properties.len() as u64).to_le_bytes());
    for line in &descriptor.raw_properties {
        update_str(&mut hasher, line);
    }

    // Certificate templates (absent and empty hash differently)
    match &descriptor.cert_templates {
        None => {
            hasher.update(&[0u8]);
        }
        Some(templates) => {
            hasher.update(&[1u8]);
            hasher.update(&(templates.len() as u64).to_le_bytes());
            for template in templates {
                update_str(&mut hasher, &template.selector_name);
                update_str(&mut hasher, &template.issuer_name);
                update_str(&mut hasher, &template.secret_name);
                hasher.update(&(template.tls_hosts.len() as u64).to_le_bytes());
                for host in &template.tls_hosts {
                    update_str(&mut hasher, host);
                }
            }
        }
    }

    *hasher.finalize().as_bytes()
}

impl FormState {
    /// Fingerprint of the wrapped descriptor. Dirty flags are not included.
    pub fn fingerprint(&self) -> [u8; 32] {
        fingerprint(self.descriptor())
    }
}

fn update_endpoint(hasher: &mut Hasher, endpoint: &Endpoint) {
    update_str(hasher, &endpoint.name);
    hasher.update(&endpoint.port.to_le_bytes());
    update_str(hasher, &endpoint.protocols);
    update_opt_str(hasher, endpoint.host.as_deref());
    update_opt_bool(hasher, endpoint.bind_to_all_interfaces);
    hasher.update(&[u8::from(endpoint.ssl_enabled)]);
    update_opt_str(hasher, endpoint.ssl_secret.as_deref());
    update_opt_str(hasher, endpoint.trust_secret.as_deref());
    update_opt_bool(hasher, endpoint.need_client_auth);
    update_opt_bool(hasher, endpoint.want_client_auth);
    update_opt_bool(hasher, endpoint.expose);
    update_expose_mode(hasher, endpoint.expose_mode);
    update_opt_str(hasher, endpoint.ingress_host.as_deref());
    hasher.update(&[match endpoint.factory {
        FactoryKind::Network => 0u8,
        FactoryKind::InProcess => 1u8,
    }]);
    hasher.update(&(endpoint.other_params.len() as u64).to_le_bytes());
    for (key, value) in &endpoint.other_params {
        update_str(hasher, key);
        update_str(hasher, value);
    }
}

fn update_str(hasher: &mut Hasher, value: &str) {
    hasher.update(&(value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_opt_str(hasher: &mut Hasher, value: Option<&str>) {
    match value {
        None => {
            hasher.update(&[0u8]);
        }
        Some(value) => {
            hasher.update(&[1u8]);
            update_str(hasher, value);
        }
    }
}

fn update_opt_bool(hasher: &mut Hasher, value: Option<bool>) {
    hasher.update(&[match value {
        None => 0u8,
        Some(false) => 1u8,
        Some(true) => 2u8,
    }]);
}

fn update_expose_mode(hasher: &mut Hasher, mode: Option<ExposeMode>) {
    hasher.update(&[match mode {
        None => 0u8,
        Some(ExposeMode::Route) => 1u8,
        Some(ExposeMode::Ingress) => 2u8,
    }]);
}

#[cfg(test)]
mod tests {
    use brokerform_types::{CertTemplate, EndpointRole};

    use super::*;

    #[test]
    fn identical_descriptors_share_a_fingerprint() {
        let a = Descriptor::with_identity("b", "ns");
        let b = Descriptor::with_identity("b", "ns");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn field_boundaries_do_not_alias() {
        let a = Descriptor::with_identity("ab", "c");
        let b = Descriptor::with_identity("a", "bc");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn absent_and_empty_templates_differ() {
        let absent = Descriptor::new();
        let mut empty = Descriptor::new();
        empty.cert_templates = Some(Vec::<CertTemplate>::new());
        assert_ne!(fingerprint(&absent), fingerprint(&empty));
    }

    #[test]
    fn structured_params_are_covered() {
        let mut a = Descriptor::new();
        a.acceptors
            .push(Endpoint::new(EndpointRole::Acceptor, "a0", 5555));
        let mut b = a.clone();
        b.acceptors[0]
            .other_params
            .insert("k".to_string(), "v".to_string());

        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn form_fingerprint_ignores_flags() {
        let clean = FormState::new_broker();
        let dirty = clean.clone().with_yaml_unsaved(true);
        assert_eq!(clean.fingerprint(), dirty.fingerprint());
    }
}
