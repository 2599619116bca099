//! Names derived from the broker identity for certificate automation.
//!
//! Nothing here is cached: every caller recomputes from the current identity,
//! namespace, ingress domain, replica count and acceptor name.

use brokerform_types::{CertTemplate, Identity};

/// Suffix marking a secret as managed by certificate automation.
pub const AUTOMATION_SECRET_SUFFIX: &str = "-ptls";

/// Largest replica count a descriptor may carry.
///
/// Every automated acceptor holds one TLS host per replica, so the count
/// bounds the size of each certificate template.
pub const MAX_REPLICA_COUNT: u32 = 1024;

/// Ingress host placeholder the operator expands per broker ordinal.
pub const INGRESS_HOST_TEMPLATE: &str =
    "ing.$(ITEM_NAME).$(CR_NAME)-$(BROKER_ORDINAL).$(CR_NAMESPACE).$(INGRESS_DOMAIN)";

/// Name of the ingress a certificate template patches.
///
/// ```
/// use brokerform_kernel::naming::selector_name;
///
/// assert_eq!(selector_name("ex-aao", "amqp"), "ex-aao-amqp-0-svc-ing");
/// ```
pub fn selector_name(broker_name: &str, acceptor_name: &str) -> String {
    format!("{broker_name}-{acceptor_name}-0-svc-ing")
}

/// Name of the TLS secret certificate automation issues for an acceptor.
pub fn secret_name(broker_name: &str, acceptor_name: &str) -> String {
    format!("{broker_name}-{acceptor_name}-0-svc-ing{AUTOMATION_SECRET_SUFFIX}")
}

/// Returns true if `secret` is one that certificate automation manages.
pub fn is_automation_secret(secret: &str) -> bool {
    secret.ends_with(AUTOMATION_SECRET_SUFFIX)
}

/// TLS host for one broker ordinal.
pub fn tls_host(
    acceptor_name: &str,
    broker_name: &str,
    ordinal: u32,
    namespace: &str,
    ingress_domain: &str,
) -> String {
    format!("ing.{acceptor_name}.{broker_name}-{ordinal}.{namespace}.{ingress_domain}")
}

/// TLS hosts for ordinals `0..replica_count`, in ordinal order.
pub fn tls_hosts(
    acceptor_name: &str,
    broker_name: &str,
    namespace: &str,
    ingress_domain: &str,
    replica_count: u32,
) -> Vec<String> {
    (0..replica_count)
        .map(|ordinal| tls_host(acceptor_name, broker_name, ordinal, namespace, ingress_domain))
        .collect()
}

/// Renders the certificate template for an acceptor from current values.
pub fn render_template(
    identity: &Identity,
    ingress_domain: &str,
    replica_count: u32,
    acceptor_name: &str,
    issuer_name: String,
) -> CertTemplate {
    CertTemplate {
        selector_name: selector_name(&identity.name, acceptor_name),
        issuer_name,
        tls_hosts: tls_hosts(
            acceptor_name,
            &identity.name,
            &identity.namespace,
            ingress_domain,
            replica_count,
        ),
        secret_name: secret_name(&identity.name, acceptor_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_name_replaces_selector_suffix() {
        let selector = selector_name("broker", "acc0");
        let secret = secret_name("broker", "acc0");

        assert_eq!(selector, "broker-acc0-0-svc-ing");
        assert_eq!(secret, "broker-acc0-0-svc-ing-ptls");
        assert!(is_automation_secret(&secret));
        assert!(!is_automation_secret("my-own-cert"));
    }

    #[test]
    fn one_host_per_ordinal() {
        let hosts = tls_hosts("acc0", "broker", "ns", "apps.example.com", 3);

        assert_eq!(
            hosts,
            vec![
                "ing.acc0.broker-0.ns.apps.example.com",
                "ing.acc0.broker-1.ns.apps.example.com",
                "ing.acc0.broker-2.ns.apps.example.com",
            ]
        );
    }

    #[test]
    fn zero_replicas_yield_no_hosts() {
        assert!(tls_hosts("a", "b", "c", "d", 0).is_empty());
    }

    #[test]
    fn rendered_template_is_consistent() {
        let identity = Identity::new("broker", "ns");
        let template = render_template(&identity, "example.com", 2, "acc0", "ca".to_string());

        assert_eq!(template.selector_name, selector_name("broker", "acc0"));
        assert_eq!(template.secret_name, secret_name("broker", "acc0"));
        assert_eq!(template.issuer_name, "ca");
        assert_eq!(template.tls_hosts.len(), 2);
    }
}
