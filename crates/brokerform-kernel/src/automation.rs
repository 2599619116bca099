//! Certificate automation for acceptors.
//!
//! An acceptor under automation carries a fixed SSL/expose bundle and owns a
//! [`CertTemplate`] located by its selector name. Templates are recomputed
//! from the current descriptor whenever one of their inputs changes.

use brokerform_types::{CertTemplate, Descriptor, EndpointRole, ExposeMode};

use crate::naming::{self, INGRESS_HOST_TEMPLATE};

/// Index of the template owned by `acceptor_name` under `broker_name`.
fn template_index(descriptor: &Descriptor, broker_name: &str, acceptor_name: &str) -> Option<usize> {
    let selector = naming::selector_name(broker_name, acceptor_name);
    descriptor
        .cert_templates()
        .iter()
        .position(|t| t.selector_name == selector && naming::is_automation_secret(&t.secret_name))
}

/// Returns the template owned by an acceptor, if it is under automation.
pub fn template_for<'a>(descriptor: &'a Descriptor, acceptor_name: &str) -> Option<&'a CertTemplate> {
    template_index(descriptor, descriptor.broker_name(), acceptor_name)
        .map(|i| &descriptor.cert_templates()[i])
}

/// Returns true if the acceptor's TLS secret is managed by automation.
pub fn is_automated(descriptor: &Descriptor, acceptor_name: &str) -> bool {
    template_for(descriptor, acceptor_name).is_some()
        || descriptor
            .endpoint(EndpointRole::Acceptor, acceptor_name)
            .and_then(|a| a.ssl_secret.as_deref())
            .is_some_and(naming::is_automation_secret)
}

/// Puts an acceptor under automation with the given issuer.
///
/// Returns false if the acceptor does not exist.
pub fn activate(descriptor: &mut Descriptor, acceptor_name: &str, issuer: &str) -> bool {
    let secret = naming::secret_name(descriptor.broker_name(), acceptor_name);
    let Some(acceptor) = descriptor.endpoint_mut(EndpointRole::Acceptor, acceptor_name)
    else {
        return false;
    };

    acceptor.ssl_enabled = true;
    acceptor.expose = Some(true);
    acceptor.expose_mode = Some(ExposeMode::Ingress);
    acceptor.ingress_host = Some(INGRESS_HOST_TEMPLATE.to_string());
    acceptor.ssl_secret = Some(secret);

    let template = naming::render_template(
        &descriptor.identity,
        &descriptor.ingress_domain,
        descriptor.replica_count,
        acceptor_name,
        issuer.to_string(),
    );
    match template_index(descriptor, descriptor.broker_name(), acceptor_name) {
        Some(i) => {
            if let Some(templates) = descriptor.cert_templates.as_mut() {
                templates[i] = template;
            }
        }
        None => descriptor
            .cert_templates
            .get_or_insert_with(Vec::new)
            .push(template),
    }
    true
}

/// Sets the issuer of an existing template. Returns false if there is none.
pub fn set_issuer(descriptor: &mut Descriptor, acceptor_name: &str, issuer: &str) -> bool {
    let Some(i) = template_index(descriptor, descriptor.broker_name(), acceptor_name) else {
        return false;
    };
    match descriptor.cert_templates.as_mut() {
        Some(templates) => {
            templates[i].issuer_name = issuer.to_string();
            true
        }
        None => false,
    }
}

/// Removes the acceptor's template and automation bundle, keeping SSL on.
///
/// Used when the user takes manual control of the TLS secret. The trust
/// secret and client-auth flags are not part of the bundle and survive.
pub fn release(descriptor: &mut Descriptor, acceptor_name: &str) {
    let broker = descriptor.broker_name().to_string();
    remove_template(descriptor, &broker, acceptor_name);
    if let Some(acceptor) = descriptor.endpoint_mut(EndpointRole::Acceptor, acceptor_name) {
        acceptor.ssl_secret = None;
        acceptor.clear_exposure();
    }
}

/// Takes an acceptor out of automation and disables SSL on it.
///
/// Safe to repeat: a second call finds nothing left to remove.
pub fn deactivate(descriptor: &mut Descriptor, acceptor_name: &str) {
    release(descriptor, acceptor_name);
    if let Some(acceptor) = descriptor.endpoint_mut(EndpointRole::Acceptor, acceptor_name) {
        acceptor.clear_ssl();
    }
}

/// Drops the template `(broker_name, acceptor_name)` owns, if any.
///
/// The collection itself is dropped once it is empty.
pub fn remove_template(descriptor: &mut Descriptor, broker_name: &str, acceptor_name: &str) {
    if let Some(i) = template_index(descriptor, broker_name, acceptor_name) {
        if let Some(templates) = descriptor.cert_templates.as_mut() {
            templates.remove(i);
        }
    }
    if descriptor.cert_templates.as_ref().is_some_and(Vec::is_empty) {
        descriptor.cert_templates = None;
    }
}

/// Re-renders the template of a renamed acceptor under its new name.
///
/// The acceptor must already carry `new_name`.
pub fn rename(descriptor: &mut Descriptor, old_name: &str, new_name: &str) {
    let broker = descriptor.broker_name().to_string();
    let Some(i) = template_index(descriptor, &broker, old_name) else {
        return;
    };
    rerender(descriptor, i, new_name);
}

/// Re-renders every template after identity, domain or replica changes.
///
/// `previous_broker_name` is the broker name the templates were rendered
/// under; pass the current name when it did not change.
pub fn refresh(descriptor: &mut Descriptor, previous_broker_name: &str) {
    let names: Vec<String> = descriptor.acceptors.iter().map(|a| a.name.clone()).collect();
    let owned: Vec<(usize, String)> = names
        .into_iter()
        .filter_map(|name| template_index(descriptor, previous_broker_name, &name).map(|i| (i, name)))
        .collect();

    for (i, name) in owned {
        rerender(descriptor, i, &name);
    }
}

fn rerender(descriptor: &mut Descriptor, index: usize, acceptor_name: &str) {
    let Some(issuer) = descriptor
        .cert_templates
        .as_ref()
        .and_then(|t| t.get(index))
        .map(|t| t.issuer_name.clone())
    else {
        return;
    };

    let template = naming::render_template(
        &descriptor.identity,
        &descriptor.ingress_domain,
        descriptor.replica_count,
        acceptor_name,
        issuer,
    );
    let secret = template.secret_name.clone();
    if let Some(templates) = descriptor.cert_templates.as_mut() {
        templates[index] = template;
    }
    if let Some(acceptor) = descriptor.endpoint_mut(EndpointRole::Acceptor, acceptor_name) {
        acceptor.ssl_secret = Some(secret);
    }
}

#[cfg(test)]
mod tests {
    use brokerform_types::Endpoint;

    use super::*;

    fn broker_with_acceptor() -> Descriptor {
        let mut descriptor = Descriptor::with_identity("ex-aao", "messaging");
        descriptor.ingress_domain = "apps.example.com".to_string();
        descriptor
            .acceptors
            .push(Endpoint::new(EndpointRole::Acceptor, "acc0", 5555));
        descriptor
    }

    #[test]
    fn activate_sets_bundle_and_template() {
        let mut descriptor = broker_with_acceptor();

        assert!(activate(&mut descriptor, "acc0", "letsencrypt"));

        let acceptor = &descriptor.acceptors[0];
        assert!(acceptor.ssl_enabled);
        assert_eq!(acceptor.expose, Some(true));
        assert_eq!(acceptor.expose_mode, Some(ExposeMode::Ingress));
        assert_eq!(acceptor.ingress_host.as_deref(), Some(INGRESS_HOST_TEMPLATE));
        assert_eq!(
            acceptor.ssl_secret.as_deref(),
            Some("ex-aao-acc0-0-svc-ing-ptls")
        );

        let template = template_for(&descriptor, "acc0").expect("template should exist");
        assert_eq!(template.issuer_name, "letsencrypt");
        assert_eq!(
            template.tls_hosts,
            vec!["ing.acc0.ex-aao-0.messaging.apps.example.com"]
        );
    }

    #[test]
    fn activate_twice_updates_rather_than_duplicates() {
        let mut descriptor = broker_with_acceptor();
        activate(&mut descriptor, "acc0", "first");
        activate(&mut descriptor, "acc0", "second");

        assert_eq!(descriptor.cert_templates().len(), 1);
        assert_eq!(descriptor.cert_templates()[0].issuer_name, "second");
    }

    #[test]
    fn activate_unknown_acceptor_is_refused() {
        let mut descriptor = broker_with_acceptor();
        assert!(!activate(&mut descriptor, "missing", "ca"));
        assert!(descriptor.cert_templates.is_none());
    }

    #[test]
    fn deactivate_drops_empty_collection() {
        let mut descriptor = broker_with_acceptor();
        activate(&mut descriptor, "acc0", "ca");

        deactivate(&mut descriptor, "acc0");

        assert!(descriptor.cert_templates.is_none());
        let acceptor = &descriptor.acceptors[0];
        assert!(!acceptor.ssl_enabled);
        assert!(!acceptor.has_ssl_fields());
        assert!(acceptor.expose.is_none());
        assert!(acceptor.ingress_host.is_none());
    }

    #[test]
    fn release_keeps_trust_secret() {
        let mut descriptor = broker_with_acceptor();
        activate(&mut descriptor, "acc0", "ca");
        descriptor.acceptors[0].trust_secret = Some("truststore".to_string());

        release(&mut descriptor, "acc0");

        let acceptor = &descriptor.acceptors[0];
        assert!(acceptor.ssl_enabled);
        assert!(acceptor.ssl_secret.is_none());
        assert_eq!(acceptor.trust_secret.as_deref(), Some("truststore"));
        assert!(!is_automated(&descriptor, "acc0"));
    }

    #[test]
    fn refresh_follows_broker_rename() {
        let mut descriptor = broker_with_acceptor();
        activate(&mut descriptor, "acc0", "ca");

        descriptor.identity.name = "renamed".to_string();
        refresh(&mut descriptor, "ex-aao");

        let template = template_for(&descriptor, "acc0").expect("template should follow");
        assert_eq!(template.selector_name, "renamed-acc0-0-svc-ing");
        assert_eq!(template.secret_name, "renamed-acc0-0-svc-ing-ptls");
        assert_eq!(
            descriptor.acceptors[0].ssl_secret.as_deref(),
            Some("renamed-acc0-0-svc-ing-ptls")
        );
    }
}
