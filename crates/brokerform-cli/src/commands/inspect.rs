//! Inspect command implementation.

use std::path::Path;

use anyhow::Result;
use brokerform_kernel::automation;
use brokerform_types::{Descriptor, Endpoint, EndpointRole, FactoryKind};

use super::{hydrate, read_descriptor, short_fingerprint};
use crate::style::{print_data_table, print_heading, print_info_table, print_spacer};

const ENDPOINT_COLUMNS: &[&str] = &["Role", "Name", "Port", "Protocols", "Factory", "SSL", "Secret"];
const TEMPLATE_COLUMNS: &[&str] = &["Selector", "Issuer", "Secret", "TLS hosts"];

/// Prints a summary of a descriptor.
pub fn run(descriptor_path: &Path) -> Result<()> {
    let (descriptor, format) = read_descriptor(descriptor_path)?;
    let form = hydrate(descriptor);
    let descriptor = form.descriptor();

    print_heading(&format!("Broker {}", descriptor.broker_name()));
    print_info_table(&[
        ("Namespace", descriptor.namespace().to_string()),
        ("Replicas", descriptor.replica_count.to_string()),
        ("Ingress domain", or_dash(&descriptor.ingress_domain)),
        ("Console", console_summary(descriptor)),
        ("Format", format.to_string()),
        ("Fingerprint", short_fingerprint(form.fingerprint())),
    ]);
    print_spacer();

    print_heading("Endpoints");
    let rows: Vec<Vec<String>> = EndpointRole::ALL
        .into_iter()
        .flat_map(|role| {
            descriptor
                .endpoints(role)
                .iter()
                .map(move |endpoint| endpoint_row(descriptor, role, endpoint))
        })
        .collect();
    print_data_table(ENDPOINT_COLUMNS, &rows, "(no endpoints)");
    print_spacer();

    print_heading("Certificate templates");
    let rows: Vec<Vec<String>> = descriptor
        .cert_templates()
        .iter()
        .map(|t| {
            vec![
                t.selector_name.clone(),
                t.issuer_name.clone(),
                t.secret_name.clone(),
                t.tls_hosts.join("\n"),
            ]
        })
        .collect();
    print_data_table(TEMPLATE_COLUMNS, &rows, "(no certificate templates)");

    Ok(())
}

fn endpoint_row(descriptor: &Descriptor, role: EndpointRole, endpoint: &Endpoint) -> Vec<String> {
    let ssl = if !endpoint.ssl_enabled {
        "off"
    } else if role == EndpointRole::Acceptor && automation::is_automated(descriptor, &endpoint.name)
    {
        "automated"
    } else {
        "on"
    };

    vec![
        role.to_string(),
        endpoint.name.clone(),
        endpoint.port.to_string(),
        endpoint.protocols.clone(),
        match endpoint.factory {
            FactoryKind::Network => "network".to_string(),
            FactoryKind::InProcess => "in-process".to_string(),
        },
        ssl.to_string(),
        endpoint.ssl_secret.clone().unwrap_or_else(|| "-".to_string()),
    ]
}

fn console_summary(descriptor: &Descriptor) -> String {
    let console = &descriptor.console;
    if !console.expose {
        return "not exposed".to_string();
    }
    let mode = console
        .expose_mode
        .map_or_else(|| "default".to_string(), |m| m.to_string());
    let ssl = if console.ssl_enabled { ", ssl" } else { "" };
    format!("exposed via {mode}{ssl}")
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
