//! Property-string projection of endpoint configuration.
//!
//! `rawProperties` holds `"{role}Configurations.{name}.{key}={value}"` lines
//! consumed by the broker. The structured endpoint fields are authoritative;
//! this module is the only place that writes the projection.
//!
//! Each endpoint owns the entries under its key prefix:
//! - exactly one `factoryClassName` entry
//! - one `params.{key}` entry per other parameter
//! - any other single-segment key
//!
//! Endpoint names are not guaranteed to be dot-free once a descriptor is
//! hydrated, so `acceptorConfigurations.a.b.factoryClassName` belongs to `a.b`
//! and never to `a`.

use std::collections::BTreeMap;

use brokerform_types::{Descriptor, Endpoint, EndpointRole, FactoryKind};

pub const FACTORY_CLASS_KEY: &str = "factoryClassName";
pub const PARAMS_KEY_PREFIX: &str = "params.";

/// Key prefix (with trailing dot) owned by one endpoint.
pub fn key_prefix(role: EndpointRole, name: &str) -> String {
    format!("{}.{name}.", role.properties_prefix())
}

/// Returns the part of `line`'s key after `prefix` when the endpoint with
/// that prefix owns the line.
fn owned_suffix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let key = line.split_once('=').map_or(line, |(key, _)| key);
    let suffix = key.strip_prefix(prefix)?;
    let owned = suffix == FACTORY_CLASS_KEY
        || suffix.starts_with(PARAMS_KEY_PREFIX)
        || !suffix.contains('.');
    owned.then_some(suffix)
}

fn is_owned(line: &str, prefix: &str) -> bool {
    owned_suffix(line, prefix).is_some()
}

/// Renders an endpoint's entries: factory first, then params in key order.
pub fn render(role: EndpointRole, endpoint: &Endpoint) -> Vec<String> {
    let prefix = key_prefix(role, &endpoint.name);
    let mut lines = Vec::with_capacity(1 + endpoint.other_params.len());
    lines.push(format!(
        "{prefix}{FACTORY_CLASS_KEY}={}",
        role.factory_class_name(endpoint.factory)
    ));
    lines.extend(
        endpoint
            .other_params
            .iter()
            .map(|(key, value)| format!("{prefix}{PARAMS_KEY_PREFIX}{key}={value}")),
    );
    lines
}

/// Rewrites the entries owned by `endpoint`, leaving every other line alone.
///
/// The regenerated block takes the position of the endpoint's first existing
/// entry, or is appended if it had none.
pub fn sync_endpoint(properties: &mut Vec<String>, role: EndpointRole, endpoint: &Endpoint) {
    let prefix = key_prefix(role, &endpoint.name);
    let first = properties.iter().position(|line| is_owned(line, &prefix));
    properties.retain(|line| !is_owned(line, &prefix));

    let rendered = render(role, endpoint);
    match first {
        // Lines before `first` never matched, so its index survives `retain`.
        Some(index) => {
            properties.splice(index..index, rendered);
        }
        None => properties.extend(rendered),
    }
}

/// Drops every entry owned by the named endpoint.
pub fn remove_endpoint(properties: &mut Vec<String>, role: EndpointRole, name: &str) {
    let prefix = key_prefix(role, name);
    properties.retain(|line| !is_owned(line, &prefix));
}

/// Moves an endpoint's entries to a new name in place, preserving order.
pub fn rename_endpoint(properties: &mut [String], role: EndpointRole, old: &str, new: &str) {
    let old_prefix = key_prefix(role, old);
    let new_prefix = key_prefix(role, new);
    for line in properties.iter_mut() {
        if !is_owned(line, &old_prefix) {
            continue;
        }
        if let Some(rest) = line.strip_prefix(&old_prefix) {
            *line = format!("{new_prefix}{rest}");
        }
    }
}

/// Structured view recovered from one endpoint's entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedEntries {
    pub factory_entries: usize,
    pub factory: Option<FactoryKind>,
    pub params: BTreeMap<String, String>,
}

/// Reads back the entries owned by one endpoint.
///
/// Lines without `=` or outside the endpoint's prefix are skipped.
pub fn parse_endpoint(properties: &[String], role: EndpointRole, name: &str) -> ParsedEntries {
    let prefix = key_prefix(role, name);
    let mut parsed = ParsedEntries::default();

    for line in properties {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(suffix) = owned_suffix(key, &prefix) else {
            continue;
        };

        if suffix == FACTORY_CLASS_KEY {
            parsed.factory_entries += 1;
            parsed
                .factory
                .get_or_insert(FactoryKind::from_class_name(role, value));
        } else if let Some(param) = suffix.strip_prefix(PARAMS_KEY_PREFIX) {
            parsed.params.insert(param.to_string(), value.to_string());
        }
    }

    parsed
}

/// Rebuilds every endpoint's structured view from `rawProperties`.
///
/// Run on hydration, when the descriptor arrives from outside the engine.
/// An endpoint whose entries are missing a factory, or carry more than one,
/// is re-projected so it ends up with exactly one.
pub fn hydrate(descriptor: &mut Descriptor) {
    for role in EndpointRole::ALL {
        let Descriptor {
            acceptors,
            connectors,
            raw_properties,
            ..
        } = &mut *descriptor;
        let endpoints = match role {
            EndpointRole::Acceptor => acceptors,
            EndpointRole::Connector => connectors,
        };

        for endpoint in endpoints.iter_mut() {
            let parsed = parse_endpoint(raw_properties, role, &endpoint.name);
            endpoint.factory = parsed.factory.unwrap_or_default();
            endpoint.other_params = parsed.params;

            if parsed.factory_entries != 1 {
                tracing::debug!(
                    %role,
                    endpoint = %endpoint.name,
                    factory_entries = parsed.factory_entries,
                    "re-projecting endpoint properties on hydration"
                );
                sync_endpoint(raw_properties, role, endpoint);
            }
        }
    }
}
