// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node, namespace, topic and service naming rules.
//!
//! Topic and service names are expanded against the owning node:
//! - `/chatter` stays as is
//! - `chatter` becomes `<namespace>/chatter`
//! - `~/state` becomes `<namespace>/<node>/state`
//! - `{node}` and `{ns}` (or `{namespace}`) are substituted before expansion

use crate::error::{Error, Result};

/// Longest accepted node name.
pub const MAX_NODE_NAME_LEN: usize = 255;

/// Longest accepted fully-qualified topic or service name.
pub const MAX_TOPIC_NAME_LEN: usize = 1024;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn check_token(token: &str) -> std::result::Result<(), &'static str> {
    let Some(first) = token.chars().next() else {
        return Err("contains an empty token");
    };
    if first.is_ascii_digit() {
        return Err("token must not start with a digit");
    }
    if !token.chars().all(is_token_char) {
        return Err("contains characters other than alphanumerics and '_'");
    }
    Ok(())
}

/// Validate a node name.
pub fn validate_node_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.len() > MAX_NODE_NAME_LEN {
        Some("longer than 255 characters")
    } else {
        check_token(name).err()
    };

    match reason {
        Some(reason) => Err(Error::InvalidNodeName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Validate a namespace and return its absolute form.
///
/// The empty namespace is the root `/`; a relative namespace gets a leading `/`.
pub fn normalize_namespace(namespace: &str) -> Result<String> {
    if namespace.is_empty() || namespace == "/" {
        return Ok("/".to_string());
    }

    let absolute = if namespace.starts_with('/') {
        namespace.to_string()
    } else {
        format!("/{}", namespace)
    };

    let invalid = |reason| Error::InvalidNamespace {
        namespace: namespace.to_string(),
        reason,
    };

    if absolute.ends_with('/') {
        return Err(invalid("must not end with '/'"));
    }
    if absolute.len() > MAX_TOPIC_NAME_LEN {
        return Err(invalid("too long"));
    }
    for token in absolute[1..].split('/') {
        check_token(token).map_err(invalid)?;
    }
    Ok(absolute)
}

fn substitute(name: &str, node: &str, namespace: &str) -> std::result::Result<String, &'static str> {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or("unbalanced '{'")?;
        match &after[..close] {
            "node" => out.push_str(node),
            "ns" | "namespace" => out.push_str(namespace),
            _ => return Err("unknown substitution"),
        }
        rest = &after[close + 1..];
    }
    if rest.contains('}') {
        return Err("unbalanced '}'");
    }
    out.push_str(rest);
    Ok(out)
}

fn expand(name: &str, node: &str, namespace: &str) -> std::result::Result<String, &'static str> {
    if name.is_empty() {
        return Err("must not be empty");
    }
    if !name
        .chars()
        .all(|c| is_token_char(c) || matches!(c, '/' | '~' | '{' | '}'))
    {
        return Err("contains characters other than alphanumerics, '_', '/', '~', '{' and '}'");
    }
    if name.contains("//") {
        return Err("must not contain '//'");
    }
    if name.ends_with('/') {
        return Err("must not end with '/'");
    }
    if let Some(pos) = name.rfind('~') {
        if pos != 0 {
            return Err("'~' is only allowed as the first character");
        }
        if name.len() > 1 && !name[1..].starts_with('/') {
            return Err("'~' must be followed by '/'");
        }
    }

    let name = substitute(name, node, namespace)?;
    let base = if namespace == "/" {
        String::new()
    } else {
        namespace.to_string()
    };

    let expanded = if let Some(private) = name.strip_prefix('~') {
        format!("{}/{}{}", base, node, private)
    } else if name.starts_with('/') {
        name
    } else {
        format!("{}/{}", base, name)
    };

    if expanded.len() > MAX_TOPIC_NAME_LEN {
        return Err("too long");
    }
    if expanded.contains("//") || expanded.ends_with('/') {
        return Err("substitution produced an empty token");
    }
    for token in expanded[1..].split('/') {
        check_token(token)?;
    }
    Ok(expanded)
}

/// Validate and expand a topic name for the given node.
pub fn expand_topic_name(name: &str, node: &str, namespace: &str) -> Result<String> {
    expand(name, node, namespace).map_err(|reason| Error::InvalidTopicName {
        name: name.to_string(),
        reason,
    })
}

/// Validate and expand a service name for the given node.
pub fn expand_service_name(name: &str, node: &str, namespace: &str) -> Result<String> {
    expand(name, node, namespace).map_err(|reason| Error::InvalidServiceName {
        name: name.to_string(),
        reason,
    })
}

/// Fully-qualified node name (`/ns/node`).
#[must_use]
pub fn fully_qualified_node_name(name: &str, namespace: &str) -> String {
    if namespace == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", namespace, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_names() {
        assert!(validate_node_name("talker").is_ok());
        assert!(validate_node_name("_hidden_node2").is_ok());

        for bad in ["", "2fast", "with space", "slash/name", "dash-name"] {
            let err = validate_node_name(bad).expect_err(bad);
            assert!(matches!(err, Error::InvalidNodeName { .. }), "{bad}");
        }
        assert!(validate_node_name(&"n".repeat(256)).is_err());
    }

    #[test]
    fn namespaces_are_made_absolute() {
        assert_eq!(normalize_namespace("").expect("empty"), "/");
        assert_eq!(normalize_namespace("/").expect("root"), "/");
        assert_eq!(normalize_namespace("robot").expect("relative"), "/robot");
        assert_eq!(normalize_namespace("/robot/arm").expect("nested"), "/robot/arm");

        for bad in ["/robot/", "//robot", "/robot//arm", "/1robot", "/ro-bot"] {
            let err = normalize_namespace(bad).expect_err(bad);
            assert!(matches!(err, Error::InvalidNamespace { .. }), "{bad}");
        }
    }

    #[test]
    fn topic_expansion() {
        assert_eq!(expand_topic_name("/chatter", "talker", "/ns").expect("abs"), "/chatter");
        assert_eq!(expand_topic_name("chatter", "talker", "/").expect("root"), "/chatter");
        assert_eq!(expand_topic_name("chatter", "talker", "/ns").expect("rel"), "/ns/chatter");
        assert_eq!(expand_topic_name("~/state", "talker", "/ns").expect("private"), "/ns/talker/state");
        assert_eq!(expand_topic_name("~", "talker", "/").expect("tilde"), "/talker");
        assert_eq!(
            expand_topic_name("{node}/status", "talker", "/ns").expect("subst"),
            "/ns/talker/status"
        );
    }

    #[test]
    fn invalid_topics_are_rejected() {
        for bad in ["", "a//b", "trailing/", "3d/points", "a~b", "~state", "a b", "{unknown}", "{node"] {
            let err = expand_topic_name(bad, "talker", "/").expect_err(bad);
            assert!(matches!(err, Error::InvalidTopicName { .. }), "{bad}");
        }
    }

    #[test]
    fn service_errors_use_service_variant() {
        let err = expand_service_name("bad//name", "server", "/").expect_err("double slash");
        assert!(matches!(err, Error::InvalidServiceName { .. }));
        assert_eq!(expand_service_name("add_two_ints", "server", "/math").expect("ok"), "/math/add_two_ints");
    }

    #[test]
    fn fully_qualified_names() {
        assert_eq!(fully_qualified_node_name("talker", "/"), "/talker");
        assert_eq!(fully_qualified_node_name("talker", "/robot"), "/robot/talker");
    }
}
