use uuid::Uuid;

/// Check whether a reference value is already a concrete identifier
pub fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Convert a legacy kebab-case key to the camelCase used by UX2 payloads
/// e.g., "if-name" -> "ifName", "dhcp_helper" -> "dhcpHelper"
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '-' || c == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a legacy device-specific variable name to a UX2 variable placeholder.
/// UX2 only accepts alphanumerics, underscores and hyphens between the braces.
/// e.g., "vpn_if_name" -> "{{vpn_if_name}}", "system/host name" -> "{{system_host_name}}"
pub fn convert_varname(name: &str) -> String {
    let cleaned = regex_lite::Regex::new(r"[^a-zA-Z0-9_\-]+")
        .map(|re| re.replace_all(name.trim(), "_").into_owned())
        .unwrap_or_else(|_| name.trim().to_string());
    format!("{{{{{}}}}}", cleaned)
}

/// Split a CIDR prefix into its address and prefix length
/// e.g., "10.0.0.0/8" -> ("10.0.0.0", 8)
pub fn split_prefix(prefix: &str) -> Option<(&str, u8)> {
    let (address, length) = prefix.trim().split_once('/')?;
    let length = length.parse::<u8>().ok()?;
    if address.is_empty() || length > 128 {
        return None;
    }
    Some((address, length))
}
