pub fn returning(answer: &str) -> String {
    format!(
        r#"
function FindProxyForURL(url, host) {{
    return "{answer}";
}}
"#,
        answer = answer
    )
}

pub fn pac1_script() -> &'static str {
    r#"
function FindProxyForURL(url, host) {
    if (isPlainHostName(host) || dnsDomainIs(host, ".local")) {
        return "DIRECT";
    }
    if (shExpMatch(host, "*.example.com")) {
        return "SOCKS4 example.com:1001";
    }
    return "PROXY proxy.example.net:3128; DIRECT";
}
"#
}

pub fn pac3_script() -> &'static str {
    r#"
function FindProxyForURL(url, host) {
    if (host == "download.microsoft.com" || localHostOrDomainIs(host, "update.microsoft.com")) {
        return "DIRECT";
    }
    if (isInNet(host, "10.0.0.0", "255.0.0.0") || isInNet(host, "172.16.0.0", "255.240.0.0")) {
        return "DIRECT";
    }
    if (weekdayRange("SAT", "SUN") || !timeRange(8, 18)) {
        return "PROXY offhours.corp:8080; DIRECT";
    }
    return "PROXY proxy1.corp:8080; PROXY proxy2.corp:8080; DIRECT";
}
"#
}
