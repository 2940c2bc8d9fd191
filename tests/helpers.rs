// Shared test helpers for building DNS zones.
//
// This module provides common fixtures used across multiple test files to reduce duplication.

use email_posture::MockGateway;

/// A domain with SPF (one include), DMARC at p=quarantine and one 2048-bit
/// class DKIM key at `selector1`.
#[allow(dead_code)] // Used by other test files
pub fn healthy_zone() -> MockGateway {
    let dns = MockGateway::new();
    dns.add_txt(
        "example.com",
        ["v=spf1 include:_spf.mail.example.net -all", "MS=ms12345"],
    );
    dns.add_txt("_spf.mail.example.net", ["v=spf1 ip4:198.51.100.0/24 ~all"]);
    dns.add_txt(
        "_dmarc.example.com",
        ["v=DMARC1; p=quarantine; rua=mailto:dmarc@example.com; adkim=s"],
    );
    dns.add_txt(
        "selector1._domainkey.example.com",
        [format!("v=DKIM1; k=rsa; p={}", "M".repeat(392))],
    );
    dns
}

/// Publishes a chain `name0 -> name1 -> ... -> name{len}` of SPF includes
/// under `suffix`, with `example.com` including `name0`.
#[allow(dead_code)] // Used by other test files
pub fn include_chain(dns: &MockGateway, suffix: &str, len: usize) {
    dns.add_txt(
        "example.com",
        [format!("v=spf1 include:n0.{suffix} -all")],
    );
    for i in 0..len {
        dns.add_txt(
            &format!("n{i}.{suffix}"),
            [format!("v=spf1 include:n{}.{suffix} -all", i + 1)],
        );
    }
    dns.add_txt(&format!("n{len}.{suffix}"), ["v=spf1 -all"]);
}
