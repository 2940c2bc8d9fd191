//! Stress tests for hostile SPF zones.
//!
//! An attacker controlling a zone can publish include chains, loops and wide
//! fan-outs to make a checker issue unbounded queries. Every evaluation must
//! stay within the lookup budget and terminate.

mod helpers;

use email_posture::{evaluate_spf, DiagnosticCode, MockGateway};

#[tokio::test]
async fn test_deep_include_chain_is_bounded() {
    let dns = MockGateway::new();
    helpers::include_chain(&dns, "deep.example", 1_000);

    let eval = evaluate_spf(&dns, "example.com").await;

    assert!(eval.lookup_limit_exceeded);
    assert_eq!(eval.total_lookups, 10);
    // The root plus the ten includes that were paid for
    assert_eq!(dns.queries().len(), 11);
}

#[tokio::test]
async fn test_wide_fan_out_is_bounded() {
    let dns = MockGateway::new();
    let includes: Vec<String> = (0..50).map(|i| format!("include:w{i}.example")).collect();
    dns.add_txt("example.com", [format!("v=spf1 {} -all", includes.join(" "))]);
    for i in 0..50 {
        let nested: Vec<String> = (0..50).map(|j| format!("include:w{i}-{j}.example")).collect();
        dns.add_txt(
            &format!("w{i}.example"),
            [format!("v=spf1 {} -all", nested.join(" "))],
        );
    }

    let eval = evaluate_spf(&dns, "example.com").await;

    assert!(eval.lookup_limit_exceeded);
    assert_eq!(eval.total_lookups, 10);
    assert!(dns.queries().len() <= 11);
}

#[tokio::test]
async fn test_repeated_includes_are_fetched_once() {
    let dns = MockGateway::new();
    let includes = vec!["include:hot.example"; 8].join(" ");
    dns.add_txt("example.com", [format!("v=spf1 {includes} -all")]);
    dns.add_txt("hot.example", ["v=spf1 a mx -all"]);

    let eval = evaluate_spf(&dns, "example.com").await;

    assert!(eval.cycle_detected);
    assert_eq!(dns.query_count("hot.example"), 1);
    // hot.example's own a/mx plus the first include and the refused repeat
    assert_eq!(eval.total_lookups, 4);
}

#[tokio::test]
async fn test_long_loop_terminates() {
    let dns = MockGateway::new();
    for i in 0..5 {
        dns.add_txt(
            &format!("l{i}.example"),
            [format!("v=spf1 include:l{}.example -all", (i + 1) % 5)],
        );
    }

    let eval = evaluate_spf(&dns, "l0.example").await;

    assert!(eval.cycle_detected);
    assert!(!eval.lookup_limit_exceeded);
    assert_eq!(eval.total_lookups, 5);
    assert!(eval
        .diagnostics()
        .iter()
        .any(|d| d.code == DiagnosticCode::CycleDetected && d.domain == "l4.example"));
}

#[tokio::test]
async fn test_huge_record_is_tokenized() {
    let dns = MockGateway::new();
    let ips: Vec<String> = (0..2_000)
        .map(|i| format!("ip4:10.{}.{}.0/24", i / 256, i % 256))
        .collect();
    dns.add_txt("example.com", [format!("v=spf1 {} -all", ips.join(" "))]);

    let eval = evaluate_spf(&dns, "example.com").await;

    assert_eq!(eval.root.mechanisms.len(), 2_001);
    assert_eq!(eval.total_lookups, 0);
}
