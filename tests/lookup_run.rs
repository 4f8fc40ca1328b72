// Bulk-lookup entry point tests: input gathering, failure surfacing, and
// report shape.

mod helpers;

use std::io::Write;
use std::sync::Arc;

use geowatch::{run_lookup_with_resolver, Config, GeoResolver, LocationKind, LookupError};
use helpers::MockResolver;

#[tokio::test]
async fn reports_successes_and_failures_independently() {
    let resolver = Arc::new(MockResolver::new());
    let config = Config {
        ips: vec!["8.8.8.8".into(), "bad".into(), "1.1.1.1".into()],
        ..Default::default()
    };

    let report = run_lookup_with_resolver(config, resolver)
        .await
        .expect("run succeeds despite individual failures");

    assert_eq!(report.total, 3);
    assert_eq!(report.resolved, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.locations.len(), 2);
    assert!(report
        .locations
        .iter()
        .all(|l| l.kind == LocationKind::User));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "bad");
    assert_eq!(
        report.failures[0].1,
        LookupError::InvalidAddress("bad".to_string())
    );
}

#[tokio::test]
async fn reads_and_deduplicates_file_input() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "# suspicious addresses").unwrap();
    writeln!(file, "8.8.8.8").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "1.1.1.1").unwrap();
    writeln!(file, "8.8.8.8").unwrap();

    let resolver = Arc::new(MockResolver::new());
    let config = Config {
        file: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let report = run_lookup_with_resolver(config, Arc::clone(&resolver) as Arc<dyn GeoResolver>)
        .await
        .expect("run succeeds");

    assert_eq!(report.total, 2, "comments, blanks, and duplicates dropped");
    assert_eq!(report.resolved, 2);
    assert_eq!(resolver.calls_for("8.8.8.8"), 1);
}

#[tokio::test]
async fn empty_input_is_an_error() {
    let resolver = Arc::new(MockResolver::new());
    let config = Config::default();

    let result = run_lookup_with_resolver(config, resolver).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn rate_limited_lookups_are_retried() {
    let resolver = Arc::new(
        MockResolver::new()
            .script("8.8.8.8", Err(LookupError::RateLimited))
            .script("8.8.8.8", Err(LookupError::RateLimited)),
    );
    let config = Config {
        ips: vec!["8.8.8.8".into()],
        ..Default::default()
    };

    let report = run_lookup_with_resolver(config, Arc::clone(&resolver) as Arc<dyn GeoResolver>)
        .await
        .expect("run succeeds");

    assert_eq!(report.resolved, 1, "third attempt succeeds");
    assert_eq!(resolver.calls_for("8.8.8.8"), 3);
}

#[tokio::test]
async fn transient_resolver_failure_is_not_retried_here() {
    // Only rate limiting gets the backoff treatment; other transient
    // failures surface immediately to the user.
    let resolver = Arc::new(MockResolver::new().script(
        "8.8.8.8",
        Err(LookupError::ResolverUnavailable("backend down".into())),
    ));
    let config = Config {
        ips: vec!["8.8.8.8".into()],
        ..Default::default()
    };

    let report = run_lookup_with_resolver(config, Arc::clone(&resolver) as Arc<dyn GeoResolver>)
        .await
        .expect("run succeeds");

    assert_eq!(report.failed, 1);
    assert_eq!(resolver.calls_for("8.8.8.8"), 1);
}
