use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use portage_revdeps::{
    ActiveFlags, DepClass, DependencyExpression, InMemoryRepository, PackageIdentity,
    PackageRecord, ReverseDepGraph, ReverseDepsOptions, resolve_atom,
};

const CURL_DEPEND: &str = "
    app-misc/ca-certificates
    http2? ( net-libs/nghttp2:=[static-libs?] )
    idn? ( net-dns/libidn2:=[static-libs?] )
    ssl? (
        curl_ssl_openssl? ( dev-libs/openssl:0=[static-libs?] )
        curl_ssl_gnutls? ( net-libs/gnutls:0=[static-libs?] dev-libs/nettle:0= )
        || ( dev-libs/openssl dev-libs/libressl )
    )
    zstd? ( app-arch/zstd:=[static-libs?] )
    >=sys-libs/zlib-1.1.4[static-libs?]
    !net-misc/curl-compat
";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_curl_depend", |b| {
        b.iter(|| DependencyExpression::parse(black_box(CURL_DEPEND)).unwrap())
    });

    c.bench_function("resolve_atom", |b| {
        b.iter(|| resolve_atom(black_box(">=dev-libs/openssl-3.0.0:0/3[-bindist,ssl?]")).unwrap())
    });
}

/// A chain `p0 <- p1 <- ... <- p499`, with every package also pulling in
/// the curl dependency string.
fn chain_repository(len: usize) -> InMemoryRepository {
    (0..len)
        .map(|i| {
            let id = PackageIdentity::parse(&format!("app-misc/p{i}-1.0")).unwrap();
            let depend = if i == 0 {
                CURL_DEPEND.to_string()
            } else {
                format!("app-misc/p{} {CURL_DEPEND}", i - 1)
            };
            PackageRecord::new(id).with(DepClass::Depend, depend)
        })
        .collect()
}

fn bench_graph(c: &mut Criterion) {
    let repo = chain_repository(500);
    let flags: ActiveFlags = ["ssl", "http2", "curl_ssl_openssl"].into_iter().collect();
    let options = ReverseDepsOptions::default()
        .with_only_direct(false)
        .with_evaluate_use(true);

    c.bench_function("build_graph_500", |b| {
        b.iter(|| ReverseDepGraph::from_repository(&repo, &flags, &options).unwrap())
    });

    let graph = ReverseDepGraph::from_repository(&repo, &flags, &options).unwrap();
    let root = PackageIdentity::parse("app-misc/p0").unwrap();
    c.bench_function("transitive_500", |b| {
        b.iter(|| graph.transitive(black_box(root.cpn()), None))
    });
}

criterion_group!(benches, bench_parse, bench_graph);
criterion_main!(benches);
