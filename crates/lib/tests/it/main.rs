/*! Integration tests for Arbor.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * - placement: roots, new nodes and their boundaries, rejected placements
 * - relocation: moving stored subtrees within and across trees
 * - hierarchy: loading children and the children cache
 * - loader: bulk loading nested descriptions
 * - invariants: randomized operation sequences checked by the verifier
 * - persistence: saving and loading the in-memory backend
 * - backend: storage contract checks run against every backend
 * - concurrency: parallel writers on shared trees
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("arbor=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod backend;
mod concurrency;
mod hierarchy;
mod invariants;
mod loader;
mod persistence;
mod relocation;
