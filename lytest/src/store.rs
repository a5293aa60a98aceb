//! `lytest store`: save a test's output as its reference layout.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::io::harness::ReferenceStore;
use crate::io::loader::{Lookup, TestLoader};

/// Marker printed when a command completes.
pub const SUCCESS: &str = "Success";

/// Resolve `testname` exactly and hand it to the reference store.
pub fn store_reference(
    loader: &mut TestLoader,
    store: &dyn ReferenceStore,
    testfile: &Path,
    testname: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let test = match loader.lookup(testfile, testname)? {
        Lookup::Found(test) => test,
        Lookup::NotFound => {
            let module = loader.load_module(testfile)?;
            let available: Vec<&str> = module.names().collect();
            bail!(
                "no test named {testname} in {} (available: {})",
                testfile.display(),
                available.join(", ")
            );
        }
    };
    let stored = store.store_reference(&test)?;
    debug!(test = %test.name, reference = %stored.display(), "stored");
    writeln!(out, "{SUCCESS}").context("write output")?;
    Ok(())
}
