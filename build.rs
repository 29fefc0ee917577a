// Author: Eshan Roy
// SPDX-License-Identifier: MIT

use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Falls back to the plain package version outside a git checkout.
    EmitBuilder::builder().git_sha(true).emit()?;
    Ok(())
}
