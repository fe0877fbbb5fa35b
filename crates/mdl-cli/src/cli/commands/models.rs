//! `mdl models` – print the alias catalog.

use anyhow::Result;
use mdl_core::catalog;

pub fn run_models() -> Result<i32> {
    println!("{:<16} {:<44} {}", "ALIAS", "REPO", "ABOUT");
    for m in catalog::MODELS {
        println!("{:<16} {:<44} {}", m.alias, m.repo, m.about);
    }
    Ok(0)
}
