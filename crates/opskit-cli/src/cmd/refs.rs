use crate::output::print_json;
use anyhow::Context;
use opskit_core::config::Config;
use opskit_core::refgrep::{find, RefQuery};
use std::path::Path;

pub fn run(root: &Path, query: &str, ignore_case: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let q = RefQuery::new(query).ignore_case(ignore_case);
    let hits = find(root, &config.refgrep, &q);

    if json {
        let all: Vec<_> = hits.collect();
        return print_json(&all);
    }

    let mut count = 0usize;
    for hit in hits {
        let shown = hit.path.strip_prefix(root).unwrap_or(&hit.path);
        println!("{}:{}: {}", shown.display(), hit.line_number, hit.snippet);
        count += 1;
    }
    if count == 0 {
        println!("No references to '{query}'.");
    }
    Ok(())
}
