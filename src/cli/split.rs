use std::io::{self, Write};

use clap::Parser;

use crate::url::split_url;

/// Shows where URLs would land in the project tree.
#[derive(Debug, Parser)]
pub struct SplitCommand {
    /// URLs to split.
    #[clap(required = true)]
    pub urls: Vec<String>,

    /// Print JSON instead of a table.
    #[clap(long)]
    pub json: bool,
}

impl SplitCommand {
    pub fn run(self) -> anyhow::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if self.json {
            let parts: Vec<_> = self.urls.iter().map(|url| split_url(url)).collect();
            serde_json::to_writer_pretty(&mut out, &parts)?;
            writeln!(out)?;
            return Ok(());
        }

        for url in &self.urls {
            let parts = split_url(url);

            writeln!(out, "{}", url)?;
            writeln!(out, "  partition: {}", display_or_empty(&parts.partition_url))?;
            writeln!(out, "  parent:    {}", display_or_empty(&parts.parent_path))?;
            writeln!(out, "  name:      {}", display_or_empty(&parts.name))?;
        }

        Ok(())
    }
}

fn display_or_empty(value: &str) -> &str {
    if value.is_empty() {
        "(empty)"
    } else {
        value
    }
}
