use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use fs_err::File;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

use crate::{
    engine::EngineState,
    replay::{run_scenario, ReplayReport, Scenario},
};

use super::{resolve_path, GlobalOptions};

/// Plays a recorded or hand-written session and prints the resulting tree.
#[derive(Debug, Parser)]
pub struct ReplayCommand {
    /// Path to the scenario file, usually ending in `.scenario.json`.
    pub scenario: PathBuf,

    /// Where to write the final tree as JSON. Omit this to print it to stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,
}

impl ReplayCommand {
    pub fn run(self, global: GlobalOptions) -> anyhow::Result<()> {
        let scenario_path = resolve_path(&self.scenario)?;

        log::trace!("Loading scenario from {}", scenario_path.display());
        let scenario = Scenario::load(&scenario_path)?;

        let report = run_scenario(&scenario)?;

        match &self.output {
            Some(output_path) => {
                let mut file = BufWriter::new(File::create(output_path)?);
                serde_json::to_writer_pretty(&mut file, &report.tree)?;
                file.flush()?;

                log::info!("Wrote project tree to {}", output_path.display());
            }
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                serde_json::to_writer_pretty(&mut out, &report.tree)?;
                writeln!(out)?;
            }
        }

        show_summary(&report, global.color.into())?;

        Ok(())
    }
}

fn show_summary(report: &ReplayReport, color: ColorChoice) -> io::Result<()> {
    let writer = BufferWriter::stderr(color);
    let mut buffer = writer.buffer();

    write!(&mut buffer, "Replayed ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(&mut buffer, "{}", report.events_handled)?;
    buffer.set_color(&ColorSpec::new())?;
    write!(&mut buffer, " events into ")?;
    buffer.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
    write!(&mut buffer, "{}", report.entry_count)?;
    buffer.set_color(&ColorSpec::new())?;
    writeln!(&mut buffer, " entries")?;

    for target in &report.targets {
        write!(&mut buffer, "  {}: ", target.id)?;

        let (label, color) = match target.state {
            Some(EngineState::AttachedEmpty) => ("empty", Color::Yellow),
            Some(EngineState::AttachedPopulated) => ("populated", Color::Green),
            Some(EngineState::Suspended) => ("suspended", Color::Yellow),
            Some(EngineState::Disposed) | None => ("detached", Color::Red),
        };

        buffer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(&mut buffer, "{}", label)?;
        buffer.set_color(&ColorSpec::new())?;
        writeln!(
            &mut buffer,
            " ({} partitions, {} entries)",
            target.partitions, target.entries
        )?;
    }

    writer.print(&buffer)?;

    Ok(())
}
