use std::path::PathBuf;

use anyhow::Context as _;

use crate::{
    command::settings::{self, OutputFormat, SettingsArg},
    report,
    schema::report::{GroupingReport, ScoreReport},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ScoreArg {
    #[clap(flatten)]
    settings: SettingsArg,
    /// JSON report written by `group --format json`
    #[arg(long)]
    report: PathBuf,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let config = arg.settings.load_config()?;
    let grouping: GroupingReport = util::read_json_file("report", &arg.report)?;
    let (individuals, catalogue) = arg.settings.load_population()?;

    grouping
        .assignment
        .validate(individuals.len(), grouping.group_count)
        .with_context(|| {
            format!(
                "Report {} does not match the input table",
                arg.report.display()
            )
        })?;
    let evaluator = settings::build_evaluator(
        &catalogue,
        &individuals,
        &config.weights,
        grouping.group_count,
    )?;
    let breakdown = evaluator.breakdown(&grouping.assignment);
    let fitness = evaluator.score(&grouping.assignment);
    if (fitness - grouping.fitness).abs() > 1e-9 {
        log::warn!(
            "Fitness differs from the report ({:.5} vs {:.5}); weights may have changed",
            fitness,
            grouping.fitness
        );
    }

    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        OutputFormat::Text => {
            report::write_breakdown(&mut output, &catalogue, &breakdown)?;
            output.finish()?;
        }
        OutputFormat::Json => {
            let score = ScoreReport {
                fitness,
                groups: report::group_reports(
                    &individuals,
                    &catalogue,
                    &grouping.assignment,
                    &breakdown,
                ),
            };
            output.write_json(&score)?;
        }
    }
    Ok(())
}
