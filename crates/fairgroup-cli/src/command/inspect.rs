use std::path::PathBuf;

use crate::{
    command::settings::{OutputFormat, SettingsArg},
    report,
    util::Output,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    #[clap(flatten)]
    settings: SettingsArg,
    #[arg(long, default_value = "text")]
    format: OutputFormat,
    /// Output file path
    #[arg(long, short)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let (_, catalogue) = arg.settings.load_population()?;
    let mut output = Output::from_output_path(arg.output.clone())?;
    match arg.format {
        OutputFormat::Text => {
            report::write_catalogue(&mut output, &catalogue)?;
            output.finish()?;
        }
        OutputFormat::Json => output.write_json(&catalogue)?,
    }
    Ok(())
}
