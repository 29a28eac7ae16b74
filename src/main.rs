use std::io;

use clap::Parser;
use jotter::{
    NoteStore,
    app::App,
    cli::{self, Cli},
    confirm::LinePrompt,
    logging,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.command.is_none())?;

    let storage = cli.open_storage()?;
    let mut store = NoteStore::load(storage, cli.key.as_str())?;

    match cli.command {
        None => {
            let mut app = App::new(store);
            ratatui::run(|t| app.run(t))?;
        }
        Some(command) => {
            let mut prompt = LinePrompt::new(io::stdin().lock(), io::stderr());
            cli::run(command, &mut store, &mut io::stdout().lock(), &mut prompt)?;
        }
    }

    Ok(())
}
