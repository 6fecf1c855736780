use clap::Parser;

fn main() -> anyhow::Result<()> {
    deck_app::cli::run(deck_app::cli::Cli::parse())
}
