//! Interactive dashboard: a prompt loop over the same controller the one-shot
//! commands use.

use inquire::{InquireError, Text};
use weather_dashboard_core::UnitSystem;

use crate::{cli::App, render};

const HELP: &str = "Type a city to search. Commands: :c metric, :f imperial, :theme, :help, :quit";

#[derive(Debug, PartialEq)]
enum Input {
    Search(String),
    Units(UnitSystem),
    ToggleTheme,
    Help,
    Quit,
    Nothing,
}

fn parse(line: &str) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Nothing,
        ":q" | ":quit" | ":exit" => Input::Quit,
        ":c" | ":metric" => Input::Units(UnitSystem::Metric),
        ":f" | ":imperial" => Input::Units(UnitSystem::Imperial),
        ":t" | ":theme" => Input::ToggleTheme,
        ":h" | ":help" | "?" => Input::Help,
        city => Input::Search(city.to_string()),
    }
}

pub async fn run(app: &App) -> anyhow::Result<()> {
    println!("{HELP}");
    println!("{}", render::loading_line());
    app.dashboard.mount().await;
    app.print();

    loop {
        let line = match Text::new("City:").with_placeholder("Enter city...").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match parse(&line) {
            Input::Quit => break,
            Input::Nothing => continue,
            Input::Help => println!("{HELP}"),
            Input::ToggleTheme => {
                app.dashboard.toggle_theme();
                app.print();
            }
            Input::Units(units) => {
                println!("{}", render::loading_line());
                app.dashboard.set_units(units).await;
                app.print();
            }
            Input::Search(city) => {
                println!("{}", render::loading_line());
                app.dashboard.search(&city).await;
                app.print();
            }
        }
    }

    Ok(())
}
