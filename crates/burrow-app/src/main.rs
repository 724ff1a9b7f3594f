//! burrow: a terminal Gopher and Gopher-over-TLS client.
//!
//! Menus render one element per row with numbered links; `:` opens a
//! location, digits follow links, `/` searches the page, `<` goes
//! back. Non-navigable items (images, binaries, html) are handed to an
//! external plumber command; `y` copies link URIs through an external
//! yank command.

mod cli;
mod exec;
mod tui;

use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser as _;

use burrow_core::collab::Yanker as _;
use burrow_core::input::{Action, InputState};
use burrow_core::nav;
use burrow_core::session::Session;
use burrow_net::{RustlsTlsProvider, Transport};
use burrow_proto::uri::{format_uri, parse_uri};

use crate::cli::Cli;
use crate::exec::{PipeYanker, ShellPlumber};
use crate::tui::Tui;

/// Event poll interval; detached children are reaped on each tick.
const TICK: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let (config, start) = cli.into_config()?;
    let start_uri = start.unwrap_or_else(|| config.start_uri.clone());
    let start_target =
        parse_uri(&start_uri).with_context(|| format!("cannot open {start_uri}"))?;
    log::info!("starting at {start_uri}");

    let provider = RustlsTlsProvider::new(!config.tls_verify);
    let transport = Transport::new(Box::new(provider), config.connect_timeout());
    let mut plumber = ShellPlumber::new(&config.plumber, config.parallel_plumb);
    let mut yanker = PipeYanker::new(&config.yanker);
    let mut session = Session::new(config, transport);
    let mut input = InputState::new();

    let mut tui = Tui::new()?;
    if let Err(err) = nav::navigate(&mut session, start_target, true, false, &mut tui, &mut plumber)
    {
        tui.set_error(err.to_string());
    }

    run(&mut session, &mut input, &mut tui, &mut plumber, &mut yanker)?;
    Ok(())
}

fn run(
    session: &mut Session,
    input: &mut InputState,
    tui: &mut Tui,
    plumber: &mut ShellPlumber,
    yanker: &mut PipeYanker,
) -> Result<()> {
    loop {
        tui.draw(session, input)?;
        let Some(key) = tui.poll_key(TICK)? else {
            plumber.reap();
            continue;
        };
        tui.clear_notice();
        match input.handle_key(key, session) {
            Action::None | Action::Redraw => {}
            Action::Quit => return Ok(()),
            Action::ScrollLineDown => {
                let height = tui.view_height()?;
                session.scroll_down(1, height);
            }
            Action::ScrollLineUp => session.scroll_up(1),
            Action::ScrollHalfDown => {
                let height = tui.view_height()?;
                session.scroll_down(height.max(2) / 2, height);
            }
            Action::ScrollHalfUp => {
                let height = tui.view_height()?;
                session.scroll_up(height.max(2) / 2);
            }
            Action::ScrollTop => session.scroll_top(),
            Action::ScrollBottom => {
                let height = tui.view_height()?;
                session.scroll_bottom(height);
            }
            Action::Navigate(target) => {
                report(nav::navigate(session, target, true, false, tui, plumber), tui);
            }
            Action::Back => report(nav::back(session, tui, plumber), tui),
            Action::Reload => report(nav::reload(session, tui, plumber), tui),
            Action::Root => report(nav::root(session, tui, plumber), tui),
            Action::ShowHelp => session.show_help(),
            Action::ShowHistory => session.show_history(),
            Action::ShowMessage(message) => tui.set_message(message),
            Action::Yank(element) => {
                if let Err(err) = yanker.yank(&format_uri(&element)) {
                    tui.set_error(err.to_string());
                }
            }
            Action::Search { pattern, backward } => {
                let ignore_case = session.config.search_ignore_case;
                match session.search.compile(&pattern, ignore_case) {
                    Ok(()) => jump_to_match(session, backward, tui),
                    Err(err) => tui.set_error(err.to_string()),
                }
            }
            Action::SearchRepeat { backward } => jump_to_match(session, backward, tui),
            Action::Fail(err) => tui.set_error(err.to_string()),
        }
    }
}

fn jump_to_match(session: &mut Session, backward: bool, tui: &mut Tui) {
    match session.search.find(&session.page, session.scroll, backward) {
        Ok(position) => session.scroll = position,
        Err(err) => tui.set_error(err.to_string()),
    }
}

fn report(result: burrow_types::error::Result<nav::Outcome>, tui: &mut Tui) {
    if let Err(err) = result {
        tui.set_error(err.to_string());
    }
}
